use super::*;

fn test_client(base_url: &str) -> OpenAiClient {
    OpenAiClient::with_base_url("test-key", "gpt-5-mini", 30, base_url)
        .expect("client construction should not fail")
}

#[test]
fn responses_url_appends_to_versioned_base() {
    let client = test_client("https://api.openai.com/v1");
    assert_eq!(
        client.responses_url().unwrap().as_str(),
        "https://api.openai.com/v1/responses"
    );
}

#[test]
fn responses_url_strips_trailing_slash() {
    let client = test_client("https://api.openai.com/v1/");
    assert_eq!(
        client.responses_url().unwrap().as_str(),
        "https://api.openai.com/v1/responses"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = OpenAiClient::with_base_url("k", "m", 30, "not a url").unwrap_err();
    assert!(matches!(err, LlmError::InvalidBaseUrl { .. }));
}

#[test]
fn output_text_skips_web_search_items() {
    let envelope: ResponsesEnvelope = serde_json::from_value(serde_json::json!({
        "output": [
            { "type": "web_search_call", "id": "ws_1", "status": "completed" },
            {
                "type": "message",
                "content": [
                    { "type": "output_text", "text": "{\"contacts\":[]}", "annotations": [] }
                ]
            }
        ]
    }))
    .unwrap();

    assert_eq!(envelope.output_text(), Some("{\"contacts\":[]}"));
}

#[test]
fn output_text_is_none_without_message() {
    let envelope: ResponsesEnvelope = serde_json::from_value(serde_json::json!({
        "output": [{ "type": "web_search_call" }]
    }))
    .unwrap();

    assert!(envelope.output_text().is_none());
}
