//! Integration tests for the EmailHippo API verifier using wiremock HTTP mocks.

use leadscan_core::{EmailVerifier, VerificationDetails, VerificationSource};
use leadscan_verify::{EmailHippoClient, VerifyError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOOKUP_PATH: &str = "/v3/more/json/test-key/taro.yamada%40example.com";

fn test_client(base_url: &str) -> EmailHippoClient {
    EmailHippoClient::with_base_url("test-key", 5, base_url)
        .expect("client construction should not fail")
}

fn deliverable_body() -> serde_json::Value {
    json!({
        "meta": { "email": "taro.yamada@example.com" },
        "emailVerification": {
            "syntaxVerification": { "isSyntaxValid": true, "reason": "Success" },
            "dnsVerification": { "isDomainHasDnsRecord": true, "isDomainHasMxRecords": true },
            "mailboxVerification": { "result": "Ok", "reason": "Success" }
        },
        "infrastructure": { "mail": { "serviceTypeId": "Other", "mailServerLocation": "JP" } },
        "sendAssess": { "inboxQualityScore": 0.82, "sendRecommendation": "SafeToSend" },
        "spamAssess": { "isDisposableEmailAddress": false, "overallRiskScore": 3.1 },
        "spamTrapAssess": { "isSpamTrap": false },
        "hippoTrust": { "score": 8.7, "level": "High" }
    })
}

#[tokio::test]
async fn deliverable_mailbox_maps_to_hippo_verdict() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(deliverable_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .verify("taro.yamada@example.com")
        .await
        .expect("verification should succeed");

    assert_eq!(result.email, "taro.yamada@example.com");
    assert!(result.is_deliverable);
    assert!(result.has_mx_records);
    assert_eq!(result.source(), VerificationSource::EmailHippo);
    assert!(!result.is_transient_failure());

    let VerificationDetails::EmailHippo(details) = result.details else {
        panic!("expected hippo details");
    };
    assert_eq!(details.mail_server_location.as_deref(), Some("JP"));
    assert_eq!(details.hippo_trust_level.as_deref(), Some("High"));
    assert_eq!(details.syntax_is_valid, Some(true));
    assert!(details.raw_response_snippet.is_some());
}

#[tokio::test]
async fn server_error_becomes_uncached_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .verify_email("taro.yamada@example.com")
        .await
        .expect("outage is a verdict, not an error");

    assert!(!result.is_deliverable);
    assert!(result.is_transient_failure());
    assert_eq!(
        result.reason.as_deref(),
        Some("EmailHippo API call failed: Request failed with status code 503")
    );
}

#[tokio::test]
async fn rejected_key_is_a_hard_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .verify_email("taro.yamada@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::Unauthorized { status: 401 }), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .verify_email("taro.yamada@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn connection_failure_becomes_provider_error() {
    let client = test_client("http://0.0.0.0:1");
    let result = client
        .verify_email("taro.yamada@example.com")
        .await
        .expect("connect failure is a verdict, not an error");

    assert!(result.is_transient_failure());
    let reason = result.reason.unwrap_or_default();
    assert!(reason.starts_with("EmailHippo API call failed:"));
    assert!(!reason.contains("test-key"), "API key leaked into reason: {reason}");
}

#[tokio::test]
async fn configured_cache_window_is_reported() {
    let client = test_client("http://localhost").with_cache_max_age_days(30);
    assert_eq!(client.cache_max_age_days(), 30);
}
