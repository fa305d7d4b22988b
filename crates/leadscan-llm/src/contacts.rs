//! Web-search contact discovery.

use std::fmt::Write as _;

use async_trait::async_trait;
use leadscan_core::{
    classify_department, department_search_keywords, BoxError, ContactFinder, DepartmentCategory,
    FoundContact,
};
use serde::Deserialize;
use serde_json::json;

use crate::client::OpenAiClient;
use crate::error::LlmError;

const SCHEMA_NAME: &str = "contact_list";

#[derive(Debug, Deserialize)]
struct ContactListResponse {
    #[serde(default)]
    contacts: Vec<FoundContact>,
}

/// [`ContactFinder`] backed by one web-search structured-output call per
/// company and department.
#[derive(Debug, Clone)]
pub struct LlmContactFinder {
    client: OpenAiClient,
}

impl LlmContactFinder {
    #[must_use]
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns the [`LlmError`] from the underlying call.
    pub async fn find(
        &self,
        company_name: &str,
        domain: &str,
        department: &str,
    ) -> Result<Vec<FoundContact>, LlmError> {
        let prompt = contact_search_prompt(company_name, domain, department);
        let response: ContactListResponse = self
            .client
            .structured_output(&prompt, SCHEMA_NAME, &contact_list_schema())
            .await?;

        let contacts: Vec<FoundContact> = response
            .contacts
            .into_iter()
            .map(normalise_romanised_names)
            .collect();
        tracing::info!(domain, department, count = contacts.len(), "contact search returned");
        Ok(contacts)
    }
}

#[async_trait]
impl ContactFinder for LlmContactFinder {
    async fn search_contacts(
        &self,
        company_name: &str,
        domain: &str,
        department: &str,
    ) -> Result<Vec<FoundContact>, BoxError> {
        Ok(self.find(company_name, domain, department).await?)
    }
}

fn normalise_romanised_names(mut contact: FoundContact) -> FoundContact {
    contact.first_name = contact.first_name.trim().to_lowercase();
    contact.last_name = contact.last_name.trim().to_lowercase();
    contact
}

pub(crate) fn contact_search_prompt(company_name: &str, domain: &str, department: &str) -> String {
    let department = department.trim();
    let mut prompt = String::from(
        "You research named contacts at Japanese B2B companies. Use web search to find \
         people whose full name appears together with a position or department on public \
         pages, and record the pages (URL and title) each person was found on.\n\n",
    );

    let _ = writeln!(prompt, "## Company");
    let _ = writeln!(prompt, "- Name: {company_name}");
    let _ = writeln!(prompt, "- Domain: {domain}");
    let _ = writeln!(
        prompt,
        "- Department: {}",
        if department.is_empty() { "not specified" } else { department }
    );

    let category = classify_department(department);
    let keywords = department_search_keywords(department);
    if !department.is_empty() && category != DepartmentCategory::Other && !keywords.is_empty() {
        let _ = writeln!(prompt, "- Department category: {category}");
        let _ = writeln!(prompt, "- Related department names: {}", keywords.join(" / "));
        prompt.push_str(
            "Treat people in any of the related departments as candidates for the \
             requested department.\n",
        );
    }

    prompt.push_str(
        "\n## Where to look\n\
         Combine the company name with terms such as: case studies (導入事例, お客様事例), \
         recruiting and employee interviews (採用, 社員インタビュー), company and executive \
         pages (会社情報, 役員紹介), press releases and IR, seminar or webinar speakers, \
         company blogs and note, partner pages.\n\
         \n## Who to include\n\
         - Full name is printed on the page.\n\
         - A position or department is printed with the name.\n\
         - The person holds an official role at the company (customer-side interviewees in \
         case studies are acceptable).\n\
         - When a department is given, prefer people in it or in the related departments.\n\
         \n## Who to exclude\n\
         - Students, applicants and other non-employees.\n\
         - Names without any position or department.\n\
         - People found only on personal social accounts or unrelated blogs.\n\
         - Anything inferred rather than printed on the page.\n\
         \n## Romanisation\n\
         firstName and lastName are the romanised given and family names in lowercase ASCII \
         (山田 太郎 gives firstName \"taro\", lastName \"yamada\"). Use the usual Hepburn \
         reading when the page does not show one.\n\
         \nInclude only pages where the person actually appears in sources. Do not add \
         citations or any text outside the JSON answer.\n",
    );
    prompt
}

pub(crate) fn contact_list_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["contacts"],
        "properties": {
            "contacts": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "position", "department", "firstName", "lastName", "sources"],
                    "properties": {
                        "name": { "type": "string" },
                        "position": { "type": "string" },
                        "department": { "type": "string" },
                        "firstName": { "type": "string" },
                        "lastName": { "type": "string" },
                        "sources": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["url", "pageTitle"],
                                "properties": {
                                    "url": { "type": ["string", "null"] },
                                    "pageTitle": { "type": ["string", "null"] }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}
