//! CRM contact upsert — HubSpot-style contacts API via reqwest.
//!
//! Create via POST; a 409 means the contact already exists, in which case
//! the existing id is pulled out of the conflict message and the same
//! property set is PATCHed instead. Exactly one update, never a second
//! create.

use reqwest::StatusCode;
use secrecy::ExposeSecret;

use crate::config::CrmConfig;
use crate::error::SinkError;
use crate::lead::Lead;

/// CRM API client.
pub struct CrmClient {
    http: reqwest::Client,
    config: CrmConfig,
}

impl CrmClient {
    pub fn new(config: CrmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Upsert a contact keyed by email.
    pub async fn upsert_contact(&self, lead: &Lead) -> Result<(), SinkError> {
        let payload = serde_json::json!({ "properties": lead.crm_properties() });
        let create_url = format!("{}/crm/v3/objects/contacts", self.config.base_url);

        let res = self
            .http
            .post(&create_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SinkError::Crm {
                reason: format!("create request failed: {e}"),
            })?;

        let status = res.status();
        if status == StatusCode::CONFLICT {
            let body = res.text().await.map_err(|e| SinkError::Crm {
                reason: format!("failed to read conflict body: {e}"),
            })?;
            let contact_id = extract_conflict_id(&body).ok_or_else(|| SinkError::Crm {
                reason: format!("conflict response without contact id: {body}"),
            })?;
            return self.update_contact(&create_url, &contact_id, &payload).await;
        }

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SinkError::CrmStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(email = %lead.email, "CRM contact created");
        Ok(())
    }

    async fn update_contact(
        &self,
        create_url: &str,
        contact_id: &str,
        payload: &serde_json::Value,
    ) -> Result<(), SinkError> {
        let update_url = format!("{create_url}/{contact_id}");
        let res = self
            .http
            .patch(&update_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(payload)
            .send()
            .await
            .map_err(|e| SinkError::Crm {
                reason: format!("update request failed: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SinkError::CrmStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(contact_id, "CRM contact updated");
        Ok(())
    }
}

/// Pull the existing contact id out of a duplicate-contact conflict body.
///
/// HubSpot reports duplicates as `{"message": "Contact already exists.
/// Existing ID: 12345"}`; the id is the text after the final colon.
pub fn extract_conflict_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?;
    let id = message.rsplit(':').next()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_hubspot_conflict_message() {
        let body = r#"{"message": "Contact already exists. Existing ID: 12345"}"#;
        assert_eq!(extract_conflict_id(body).as_deref(), Some("12345"));
    }

    #[test]
    fn id_is_text_after_the_final_colon() {
        let body = r#"{"message": "duplicate: contact: 987"}"#;
        assert_eq!(extract_conflict_id(body).as_deref(), Some("987"));
    }

    #[test]
    fn missing_message_yields_none() {
        assert!(extract_conflict_id(r#"{"error": "nope"}"#).is_none());
        assert!(extract_conflict_id("not json").is_none());
        assert!(extract_conflict_id(r#"{"message": "trailing colon:"}"#).is_none());
    }
}
