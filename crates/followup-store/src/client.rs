//! Airtable record store client.
//!
//! Bearer-token auth, paginated list with `filterByFormula`, partial patch.
//! Status mapping: 401/403 → `Auth`, 429 → `Transient` (rate limited), any
//! other non-2xx → `Remote` carrying the response body.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use followup_core::config::StoreConfig;
use followup_core::error::{FollowupError, Result};
use followup_core::traits::RecordStore;
use followup_core::types::LeadRecord;
use serde::Deserialize;
use serde_json::Value;

const API_BASE: &str = "https://api.airtable.com/v0";

/// One page of records. The store pages at 100 rows; `offset` is the cursor
/// for the next page.
#[derive(Debug, Deserialize)]
struct RecordsPage {
    records: Vec<WireRecord>,
    offset: Option<String>,
}

/// A record as the store returns it: `createdTime` on the envelope, the
/// rest in a free-form fields map.
#[derive(Debug, Deserialize)]
pub struct WireRecord {
    pub id: String,
    #[serde(rename = "createdTime")]
    pub created_time: String,
    #[serde(default)]
    pub fields: Value,
}

impl WireRecord {
    /// Convert into the typed domain record. Returns `None` when the
    /// envelope timestamp is unparseable — one bad row must not sink the
    /// whole page.
    fn into_lead(self) -> Option<LeadRecord> {
        match DateTime::parse_from_rfc3339(&self.created_time) {
            Ok(created) => Some(LeadRecord::from_fields(
                self.id,
                created.with_timezone(&Utc),
                &self.fields,
            )),
            Err(e) => {
                tracing::warn!(
                    "Skipping record {}: bad createdTime '{}' ({e})",
                    self.id,
                    self.created_time
                );
                None
            }
        }
    }
}

/// Record store client for one base/table pair.
pub struct AirtableStore {
    client: reqwest::Client,
    api_token: String,
    base_id: String,
    table: String,
}

impl AirtableStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FollowupError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_token: config.api_token.clone(),
            base_id: config.base_id.clone(),
            table: config.table.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{API_BASE}/{}/{}", self.base_id, self.table)
    }

    /// List all records matching the formula, following pagination until
    /// the cursor runs out.
    async fn list(&self, formula: Option<&str>) -> Result<Vec<WireRecord>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(f) = formula {
                query.push(("filterByFormula", f.to_string()));
            }
            if let Some(cursor) = &offset {
                query.push(("offset", cursor.clone()));
            }

            let response = self
                .client
                .get(self.table_url())
                .bearer_auth(&self.api_token)
                .query(&query)
                .send()
                .await
                .map_err(|e| map_transport("Record store query", e))?;

            let response = check_status("Record store query", response).await?;
            let status = response.status().as_u16();
            let page: RecordsPage = response.json().await.map_err(|e| FollowupError::Remote {
                status,
                message: format!("Invalid record page: {e}"),
            })?;

            records.extend(page.records);
            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        tracing::debug!("Record store query returned {} records", records.len());
        Ok(records)
    }

    /// Partially update one record. Last write wins.
    async fn patch_record(&self, record_id: &str, fields: Value) -> Result<WireRecord> {
        let url = format!("{}/{}", self.table_url(), record_id);
        let body = serde_json::json!({ "fields": fields });

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport("Record store patch", e))?;

        let response = check_status("Record store patch", response).await?;
        let status = response.status().as_u16();
        let record: WireRecord = response.json().await.map_err(|e| FollowupError::Remote {
            status,
            message: format!("Invalid patch response: {e}"),
        })?;
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn query(&self, formula: Option<&str>) -> Result<Vec<LeadRecord>> {
        let wire = self.list(formula).await?;
        Ok(wire.into_iter().filter_map(WireRecord::into_lead).collect())
    }

    async fn patch(&self, record_id: &str, fields: Value) -> Result<LeadRecord> {
        let wire = self.patch_record(record_id, fields).await?;
        wire.into_lead().ok_or_else(|| {
            FollowupError::Validation(format!("Patched record {record_id} has no valid createdTime"))
        })
    }
}

/// Map a reqwest transport failure. Timeouts and connection failures are
/// retryable on the next scheduler tick.
fn map_transport(context: &str, e: reqwest::Error) -> FollowupError {
    if e.is_timeout() || e.is_connect() {
        FollowupError::Transient(format!("{context}: {e}"))
    } else {
        FollowupError::Remote {
            status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            message: format!("{context}: {e}"),
        }
    }
}

/// Resolve a non-2xx response into the error taxonomy.
async fn check_status(context: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => Err(FollowupError::Auth(format!("{context}: {body}"))),
        429 => Err(FollowupError::Transient(format!(
            "{context}: rate limited: {body}"
        ))),
        code => Err(FollowupError::Remote {
            status: code,
            message: format!("{context}: {body}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use followup_core::types::CallOutcome;

    fn store() -> AirtableStore {
        AirtableStore::new(&StoreConfig {
            api_token: "key123".into(),
            base_id: "appBASE".into(),
            table: "tblCALLS".into(),
            timeout_secs: 15,
        })
        .unwrap()
    }

    #[test]
    fn test_table_url() {
        assert_eq!(
            store().table_url(),
            "https://api.airtable.com/v0/appBASE/tblCALLS"
        );
    }

    #[test]
    fn test_page_decoding() {
        let json = r#"{
            "records": [
                {
                    "id": "rec001",
                    "createdTime": "2024-01-01T00:00:00.000Z",
                    "fields": {
                        "phone": "+15551234567",
                        "callOutcome": "Missed",
                        "callbackScheduled": "2024-01-01T12:00:00Z"
                    }
                },
                {
                    "id": "rec002",
                    "createdTime": "2024-01-02T00:00:00.000Z",
                    "fields": {}
                }
            ],
            "offset": "itrNEXT"
        }"#;
        let page: RecordsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.offset.as_deref(), Some("itrNEXT"));

        let lead = page.records.into_iter().next().unwrap().into_lead().unwrap();
        assert_eq!(lead.id, "rec001");
        assert_eq!(lead.outcome, Some(CallOutcome::Missed));
        assert_eq!(lead.phone(), Some("+15551234567"));
    }

    #[test]
    fn test_final_page_has_no_offset() {
        let json = r#"{"records": []}"#;
        let page: RecordsPage = serde_json::from_str(json).unwrap();
        assert!(page.records.is_empty());
        assert!(page.offset.is_none());
    }

    #[test]
    fn test_bad_created_time_drops_record() {
        let wire = WireRecord {
            id: "recBAD".into(),
            created_time: "yesterday".into(),
            fields: serde_json::json!({}),
        };
        assert!(wire.into_lead().is_none());
    }
}
