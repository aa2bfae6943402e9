//! Outbound-call trigger client.
//!
//! Asks the voice subsystem to place a call. The subsystem fetches its own
//! greeting TwiML and posts completion status to its configured callback
//! URL; none of that flows back through here.

use async_trait::async_trait;
use followup_core::config::VoiceConfig;
use followup_core::error::{FollowupError, Result};
use followup_core::traits::CallDialer;
use followup_core::types::CallHandle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct StartCallRequest<'a> {
    phone: &'a str,
    airtable_record_id: &'a str,
    retry: bool,
}

/// Response envelope. `success=false` on HTTP 200 is still a failure.
#[derive(Debug, Deserialize)]
struct StartCallResponse {
    success: bool,
    sid: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the internal call subsystem.
pub struct CallTrigger {
    client: reqwest::Client,
    base_url: String,
}

impl CallTrigger {
    pub fn new(config: &VoiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FollowupError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn start_call_url(&self) -> String {
        format!("{}/api/start-outbound-call", self.base_url)
    }
}

#[async_trait]
impl CallDialer for CallTrigger {
    async fn start_call(&self, phone: &str, record_id: &str, retry: bool) -> Result<CallHandle> {
        let request = StartCallRequest {
            phone,
            airtable_record_id: record_id,
            retry,
        };

        let response = self
            .client
            .post(self.start_call_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    // Unknown state: the dial may or may not have gone out.
                    FollowupError::Transient(format!("Call trigger: {e}"))
                } else {
                    FollowupError::Remote {
                        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                        message: format!("Call trigger: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FollowupError::Remote {
                status: status.as_u16(),
                message: format!("Call trigger error: {error_text}"),
            });
        }

        let envelope: StartCallResponse = response.json().await.map_err(|e| {
            FollowupError::Remote {
                status: status.as_u16(),
                message: format!("Invalid call trigger response: {e}"),
            }
        })?;

        match (envelope.success, envelope.sid) {
            (true, Some(sid)) => {
                tracing::debug!("Outbound call accepted: {} → {}", sid, phone);
                Ok(CallHandle { sid })
            }
            _ => Err(FollowupError::Remote {
                status: status.as_u16(),
                message: format!(
                    "Call trigger refused dial: {}",
                    envelope.error.unwrap_or_else(|| "no sid returned".into())
                ),
            }),
        }
    }
}
