//! Twilio SMS gateway client.
//!
//! Form-encoded POST with basic auth. Unlike the dashboard's older scripts,
//! a failed send is a `Delivery` error the job gets to count — never
//! silently dropped.

use async_trait::async_trait;
use followup_core::config::SmsConfig;
use followup_core::error::{FollowupError, Result};
use followup_core::traits::SmsSender;
use serde::Deserialize;

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// SMS client bound to one account + from-number.
pub struct TwilioSms {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSms {
    pub fn new(config: &SmsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FollowupError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{API_BASE}/Accounts/{}/Messages.json", self.account_sid)
    }
}

#[async_trait]
impl SmsSender for TwilioSms {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        let form = [
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    FollowupError::Transient(format!("SMS send: {e}"))
                } else {
                    FollowupError::Delivery(format!("SMS send: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FollowupError::Delivery(format!(
                "SMS gateway error {status}: {error_text}"
            )));
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| FollowupError::Delivery(format!("Invalid SMS gateway response: {e}")))?;

        tracing::debug!("SMS sent: {} → {}", resource.sid, to);
        Ok(resource.sid)
    }
}
