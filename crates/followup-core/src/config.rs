//! Follow-up job configuration.
//!
//! Loaded from `~/.yobot/followup.toml` (or `--config <path>`), then
//! overridden by environment variables — the env vars are what the cron
//! deployments actually set, the file is a convenience for local runs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FollowupError, Result};

/// Root configuration for all three jobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FollowupConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Record store (Airtable) access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub base_id: String,
    #[serde(default)]
    pub table: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

fn default_store_timeout() -> u64 {
    15
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_id: String::new(),
            table: String::new(),
            timeout_secs: default_store_timeout(),
        }
    }
}

/// SMS gateway (Twilio) access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub from_number: String,
    #[serde(default = "default_sms_timeout")]
    pub timeout_secs: u64,
}

fn default_sms_timeout() -> u64 {
    15
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            timeout_secs: default_sms_timeout(),
        }
    }
}

/// Outbound-call subsystem. Only the retry job needs this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_voice_timeout")]
    pub timeout_secs: u64,
}

fn default_voice_timeout() -> u64 {
    30
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_voice_timeout(),
        }
    }
}

/// Batch-failure alerting (Slack-style incoming webhook). Optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertConfig {
    #[serde(default)]
    pub webhook_url: String,
}

/// Job tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Day offsets (since record creation) at which drip messages fire.
    #[serde(default = "default_drip_offsets")]
    pub drip_offsets_days: Vec<u32>,
    /// Wall-clock budget for one job invocation. Exceeding it stops the
    /// batch cleanly with a truncated summary.
    #[serde(default = "default_budget_secs")]
    pub budget_secs: u64,
}

fn default_drip_offsets() -> Vec<u32> {
    vec![1, 3, 7]
}

fn default_budget_secs() -> u64 {
    300
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            drip_offsets_days: default_drip_offsets(),
            budget_secs: default_budget_secs(),
        }
    }
}

impl FollowupConfig {
    /// Load config from the default path, then apply env overrides.
    /// A missing file is not an error — cron deployments are env-only.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from a specific path, then apply env overrides.
    pub fn load_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_env();
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FollowupError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| FollowupError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Default config path (~/.yobot/followup.toml).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".yobot")
            .join("followup.toml")
    }

    /// Environment variables win over file values.
    pub fn apply_env(&mut self) {
        override_from_env(&mut self.store.api_token, "AIRTABLE_API_KEY");
        override_from_env(&mut self.store.base_id, "AIRTABLE_BASE_ID");
        override_from_env(&mut self.store.table, "AIRTABLE_TABLE_NAME");
        override_from_env(&mut self.sms.account_sid, "TWILIO_ACCOUNT_SID");
        override_from_env(&mut self.sms.auth_token, "TWILIO_AUTH_TOKEN");
        override_from_env(&mut self.sms.from_number, "TWILIO_FROM_NUMBER");
        override_from_env(&mut self.voice.base_url, "CALL_API_BASE_URL");
        override_from_env(&mut self.alerts.webhook_url, "SLACK_ALERT_WEBHOOK");
    }

    /// Check that every credential the given job needs is present.
    /// Returns a `Config` error naming all missing keys at once.
    pub fn validate(&self, needs_voice: bool) -> Result<()> {
        let mut missing = Vec::new();
        if self.store.api_token.is_empty() {
            missing.push("store.api_token (AIRTABLE_API_KEY)");
        }
        if self.store.base_id.is_empty() {
            missing.push("store.base_id (AIRTABLE_BASE_ID)");
        }
        if self.store.table.is_empty() {
            missing.push("store.table (AIRTABLE_TABLE_NAME)");
        }
        if self.sms.account_sid.is_empty() {
            missing.push("sms.account_sid (TWILIO_ACCOUNT_SID)");
        }
        if self.sms.auth_token.is_empty() {
            missing.push("sms.auth_token (TWILIO_AUTH_TOKEN)");
        }
        if self.sms.from_number.is_empty() {
            missing.push("sms.from_number (TWILIO_FROM_NUMBER)");
        }
        if needs_voice && self.voice.base_url.is_empty() {
            missing.push("voice.base_url (CALL_API_BASE_URL)");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FollowupError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}

fn override_from_env(slot: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        *slot = value;
    }
}
