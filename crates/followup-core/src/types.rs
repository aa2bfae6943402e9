//! Domain model for lead/call records.
//!
//! The record store hands back loosely-typed `{id, createdTime, fields}`
//! rows; everything here converts those into something the jobs can branch
//! on without string comparisons at call sites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire field names in the record store. `createdTime` lives on the record
/// envelope, not in the fields map, so it is absent here.
pub mod fields {
    pub const PHONE: &str = "phone";
    pub const CALL_OUTCOME: &str = "callOutcome";
    pub const CALLBACK_SCHEDULED: &str = "callbackScheduled";
    pub const RETRY_ATTEMPTED: &str = "retryAttempted";
    pub const OUTBOUND_CALL_ID: &str = "outboundCallId";
    pub const LAST_REMINDER_SENT_AT: &str = "lastReminderSentAt";
    pub const LAST_DRIP_STAGE_SENT: &str = "lastDripStageSent";
}

/// Call outcome state. The dashboard decorates these values with emoji
/// prefixes for display; [`CallOutcome::parse`] strips anything that is not
/// an ASCII letter so both `"Missed"` and `"📞 Missed"` resolve to the same
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Missed,
    Voicemail,
    CallbackNeeded,
    RetryScheduled,
    RetryInProgress,
    CallbackInitiated,
    Resolved,
}

impl CallOutcome {
    /// Parse a raw store value, tolerating decorative glyphs and spacing.
    /// Unknown values return `None` — the caller skips the record.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        match cleaned.as_str() {
            "Missed" => Some(Self::Missed),
            "Voicemail" => Some(Self::Voicemail),
            "CallbackNeeded" => Some(Self::CallbackNeeded),
            "RetryScheduled" => Some(Self::RetryScheduled),
            "RetryInProgress" => Some(Self::RetryInProgress),
            "CallbackInitiated" => Some(Self::CallbackInitiated),
            "Resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// The bare wire value written back to the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missed => "Missed",
            Self::Voicemail => "Voicemail",
            Self::CallbackNeeded => "CallbackNeeded",
            Self::RetryScheduled => "RetryScheduled",
            Self::RetryInProgress => "RetryInProgress",
            Self::CallbackInitiated => "CallbackInitiated",
            Self::Resolved => "Resolved",
        }
    }

    /// Terminal state — no job touches the record again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// One lead/call row, typed.
#[derive(Debug, Clone)]
pub struct LeadRecord {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub phone: Option<String>,
    pub outcome: Option<CallOutcome>,
    pub callback_scheduled: Option<DateTime<Utc>>,
    pub retry_attempted: Option<DateTime<Utc>>,
    pub outbound_call_id: Option<String>,
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
    pub last_drip_stage_sent: Option<u32>,
}

impl LeadRecord {
    /// Build from a record envelope. Malformed individual fields degrade to
    /// `None` rather than failing the whole page.
    pub fn from_fields(id: String, created_time: DateTime<Utc>, fields_map: &Value) -> Self {
        Self {
            id,
            created_time,
            phone: non_empty_str(fields_map, fields::PHONE),
            outcome: fields_map
                .get(fields::CALL_OUTCOME)
                .and_then(Value::as_str)
                .and_then(CallOutcome::parse),
            callback_scheduled: timestamp(fields_map, fields::CALLBACK_SCHEDULED),
            retry_attempted: timestamp(fields_map, fields::RETRY_ATTEMPTED),
            outbound_call_id: non_empty_str(fields_map, fields::OUTBOUND_CALL_ID),
            last_reminder_sent_at: timestamp(fields_map, fields::LAST_REMINDER_SENT_AT),
            last_drip_stage_sent: fields_map
                .get(fields::LAST_DRIP_STAGE_SENT)
                .and_then(Value::as_u64)
                .map(|v| v as u32),
        }
    }

    /// The phone number, if present and non-empty.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Whole days elapsed since the record was created (floor).
    /// Negative ages (clock skew, future createdTime) return `None`.
    pub fn days_since_created(&self, now: DateTime<Utc>) -> Option<u32> {
        let days = (now - self.created_time).num_days();
        u32::try_from(days).ok()
    }
}

fn non_empty_str(fields_map: &Value, key: &str) -> Option<String> {
    fields_map
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn timestamp(fields_map: &Value, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields_map.get(key)?.as_str()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Unparseable timestamp in '{key}': '{raw}' ({e})");
            None
        }
    }
}

/// Handle returned by the outbound-call subsystem after a dial is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallHandle {
    pub sid: String,
}
