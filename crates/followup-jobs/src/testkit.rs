//! In-memory fakes for the client traits.
//!
//! `FakeStore` applies patches to its records so repeat-invocation tests
//! observe the same marker fields a real store would persist.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use followup_core::error::{FollowupError, Result};
use followup_core::traits::{CallDialer, RecordStore, SmsSender};
use followup_core::types::{CallHandle, CallOutcome, LeadRecord, fields};
use serde_json::Value;

/// A blank record with only id + createdTime set.
pub fn lead(id: &str, created: DateTime<Utc>) -> LeadRecord {
    LeadRecord {
        id: id.into(),
        created_time: created,
        phone: None,
        outcome: None,
        callback_scheduled: None,
        retry_attempted: None,
        outbound_call_id: None,
        last_reminder_sent_at: None,
        last_drip_stage_sent: None,
    }
}

pub struct FakeStore {
    pub records: Mutex<Vec<LeadRecord>>,
    pub patches: Mutex<Vec<(String, Value)>>,
    pub fail_query: bool,
    pub fail_patch: bool,
}

impl FakeStore {
    pub fn with(records: Vec<LeadRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            patches: Mutex::new(Vec::new()),
            fail_query: false,
            fail_patch: false,
        }
    }

    pub fn record(&self, id: &str) -> LeadRecord {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .expect("record exists")
    }

    pub fn patch_log(&self) -> Vec<(String, Value)> {
        self.patches.lock().unwrap().clone()
    }
}

fn apply(record: &mut LeadRecord, update: &Value) {
    let Some(map) = update.as_object() else {
        return;
    };
    for (key, value) in map {
        match key.as_str() {
            fields::CALL_OUTCOME => {
                record.outcome = value.as_str().and_then(CallOutcome::parse);
            }
            fields::PHONE => {
                record.phone = value.as_str().map(String::from);
            }
            fields::CALLBACK_SCHEDULED => {
                record.callback_scheduled = parse_ts(value);
            }
            fields::RETRY_ATTEMPTED => {
                record.retry_attempted = parse_ts(value);
            }
            fields::OUTBOUND_CALL_ID => {
                record.outbound_call_id = value.as_str().map(String::from);
            }
            fields::LAST_REMINDER_SENT_AT => {
                record.last_reminder_sent_at = parse_ts(value);
            }
            fields::LAST_DRIP_STAGE_SENT => {
                record.last_drip_stage_sent = value.as_u64().map(|v| v as u32);
            }
            _ => {}
        }
    }
}

fn parse_ts(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn query(&self, _formula: Option<&str>) -> Result<Vec<LeadRecord>> {
        if self.fail_query {
            return Err(FollowupError::Remote {
                status: 503,
                message: "store down".into(),
            });
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn patch(&self, record_id: &str, fields_update: Value) -> Result<LeadRecord> {
        if self.fail_patch {
            return Err(FollowupError::Remote {
                status: 500,
                message: "patch rejected".into(),
            });
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| FollowupError::Validation(format!("no such record {record_id}")))?;
        apply(record, &fields_update);
        let updated = record.clone();
        drop(records);
        self.patches
            .lock()
            .unwrap()
            .push((record_id.to_string(), fields_update));
        Ok(updated)
    }
}

pub struct FakeSms {
    /// (to, body) pairs, recorded even for failing sends so tests can
    /// assert the batch kept iterating.
    pub sends: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl FakeSms {
    pub fn new() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsSender for FakeSms {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        let mut sends = self.sends.lock().unwrap();
        sends.push((to.to_string(), body.to_string()));
        if self.fail {
            return Err(FollowupError::Delivery("gateway error 500".into()));
        }
        Ok(format!("SM{:03}", sends.len()))
    }
}

pub enum DialOutcome {
    Accept,
    Refuse(u16),
}

pub struct FakeDialer {
    pub calls: Mutex<Vec<(String, String, bool)>>,
    pub outcome: DialOutcome,
}

impl FakeDialer {
    pub fn accepting() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: DialOutcome::Accept,
        }
    }

    pub fn refusing(status: u16) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: DialOutcome::Refuse(status),
        }
    }

    pub fn dialed(&self) -> Vec<(String, String, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallDialer for FakeDialer {
    async fn start_call(&self, phone: &str, record_id: &str, retry: bool) -> Result<CallHandle> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((phone.to_string(), record_id.to_string(), retry));
        match self.outcome {
            DialOutcome::Accept => Ok(CallHandle {
                sid: format!("CA{:03}", calls.len()),
            }),
            DialOutcome::Refuse(status) => Err(FollowupError::Remote {
                status,
                message: "call trigger error".into(),
            }),
        }
    }
}
