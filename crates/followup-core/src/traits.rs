//! Client traits — the seams between the jobs and the outside world.
//!
//! The HTTP clients in `followup-store` and `followup-channels` implement
//! these; job tests substitute in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{CallHandle, LeadRecord};

/// Read/write access to the lead/call table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List records matching a filter formula (`None` = all records).
    async fn query(&self, formula: Option<&str>) -> Result<Vec<LeadRecord>>;

    /// Partially update one record's fields. Last write wins — the store
    /// offers no conditional updates.
    async fn patch(&self, record_id: &str, fields: Value) -> Result<LeadRecord>;
}

/// Sends a single SMS. The from-number is client configuration.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Returns the gateway's message id.
    async fn send(&self, to: &str, body: &str) -> Result<String>;
}

/// Asks the voice subsystem to place an outbound call.
#[async_trait]
pub trait CallDialer: Send + Sync {
    /// A timeout here leaves the dial in unknown state — the caller must
    /// not assume the call was placed.
    async fn start_call(&self, phone: &str, record_id: &str, retry: bool) -> Result<CallHandle>;
}
