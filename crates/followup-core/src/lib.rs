//! # Follow-Up Core
//!
//! Shared foundation for the YoBot missed-call follow-up jobs:
//! configuration, error taxonomy, the lead/call domain model, and the
//! client traits (`RecordStore`, `SmsSender`, `CallDialer`) the jobs are
//! written against.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::FollowupConfig;
pub use error::{FollowupError, Result};
pub use traits::{CallDialer, RecordStore, SmsSender};
pub use types::{CallHandle, CallOutcome, LeadRecord};
