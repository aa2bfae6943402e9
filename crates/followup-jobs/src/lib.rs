//! # Follow-Up Jobs
//!
//! The three single-pass jobs behind the YoBot missed-call workflow:
//!
//! - [`Watchdog`] — reminds callers whose scheduled callback time passed.
//! - [`DripCampaign`] — fixed-offset (day 1/3/7) follow-up SMS sequence.
//! - [`RetryScheduler`] — re-dials missed callers and marks the attempt.
//!
//! The jobs never coordinate with each other; the record store's field
//! values are the only shared state. Each job is invoked once per external
//! scheduler tick, takes `now` at the call boundary, and returns a
//! [`RunSummary`]. Per-record failures are counted and the batch continues;
//! store query failures abort the invocation.

pub mod drip;
pub mod report;
pub mod retry;
pub mod templates;
pub mod watchdog;

pub use drip::DripCampaign;
pub use report::RunSummary;
pub use retry::RetryScheduler;
pub use watchdog::Watchdog;

#[cfg(test)]
pub(crate) mod testkit;
