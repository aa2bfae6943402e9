//! # Follow-Up Channels
//!
//! Outbound side of the follow-up workflow: the Twilio SMS gateway, the
//! internal outbound-call trigger, and the Slack-style alert webhook used
//! for batch-failure reporting.

pub mod alerts;
pub mod sms;
pub mod voice;

pub use alerts::AlertWebhook;
pub use sms::TwilioSms;
pub use voice::CallTrigger;
