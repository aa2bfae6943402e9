//! Missed-call watchdog.
//!
//! Finds records still marked `CallbackNeeded` whose scheduled callback
//! time has passed and sends one reminder SMS each. The job never changes
//! `callOutcome`; it only stamps `lastReminderSentAt` so a repeat
//! invocation doesn't text the same caller twice for the same window.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use followup_core::config::JobsConfig;
use followup_core::error::Result;
use followup_core::traits::{RecordStore, SmsSender};
use followup_core::types::{CallOutcome, fields};
use followup_store::Formula;
use serde_json::json;

use crate::report::RunSummary;
use crate::templates;

pub struct Watchdog<'a> {
    store: &'a dyn RecordStore,
    sms: &'a dyn SmsSender,
    budget: Duration,
}

impl<'a> Watchdog<'a> {
    pub fn new(store: &'a dyn RecordStore, sms: &'a dyn SmsSender, jobs: &JobsConfig) -> Self {
        Self {
            store,
            sms,
            budget: Duration::from_secs(jobs.budget_secs),
        }
    }

    /// One pass. Store query failures abort; per-record send failures are
    /// counted and the batch continues.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let mut summary = RunSummary::new("watchdog");
        let started = Instant::now();

        let formula = Formula::and([
            Formula::eq(fields::CALL_OUTCOME, CallOutcome::CallbackNeeded.as_str()),
            Formula::is_before_now(fields::CALLBACK_SCHEDULED),
        ])
        .render();
        let records = self.store.query(Some(&formula)).await?;
        summary.found = records.len();
        tracing::info!("🔎 [watchdog] {} due callback(s)", records.len());

        for record in records {
            if started.elapsed() >= self.budget {
                tracing::warn!("⏱️ [watchdog] budget exhausted, stopping early");
                summary.truncated = true;
                break;
            }

            // Mirror the formula locally: the store's NOW() may drift from
            // our injected clock.
            if record.outcome != Some(CallOutcome::CallbackNeeded) {
                summary.skipped += 1;
                continue;
            }
            let Some(due) = record.callback_scheduled else {
                summary.skipped += 1;
                continue;
            };
            if due >= now {
                summary.skipped += 1;
                continue;
            }
            let Some(phone) = record.phone() else {
                tracing::debug!("[watchdog] {} has no phone, skipping", record.id);
                summary.skipped += 1;
                continue;
            };
            if record.last_reminder_sent_at.is_some_and(|sent| sent >= due) {
                tracing::debug!("[watchdog] {} already reminded, skipping", record.id);
                summary.skipped += 1;
                continue;
            }

            match self.sms.send(phone, templates::REMINDER).await {
                Ok(sid) => {
                    summary.sent += 1;
                    tracing::info!("🔔 [watchdog] reminder {sid} → {phone} ({})", record.id);
                    let marker = json!({ fields::LAST_REMINDER_SENT_AT: now.to_rfc3339() });
                    if let Err(e) = self.store.patch(&record.id, marker).await {
                        summary.note(&record.id, format!("reminder marker patch failed: {e}"));
                    }
                }
                Err(e) => summary.record_failure(&record.id, e),
            }
        }

        tracing::info!("🏁 {summary}");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{FakeSms, FakeStore, lead};
    use chrono::TimeZone;

    fn due_record(id: &str, phone: Option<&str>) -> followup_core::types::LeadRecord {
        let created = Utc.with_ymd_and_hms(2023, 12, 30, 0, 0, 0).unwrap();
        let mut record = lead(id, created);
        record.outcome = Some(CallOutcome::CallbackNeeded);
        record.callback_scheduled = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        record.phone = phone.map(String::from);
        record
    }

    fn invocation_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_sends_one_reminder_per_due_record() {
        let store = FakeStore::with(vec![due_record("rec001", Some("+15551234567"))]);
        let sms = FakeSms::new();
        let watchdog = Watchdog::new(&store, &sms, &JobsConfig::default());

        let summary = watchdog.run(invocation_time()).await.unwrap();

        assert_eq!(summary.found, 1);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 0);
        let sends = sms.sent();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].0, "+15551234567");
        assert_eq!(sends[0].1, templates::REMINDER);
    }

    #[tokio::test]
    async fn test_repeat_invocation_does_not_resend() {
        let store = FakeStore::with(vec![due_record("rec001", Some("+15551234567"))]);
        let sms = FakeSms::new();
        let watchdog = Watchdog::new(&store, &sms, &JobsConfig::default());

        let first = watchdog.run(invocation_time()).await.unwrap();
        assert_eq!(first.sent, 1);
        // Marker was patched back into the store.
        assert!(store.record("rec001").last_reminder_sent_at.is_some());

        let second = watchdog.run(invocation_time()).await.unwrap();
        assert_eq!(second.sent, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(sms.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_phone_is_skipped_without_error() {
        let store = FakeStore::with(vec![
            due_record("rec001", None),
            due_record("rec002", Some("+15557654321")),
        ]);
        let sms = FakeSms::new();
        let watchdog = Watchdog::new(&store, &sms, &JobsConfig::default());

        let summary = watchdog.run(invocation_time()).await.unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(sms.sent()[0].0, "+15557654321");
    }

    #[tokio::test]
    async fn test_not_yet_due_is_skipped() {
        let mut record = due_record("rec001", Some("+15551234567"));
        record.callback_scheduled = Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
        let store = FakeStore::with(vec![record]);
        let sms = FakeSms::new();
        let watchdog = Watchdog::new(&store, &sms, &JobsConfig::default());

        let summary = watchdog.run(invocation_time()).await.unwrap();

        assert_eq!(summary.sent, 0);
        assert_eq!(summary.skipped, 1);
        assert!(sms.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_continues_batch() {
        let store = FakeStore::with(vec![
            due_record("rec001", Some("+15551111111")),
            due_record("rec002", Some("+15552222222")),
        ]);
        let sms = FakeSms::failing();
        let watchdog = Watchdog::new(&store, &sms, &JobsConfig::default());

        let summary = watchdog.run(invocation_time()).await.unwrap();

        // Both records were attempted; both failed; batch did not abort.
        assert_eq!(sms.sent().len(), 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_query_failure_aborts_invocation() {
        let mut store = FakeStore::with(vec![]);
        store.fail_query = true;
        let sms = FakeSms::new();
        let watchdog = Watchdog::new(&store, &sms, &JobsConfig::default());

        assert!(watchdog.run(invocation_time()).await.is_err());
    }

    #[tokio::test]
    async fn test_zero_budget_truncates() {
        let store = FakeStore::with(vec![due_record("rec001", Some("+15551234567"))]);
        let sms = FakeSms::new();
        let jobs = JobsConfig {
            budget_secs: 0,
            ..JobsConfig::default()
        };
        let watchdog = Watchdog::new(&store, &sms, &jobs);

        let summary = watchdog.run(invocation_time()).await.unwrap();

        assert!(summary.truncated);
        assert_eq!(summary.sent, 0);
        assert!(sms.sent().is_empty());
    }

    #[tokio::test]
    async fn test_marker_patch_failure_still_counts_send() {
        let mut store = FakeStore::with(vec![due_record("rec001", Some("+15551234567"))]);
        store.fail_patch = true;
        let sms = FakeSms::new();
        let watchdog = Watchdog::new(&store, &sms, &JobsConfig::default());

        let summary = watchdog.run(invocation_time()).await.unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("marker patch failed"));
    }
}
