//! Retry callback scheduler.
//!
//! Re-dials missed callers who have a callback time on file. State machine
//! per record: `Missed` → `RetryInProgress` (claim) → `RetryScheduled` on a
//! successful dial, back to `Missed` on a failed one. The store has no
//! conditional writes, so the claim narrows — not closes — the window in
//! which two overlapping invocations could double-dial; serializing
//! invocations stays the external scheduler's job.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use followup_core::config::JobsConfig;
use followup_core::error::Result;
use followup_core::traits::{CallDialer, RecordStore};
use followup_core::types::{CallOutcome, fields};
use followup_store::Formula;
use serde_json::json;

use crate::report::RunSummary;

pub struct RetryScheduler<'a> {
    store: &'a dyn RecordStore,
    dialer: &'a dyn CallDialer,
    budget: Duration,
}

impl<'a> RetryScheduler<'a> {
    pub fn new(store: &'a dyn RecordStore, dialer: &'a dyn CallDialer, jobs: &JobsConfig) -> Self {
        Self {
            store,
            dialer,
            budget: Duration::from_secs(jobs.budget_secs),
        }
    }

    /// One pass. A record whose dial fails is released back to `Missed`
    /// and counted as failed — the next invocation picks it up again.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let mut summary = RunSummary::new("retry");
        let started = Instant::now();

        let formula = Formula::and([
            Formula::eq(fields::CALL_OUTCOME, CallOutcome::Missed.as_str()),
            Formula::not_empty(fields::CALLBACK_SCHEDULED),
        ])
        .render();
        let records = self.store.query(Some(&formula)).await?;
        summary.found = records.len();
        tracing::info!("🔎 [retry] {} missed call(s) with callback time", records.len());

        for record in records {
            if started.elapsed() >= self.budget {
                tracing::warn!("⏱️ [retry] budget exhausted, stopping early");
                summary.truncated = true;
                break;
            }

            if record.outcome != Some(CallOutcome::Missed) || record.callback_scheduled.is_none() {
                summary.skipped += 1;
                continue;
            }
            let Some(phone) = record.phone() else {
                tracing::debug!("[retry] {} has no phone, skipping", record.id);
                summary.skipped += 1;
                continue;
            };

            // Claim before dialing.
            let claim = json!({ fields::CALL_OUTCOME: CallOutcome::RetryInProgress.as_str() });
            if let Err(e) = self.store.patch(&record.id, claim).await {
                summary.record_failure(&record.id, format!("claim failed: {e}"));
                continue;
            }

            match self.dialer.start_call(phone, &record.id, true).await {
                Ok(handle) => {
                    tracing::info!("📞 [retry] dial accepted {} → {phone} ({})", handle.sid, record.id);
                    let update = json!({
                        fields::CALL_OUTCOME: CallOutcome::RetryScheduled.as_str(),
                        fields::RETRY_ATTEMPTED: now.to_rfc3339(),
                        fields::OUTBOUND_CALL_ID: handle.sid,
                    });
                    match self.store.patch(&record.id, update).await {
                        Ok(_) => summary.sent += 1,
                        Err(e) => {
                            // The call went out; only the marker is missing.
                            summary.sent += 1;
                            summary.note(&record.id, format!("retry marker patch failed: {e}"));
                        }
                    }
                }
                Err(e) => {
                    summary.record_failure(&record.id, e);
                    let release = json!({ fields::CALL_OUTCOME: CallOutcome::Missed.as_str() });
                    if let Err(pe) = self.store.patch(&record.id, release).await {
                        summary.note(&record.id, format!("claim release failed: {pe}"));
                    }
                }
            }
        }

        tracing::info!("🏁 {summary}");
        Ok(summary)
    }
}
