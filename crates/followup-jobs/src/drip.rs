//! Drip campaign runner.
//!
//! Scans the whole table (the store has no age filter worth trusting for
//! this) and sends the day-1/3/7 follow-up text to records whose age in
//! whole days exactly matches a configured offset. `lastDripStageSent` is
//! stamped with the offset after each send, and stages only advance
//! forward, so neither a same-day re-invocation nor a backfilled record
//! gets a duplicate or out-of-order message.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use followup_core::config::JobsConfig;
use followup_core::error::Result;
use followup_core::traits::{RecordStore, SmsSender};
use followup_core::types::fields;
use serde_json::json;

use crate::report::RunSummary;
use crate::templates;

pub struct DripCampaign<'a> {
    store: &'a dyn RecordStore,
    sms: &'a dyn SmsSender,
    offsets: Vec<u32>,
    budget: Duration,
}

impl<'a> DripCampaign<'a> {
    pub fn new(store: &'a dyn RecordStore, sms: &'a dyn SmsSender, jobs: &JobsConfig) -> Self {
        Self {
            store,
            sms,
            offsets: jobs.drip_offsets_days.clone(),
            budget: Duration::from_secs(jobs.budget_secs),
        }
    }

    /// One pass. `found` counts records whose age matches an offset today;
    /// everything else is ignored without counting.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let mut summary = RunSummary::new("drip");
        let started = Instant::now();

        let records = self.store.query(None).await?;
        tracing::info!("🔎 [drip] scanning {} record(s)", records.len());

        for record in records {
            if started.elapsed() >= self.budget {
                tracing::warn!("⏱️ [drip] budget exhausted, stopping early");
                summary.truncated = true;
                break;
            }

            let Some(days) = record.days_since_created(now) else {
                continue;
            };
            if !self.offsets.contains(&days) {
                continue;
            }
            summary.found += 1;

            if record.outcome.is_some_and(|o| o.is_terminal()) {
                tracing::debug!("[drip] {} is resolved, skipping", record.id);
                summary.skipped += 1;
                continue;
            }
            let Some(phone) = record.phone() else {
                tracing::debug!("[drip] {} has no phone, skipping", record.id);
                summary.skipped += 1;
                continue;
            };
            if record.last_drip_stage_sent.is_some_and(|stage| stage >= days) {
                tracing::debug!("[drip] {} already got day-{days} message, skipping", record.id);
                summary.skipped += 1;
                continue;
            }
            let Some(body) = templates::drip_message(days) else {
                tracing::warn!("⚠️ [drip] no template for configured day-{days} offset");
                summary.skipped += 1;
                continue;
            };

            match self.sms.send(phone, body).await {
                Ok(sid) => {
                    summary.sent += 1;
                    tracing::info!("💬 [drip] day-{days} {sid} → {phone} ({})", record.id);
                    let marker = json!({ fields::LAST_DRIP_STAGE_SENT: days });
                    if let Err(e) = self.store.patch(&record.id, marker).await {
                        summary.note(&record.id, format!("drip marker patch failed: {e}"));
                    }
                }
                Err(e) => summary.record_failure(&record.id, e),
            }
        }

        tracing::info!("🏁 {summary}");
        Ok(summary)
    }
}
