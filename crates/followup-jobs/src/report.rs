//! Per-invocation run summary.
//!
//! One summary per job run; the binary logs it, maps it to an exit code,
//! and includes it in failure alerts so the external scheduler can tell
//! "nothing to do" apart from "crashed".

use uuid::Uuid;

/// Outcome counts for one job invocation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Job name ("watchdog", "drip", "retry").
    pub job: &'static str,
    /// Correlation id for this invocation, included in logs and alerts.
    pub run_id: String,
    /// Records that matched the job's trigger condition.
    pub found: usize,
    /// Successful actions: SMS delivered or calls placed.
    pub sent: usize,
    /// Records skipped without action (no phone, already handled, not due).
    pub skipped: usize,
    /// Records where the action failed. Never overlaps with `sent`.
    pub failed: usize,
    /// The wall-clock budget ran out before the batch finished.
    pub truncated: bool,
    /// Per-record error lines, for the log and the alert payload.
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn new(job: &'static str) -> Self {
        Self {
            job,
            run_id: Uuid::new_v4().to_string(),
            found: 0,
            sent: 0,
            skipped: 0,
            failed: 0,
            truncated: false,
            errors: Vec::new(),
        }
    }

    /// Count a per-record failure and keep the batch going.
    pub fn record_failure(&mut self, record_id: &str, error: impl std::fmt::Display) {
        self.failed += 1;
        let line = format!("{record_id}: {error}");
        tracing::warn!("⚠️ [{}] {line}", self.job);
        self.errors.push(line);
    }

    /// Note a non-fatal problem that should surface without counting the
    /// record as failed (e.g. a marker patch after a successful send).
    pub fn note(&mut self, record_id: &str, error: impl std::fmt::Display) {
        let line = format!("{record_id}: {error}");
        tracing::warn!("⚠️ [{}] {line}", self.job);
        self.errors.push(line);
    }

    /// Process exit code: 0 clean, 2 completed with per-record failures.
    /// (Batch-level errors never reach a summary — they exit 1 upstream.)
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 { 2 } else { 0 }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} run {}: found={} sent={} skipped={} failed={} truncated={}",
            self.job, self.run_id, self.found, self.sent, self.skipped, self.failed, self.truncated
        )
    }
}
