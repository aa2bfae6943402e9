//! # YoBot Follow-Up
//!
//! Missed-call follow-up jobs for the YoBot dashboard. One job per
//! invocation, intended to be fired by cron:
//!
//!   yobot-followup watchdog    # remind callers with a passed callback time
//!   yobot-followup drip        # day-1/3/7 follow-up texts
//!   yobot-followup retry       # re-dial missed callers
//!
//! Exit codes: 0 clean run (including nothing to do), 1 batch failure
//! (config/auth/store error), 2 completed with per-record failures.

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use followup_channels::{AlertWebhook, CallTrigger, TwilioSms};
use followup_core::FollowupConfig;
use followup_jobs::{DripCampaign, RetryScheduler, RunSummary, Watchdog};
use followup_store::AirtableStore;

#[derive(Parser)]
#[command(
    name = "yobot-followup",
    version,
    about = "📵 YoBot missed-call follow-up jobs"
)]
struct Cli {
    /// Config file path (default ~/.yobot/followup.toml; env vars still win)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    job: JobCommand,
}

#[derive(Subcommand, Clone, Copy)]
enum JobCommand {
    /// Send one reminder SMS per callback whose scheduled time has passed
    Watchdog,
    /// Send day-1/3/7 follow-up texts keyed by record age
    Drip,
    /// Re-dial missed callers with a callback time and mark the attempt
    Retry,
}

impl JobCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Watchdog => "watchdog",
            Self::Drip => "drip",
            Self::Retry => "retry",
        }
    }
}

#[tokio::main]
async fn main() {
    let code = run().await;
    std::process::exit(code);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "yobot_followup=debug,followup_jobs=debug,followup_store=debug,followup_channels=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ {e}");
            return 1;
        }
    };

    let needs_voice = matches!(cli.job, JobCommand::Retry);
    if let Err(e) = config.validate(needs_voice) {
        tracing::error!("❌ {e}");
        return 1;
    }

    let alerts = AlertWebhook::new(&config.alerts);
    let store = match AirtableStore::new(&config.store) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("❌ {e}");
            return 1;
        }
    };

    let job = cli.job;
    let now = Utc::now();
    tracing::info!("▶️ {} starting", job.name());

    let result = match job {
        JobCommand::Watchdog => match TwilioSms::new(&config.sms) {
            Ok(sms) => Watchdog::new(&store, &sms, &config.jobs).run(now).await,
            Err(e) => Err(e),
        },
        JobCommand::Drip => match TwilioSms::new(&config.sms) {
            Ok(sms) => DripCampaign::new(&store, &sms, &config.jobs).run(now).await,
            Err(e) => Err(e),
        },
        JobCommand::Retry => match CallTrigger::new(&config.voice) {
            Ok(dialer) => {
                RetryScheduler::new(&store, &dialer, &config.jobs)
                    .run(now)
                    .await
            }
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(summary) => {
            println!("{summary}");
            report_partial_failures(&alerts, &summary).await;
            summary.exit_code()
        }
        Err(e) => {
            tracing::error!("❌ {} batch failed: {e}", job.name());
            alerts
                .post(&format!("❌ yobot-followup {} run failed: {e}", job.name()))
                .await;
            1
        }
    }
}

fn load_config(path: Option<&str>) -> followup_core::Result<FollowupConfig> {
    match path {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw).to_string();
            FollowupConfig::load_path(std::path::Path::new(&expanded))
        }
        None => FollowupConfig::load(),
    }
}

async fn report_partial_failures(alerts: &AlertWebhook, summary: &RunSummary) {
    if summary.failed == 0 {
        return;
    }
    let detail = if summary.errors.is_empty() {
        String::new()
    } else {
        format!("; {}", summary.errors.join(" | "))
    };
    alerts
        .post(&format!("⚠️ yobot-followup {summary}{detail}"))
        .await;
}
