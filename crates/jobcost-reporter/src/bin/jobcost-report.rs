//! jobcost-report
//!
//! Reports the cost of one finished job. Reads a JSON job report from the
//! file given as argument, or from stdin:
//!
//! ```text
//! jobcost-report [--dry-run] [report.json]
//! ```
//!
//! ```json
//! {
//!   "customer_id": "acme",
//!   "record": {
//!     "environment": "glue",
//!     "region": "us-east-1",
//!     "worker_type": "G.1X",
//!     "worker_count": 2
//!   },
//!   "duration_seconds": 3600,
//!   "success": true
//! }
//! ```

use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobcost_common::{UsageRecord, CURRENCY, VERSION};
use jobcost_reporter::{CostReporter, LogSink, ReporterConfig};

#[derive(Debug, Deserialize)]
struct JobReport {
    customer_id: String,
    record: UsageRecord,
    duration_seconds: f64,
    #[serde(default = "default_success")]
    success: bool,
}

fn default_success() -> bool {
    true
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut dry_run = false;
    let mut input = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            flag if flag.starts_with("--") => bail!("unknown option: {}", flag),
            path => input = Some(path.to_string()),
        }
    }

    info!(version = VERSION, dry_run, "Starting jobcost-report");

    let config = ReporterConfig::load()?;

    let raw = match &input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading job report from stdin")?;
            buf
        }
    };
    let report: JobReport = serde_json::from_str(&raw).context("parsing job report")?;

    let reporter = if dry_run {
        CostReporter::with_sink(&config, Arc::new(LogSink))?
    } else {
        CostReporter::from_config(&config)?
    };

    let result = reporter.report_job_cost(
        &report.customer_id,
        &report.record,
        report.duration_seconds,
        report.success,
    )?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    info!(
        total_cost = result.total_cost,
        currency = CURRENCY,
        "Done"
    );

    Ok(())
}
