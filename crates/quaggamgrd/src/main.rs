//! quaggamgrd - Quagga/FRR configuration manager daemon
//!
//! Reconciles the running configuration against a desired-state document
//! and reports what was (or would be) changed.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use quagga_cfgmgr_common::VtyshTransport;
use quaggamgrd::{build_text_report, build_vtysh_script, OutputFormat, QuaggaMgr, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let settings = Settings::parse();
    init_logging(&settings.log_level);

    info!("--- Starting quaggamgrd ---");

    let desired = settings
        .load_desired()
        .with_context(|| format!("loading desired state from {}", settings.desired.display()))?;
    info!(entities = desired.len(), "Loaded desired state");

    let mgr = QuaggaMgr::new(VtyshTransport::new(&settings.vtysh)).with_dry_run(settings.dry_run);
    let summary = mgr.reconcile(&desired).await;

    match settings.output {
        OutputFormat::Text => print!("{}", build_text_report(&summary)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serializing summary")?
        ),
        OutputFormat::Script => print!("{}", build_vtysh_script(&settings.vtysh, &summary)),
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();
}
