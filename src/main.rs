//! lb-probe - Load balancer distribution prober
//!
//! Composition root: loads configuration, wires the HTTP prober into the
//! dispatcher, runs the probes, and prints the report.

use lb_probe::adapters::outbound::{render_json, render_text, HttpProber};
use lb_probe::application::{DispatchSettings, Dispatcher};
use lb_probe::config::load_probe_config;
use lb_probe::infrastructure::{init_tracing, LogOutput};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration errors stop the run before any probe is sent
    let cfg = load_probe_config()?;

    init_tracing(&cfg.log, LogOutput::Stderr)?;

    let prober = Arc::new(HttpProber::from_config(&cfg)?);
    let dispatcher = Dispatcher::new(prober, DispatchSettings::from(&cfg))?;

    let settings = dispatcher.settings();
    tracing::info!(
        application = "lb-probe",
        version = env!("CARGO_PKG_VERSION"),
        url = %cfg.endpoint(),
        requests = settings.request_count,
        concurrency = settings.concurrency,
        timeout_ms = settings.timeout.as_millis() as u64,
        "starting..."
    );

    let report = dispatcher.run().await?;
    let summary = report.summarize();

    print!("{}", render_text(&summary));
    println!("\n=== JSON Output ===");
    match render_json(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("failed to marshal stats to JSON: {}", e),
    }

    Ok(())
}
