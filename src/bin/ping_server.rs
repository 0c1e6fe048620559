//! ping-server - Backend endpoint for load balancer probing
//!
//! Answers `GET /api/ping` with this host's name until Ctrl+C or SIGTERM.

use lb_probe::adapters::inbound::PingServer;
use lb_probe::config::load_server_config;
use lb_probe::infrastructure::{init_tracing, shutdown_signal, LogOutput, ShutdownController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_server_config()?;

    init_tracing(&cfg.log, LogOutput::Stdout)?;
    tracing::info!(
        application = "ping-server",
        version = env!("CARGO_PKG_VERSION"),
        "starting..."
    );

    let server = PingServer::new(cfg.server_address(), cfg.hostname.clone());
    let controller = ShutdownController::new();

    server.run(shutdown_signal(controller)).await?;

    tracing::info!("server stopped");
    Ok(())
}
