//! Ping Server
//!
//! Minimal backend endpoint for load balancer probing. Each instance
//! answers `GET /api/ping` with its own hostname so a prober behind the
//! balancer can tell which backend served a request.

use crate::domain::entities::PingResponse;
use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Path the ping handler is mounted on.
pub const PING_PATH: &str = "/api/ping";

/// Ping Server state.
///
/// The hostname is resolved once when the server is built, so a server
/// started without one answers every ping with 500 for its lifetime.
#[derive(Clone)]
pub struct PingState {
    /// Identity reported in replies; `None` makes every ping fail with 500
    hostname: Option<Arc<str>>,
}

impl PingState {
    pub fn new(hostname: Option<String>) -> Self {
        Self {
            hostname: hostname.map(Arc::from),
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
}

/// HTTP server exposing the ping endpoint.
pub struct PingServer {
    listen_addr: String,
    state: PingState,
}

impl PingServer {
    /// Create a server reporting `hostname`, or the host's own name when
    /// `None`.
    pub fn new(listen_addr: String, hostname: Option<String>) -> Self {
        let hostname = hostname.or_else(resolve_hostname);
        if hostname.is_none() {
            tracing::error!("failed to get hostname; pings will fail");
        }
        Self {
            listen_addr,
            state: PingState::new(hostname),
        }
    }

    pub fn state(&self) -> PingState {
        self.state.clone()
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("starting HTTP server address={}", self.listen_addr);
        serve(listener, self.state.clone(), shutdown).await
    }
}

/// Build the ping router.
pub fn router(state: PingState) -> Router {
    Router::new()
        .route(PING_PATH, get(ping_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the ping router on an already-bound listener.
pub async fn serve<F>(listener: TcpListener, state: PingState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn ping_handler(
    State(state): State<PingState>,
    remote: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<PingResponse>, StatusCode> {
    let Some(hostname) = state.hostname() else {
        tracing::error!("failed to get hostname");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let remote_addr = remote
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();
    tracing::info!(hostname = %hostname, remote_addr = %remote_addr, "ping request handled");

    Ok(Json(PingResponse::pong(hostname)))
}

/// Best-effort lookup of the machine's hostname.
pub fn resolve_hostname() -> Option<String> {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/proc/sys/kernel/hostname").ok())
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}
