//! HTTP Prober
//!
//! Implements Prober with a shared reqwest client: one GET per probe,
//! classified into transport, status, and decode failures. Anything that
//! goes wrong before a status line is a transport failure; anything that
//! goes wrong reading or parsing a 2xx body is a decode failure.

use crate::config::{ConfigError, ProbeConfig};
use crate::domain::entities::PingResponse;
use crate::domain::ports::{ProbeError, Prober};
use async_trait::async_trait;
use std::time::Duration;

/// reqwest-backed prober for a fixed endpoint.
pub struct HttpProber {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpProber {
    /// Create a prober sending GET requests to `endpoint`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a prober for the endpoint and timeout in `cfg`.
    pub fn from_config(cfg: &ProbeConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.endpoint(), cfg.timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> Result<PingResponse, ProbeError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::BadStatus(status.as_u16()));
        }

        // Past an accepted status line, a body cut short counts as a decode
        // failure. Running out of time still counts as transport.
        let body = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Transport(describe(&e))
            } else {
                ProbeError::Decode(describe(&e))
            }
        })?;

        serde_json::from_slice::<PingResponse>(&body).map_err(|e| ProbeError::Decode(e.to_string()))
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    }
}
