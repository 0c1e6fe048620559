use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Configuration errors. All of them are fatal before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: invalid number '{value}'")]
    InvalidNumber { key: String, value: String },
    #[error("target url is required")]
    MissingTargetUrl,
    #[error("invalid target url '{0}'")]
    InvalidTargetUrl(String),
    #[error("request count must not be negative (got {0})")]
    NegativeRequestCount(i64),
    #[error("concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(i64),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("invalid log level: {0} (must be debug, info, warn, or error)")]
    InvalidLogLevel(String),
    #[error("invalid log format: {0} (must be console or json)")]
    InvalidLogFormat(String),
    #[error("invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(i64),
    #[error("listen address cannot be empty")]
    EmptyListenAddress,
    #[error("http client: {0}")]
    HttpClient(String),
}

/// Minimum severity of emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Console,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

/// Prober settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProbeConfig {
    /// Base URL of the load balancer under test
    pub target_url: String,
    /// Path appended to `target_url` for each probe
    pub probe_path: String,
    pub request_count: u64,
    pub concurrency: usize,
    pub timeout: Duration,
    pub log: LogConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target_url: "http://localhost:8080".to_string(),
            probe_path: "/api/ping".to_string(),
            request_count: 100,
            concurrency: 10,
            timeout: Duration::from_secs(5),
            log: LogConfig {
                level: LogLevel::Info,
                format: LogFormat::Console,
            },
        }
    }
}

impl ProbeConfig {
    /// Build from a key lookup (environment variables in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let target_url = lookup("LBPROBE_URL").unwrap_or(defaults.target_url);
        let probe_path = lookup("LBPROBE_PATH").unwrap_or(defaults.probe_path);

        let request_count = parse_i64(&lookup, "LBPROBE_REQUESTS")?
            .unwrap_or(defaults.request_count as i64);
        if request_count < 0 {
            return Err(ConfigError::NegativeRequestCount(request_count));
        }

        let concurrency = parse_i64(&lookup, "LBPROBE_CONCURRENCY")?
            .unwrap_or(defaults.concurrency as i64);
        if concurrency < 1 {
            return Err(ConfigError::InvalidConcurrency(concurrency));
        }

        let timeout = parse_i64(&lookup, "LBPROBE_TIMEOUT_MS")?
            .map(|ms| Duration::from_millis(ms.max(0) as u64))
            .unwrap_or(defaults.timeout);

        let level = if lookup("DEBUG").is_some() {
            LogLevel::Debug
        } else {
            lookup("LBPROBE_LOG_LEVEL")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.log.level)
        };
        let format = lookup("LBPROBE_LOG_FORMAT")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(defaults.log.format);

        let cfg = Self {
            target_url,
            probe_path,
            request_count: request_count as u64,
            concurrency: concurrency as usize,
            timeout,
            log: LogConfig { level, format },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::MissingTargetUrl);
        }
        reqwest::Url::parse(&self.target_url)
            .map_err(|_| ConfigError::InvalidTargetUrl(self.target_url.clone()))?;
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(0));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Full URL each probe is sent to.
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.target_url.trim_end_matches('/'),
            self.probe_path
        )
    }
}

/// Ping server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub listen_address: String,
    pub port: u16,
    /// Identity reported in ping replies; resolved from the host if unset
    pub hostname: Option<String>,
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0".to_string(),
            port: 8080,
            hostname: None,
            log: LogConfig {
                level: LogLevel::Info,
                format: LogFormat::Json,
            },
        }
    }
}

impl ServerConfig {
    /// Build from a key lookup (environment variables in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_address =
            lookup("PING_SERVER_LISTEN_ADDRESS").unwrap_or(defaults.listen_address);
        if listen_address.trim().is_empty() {
            return Err(ConfigError::EmptyListenAddress);
        }

        let port = parse_i64(&lookup, "PING_SERVER_PORT")?.unwrap_or(defaults.port as i64);
        if !(1..=65535).contains(&port) {
            return Err(ConfigError::InvalidPort(port));
        }

        let hostname = lookup("PING_SERVER_HOSTNAME").filter(|h| !h.trim().is_empty());

        let level = lookup("PING_SERVER_LOG_LEVEL")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(defaults.log.level);
        let format = lookup("PING_SERVER_LOG_FORMAT")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(defaults.log.format);

        Ok(Self {
            listen_address,
            port: port as u16,
            hostname,
            log: LogConfig { level, format },
        })
    }

    /// host:port the server binds to.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.listen_address, self.port)
    }
}

fn parse_i64<F>(lookup: &F, key: &str) -> Result<Option<i64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<i64>();
    match parsed {
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(ConfigError::InvalidNumber {
            key: key.to_string(),
            value,
        }),
    }
}

/// Load prober settings from the process environment.
pub fn load_probe_config() -> Result<ProbeConfig, ConfigError> {
    ProbeConfig::from_lookup(|key| std::env::var(key).ok())
}

/// Load ping server settings from the process environment.
pub fn load_server_config() -> Result<ServerConfig, ConfigError> {
    ServerConfig::from_lookup(|key| std::env::var(key).ok())
}
