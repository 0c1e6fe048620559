//! Telemetry
//!
//! Installs the global tracing subscriber.

use crate::config::{LogConfig, LogFormat};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Stream log lines are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
}

impl LogOutput {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Install the fmt subscriber for the given level and format.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(log: &LogConfig, output: LogOutput) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(log.level.as_tracing())
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(output.make_writer());

    match log.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Console => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}
