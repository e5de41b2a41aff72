//! Logging setup
//!
//! One `tracing` subscriber per process. `RUST_LOG` takes precedence over the
//! configured level.

use crate::error::{CoreError, CoreResult, ErrorContext};
use serde::{Deserialize, Serialize};
use std::io;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Emit a line when instrumented spans close (carries their duration)
    pub log_span_close: bool,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            log_span_close: false,
            filter_directives: vec![
                "proposal_auth=info".to_string(),
                "proposal_web=info".to_string(),
                "tower_http=info".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    /// Same configuration at a different base level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    fn filter(&self) -> CoreResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| logging_error(format!("Invalid log level '{}'", self.level), e))?;

        for directive in &self.filter_directives {
            let directive = directive
                .parse()
                .map_err(|e| logging_error(format!("Invalid filter directive '{directive}'"), e))?;
            filter = filter.add_directive(directive);
        }

        Ok(filter)
    }
}

/// Initialize the logging system
pub fn init_logging(config: &LoggingConfig) -> CoreResult<()> {
    let filter = config.filter()?;
    let span_events = if config.log_span_close {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_writer(io::stdout),
            )
            .try_init(),
    };

    result.map_err(|e| logging_error("Failed to install tracing subscriber".to_string(), e))
}

fn logging_error<E>(message: String, source: E) -> CoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    CoreError::Logging {
        message: format!("{message}: {source}"),
        source: Some(Box::new(source)),
        context: ErrorContext::new("logging")
            .with_operation("init")
            .with_suggestion("Use a level such as info or debug, or set RUST_LOG"),
    }
}
