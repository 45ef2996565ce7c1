//! Structured logging with tracing
//!
//! Provides subscriber setup (text or JSON output) and slow filter reporting.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: String,

    /// Enable JSON format output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Parse log level from string
    pub fn parse_level(&self) -> Level {
        match self.level.to_uppercase().as_str() {
            "ERROR" => Level::ERROR,
            "WARN" => Level::WARN,
            "INFO" => Level::INFO,
            "DEBUG" => Level::DEBUG,
            "TRACE" => Level::TRACE,
            _ => Level::INFO,
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.parse_level().to_string()));

    let subscriber = Registry::default().with(env_filter);

    if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true);

        subscriber.with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .compact();

        subscriber.with(fmt_layer).try_init()?;
    }

    tracing::info!(
        "Logging initialized: level={}, json={}",
        config.level,
        config.json_format
    );

    Ok(())
}

/// Times a filter pass and reports it when slow
#[derive(Debug)]
pub struct FilterTimer {
    start_time: Instant,
    threshold: Duration,
}

impl FilterTimer {
    /// Start timing with a threshold in milliseconds
    pub fn start(threshold_ms: u64) -> Self {
        Self {
            start_time: Instant::now(),
            threshold: Duration::from_millis(threshold_ms),
        }
    }

    /// Finish timing; returns true if the pass was reported as slow
    pub fn finish(self, scanned: usize, matched: usize) -> bool {
        let duration = self.start_time.elapsed();
        let slow = duration >= self.threshold;

        if slow {
            tracing::warn!(
                target: "slow_filter",
                duration_ms = duration.as_millis() as u64,
                threshold_ms = self.threshold.as_millis() as u64,
                scanned,
                matched,
                "Slow filter detected"
            );
        } else {
            tracing::debug!(scanned, matched, "Filter pass finished");
        }

        slow
    }
}
