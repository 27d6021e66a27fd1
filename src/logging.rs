//! # Structured Logging Module
//!
//! Environment-aware structured logging for the submission, worker and
//! query paths. Console output is either human-readable or JSON lines.

use chrono::Utc;
use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigManager, LogFormat, LoggingConfig};
use crate::models::ProcessingStep;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging from environment variables alone
///
/// Used before configuration is available. Format comes from
/// `TEXT_TASKER_LOG_FORMAT` (`json` or `pretty`), the environment from
/// [`ConfigManager::detect_environment`].
pub fn init_structured_logging() {
    let config = LoggingConfig {
        format: log_format_from(std::env::var("TEXT_TASKER_LOG_FORMAT").ok().as_deref()),
        level: None,
    };
    init_with_config(&config, &ConfigManager::detect_environment());
}

/// Initialize structured logging with environment-specific configuration
///
/// Only the first call in a process has any effect.
pub fn init_with_config(config: &LoggingConfig, environment: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = match std::env::var("RUST_LOG") {
            Ok(directive) if !directive.trim().is_empty() => EnvFilter::new(directive),
            _ => EnvFilter::new(
                config
                    .level
                    .clone()
                    .unwrap_or_else(|| get_log_level(environment)),
            ),
        };

        let layer = match config.format {
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .json()
                .with_filter(filter)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
        };

        // A global subscriber may already be installed by the host process
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
            return;
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            format = ?config.format,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

fn log_format_from(value: Option<&str>) -> LogFormat {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for task operations
pub fn log_task_operation(
    operation: &str,
    task_id: &str,
    kind: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_id = %task_id,
        kind = kind,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 TASK_OPERATION"
    );
}

/// Log structured data for completed pipeline steps
pub fn log_step_operation(task_id: &str, step: &ProcessingStep, status: &str) {
    tracing::debug!(
        task_id = %task_id,
        step = step.index,
        total = step.total_steps,
        description = %step.description,
        progress = step.progress(),
        status = %status,
        "🔧 STEP_OPERATION"
    );
}
