use std::fs::OpenOptions;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

static INIT: Once = Once::new();

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Whether to include source code locations
    pub source_location: bool,
    /// Whether to log span open/close events
    pub log_spans: bool,
    /// Output file path (None for stdout)
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            source_location: false,
            log_spans: false,
            file_path: None,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Only the first call in a process does anything; later calls return `Ok`.
pub fn setup_logging(config: LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = setup_logging_internal(config);
    });

    result
}

fn setup_logging_internal(config: LogConfig) -> Result<(), String> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(if config.log_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    if let Some(path) = config.file_path {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        subscriber
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .try_init()
            .map_err(|e| format!("Failed to set global subscriber: {}", e))?;
    } else {
        subscriber
            .try_init()
            .map_err(|e| format!("Failed to set global subscriber: {}", e))?;
    }

    Ok(())
}

/// Error reporting seam for failures that are swallowed rather than returned.
///
/// `template` may reference context entries as `{key}`.
pub trait Logger: Send + Sync {
    /// Report an error rendered from `template` and `context`
    fn error(&self, template: &str, context: &[(&str, &str)]);
}

/// Reports through `tracing` at error level.
///
/// The `kind` and `message` context entries become the `kind` and `detail`
/// fields. Any other entries are collected into `context`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, template: &str, context: &[(&str, &str)]) {
        let rendered = interpolate(template, context);
        let lookup = |key: &str| {
            context
                .iter()
                .find(|(k, _)| *k == key)
                .map_or("", |(_, v)| *v)
        };
        let extra = context
            .iter()
            .filter(|(k, _)| *k != "kind" && *k != "message")
            .map(|(k, v)| format!("{}={:?}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        tracing::error!(
            target: "queue_metrics",
            kind = %lookup("kind"),
            detail = %lookup("message"),
            context = %extra,
            "{}",
            rendered
        );
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn error(&self, _template: &str, _context: &[(&str, &str)]) {}
}

/// Replace each `{key}` in `template` with its context value
pub fn interpolate(template: &str, context: &[(&str, &str)]) -> String {
    context
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
}
