//! Logging setup for the cms-bridge CLI
//!
//! This module provides:
//! - subscriber installation in compact, full or JSON format
//! - a per-process run ID attached to operation spans
//! - redaction of credential-like fields before payloads are traced
//! - drop-timed operation spans

use crate::config;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Run ID for the current process
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Effective logging settings after flags, config file and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level filter (any `EnvFilter` directive)
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Enable ANSI colors on the console
    pub console: bool,
    /// Write to this file instead of stderr
    pub file: Option<PathBuf>,
    pub thread_ids: bool,
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line events
    Compact,
    /// Multi-field events with span context
    Full,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            "json" => Ok(Self::Json),
            other => Err(Error::config(format!(
                "Invalid log format '{}' (expected compact, full or json)",
                other
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Settings implied by the number of `-v` flags
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => config.level = "info".to_string(),
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Combine `-v` flags with the `[logging]` config section
    ///
    /// Flags win for the level; the file decides format and destination.
    pub fn resolve(verbosity: u8, file_config: &config::LoggingConfig) -> Result<Self> {
        let mut config = Self::from_verbosity(verbosity);
        if verbosity == 0 {
            config.level = file_config.level.clone();
        }
        if verbosity < 3 {
            config.format = file_config.format.parse()?;
        }
        config.file = file_config.file.clone();
        Ok(config)
    }

    /// Apply `RUST_LOG`, `CMS_BRIDGE_LOG_FORMAT` and `CMS_BRIDGE_LOG_FILE`
    pub fn merge_with_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("RUST_LOG") {
            self.level = level;
        }

        if let Some(format) = lookup("CMS_BRIDGE_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(_) => eprintln!("Warning: ignoring CMS_BRIDGE_LOG_FORMAT={}", format),
            }
        }

        if let Some(file) = lookup("CMS_BRIDGE_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
    }

    fn writer(&self) -> Result<BoxMakeWriter> {
        let Some(path) = &self.file else {
            return Ok(BoxMakeWriter::new(std::io::stderr));
        };

        let file_name = path
            .file_name()
            .ok_or_else(|| Error::config(format!("Invalid log file path: {}", path.display())))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(BoxMakeWriter::new(tracing_appender::rolling::never(
            directory, file_name,
        )))
    }
}

/// Initialize the global logging system
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))?;
    let ansi = config.console && config.file.is_none() && std::io::stderr().is_terminal();
    let writer = config.writer()?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(builder.with_ansi(ansi).compact().finish())
        }
        LogFormat::Full => tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish()),
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let run_id = RUN_ID.get_or_init(generate_run_id);
    tracing::debug!(run_id = %run_id, config = ?config, "Logging initialized");

    Ok(())
}

/// Generate a unique ID for this process
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// The run ID, once logging is initialized
pub fn current_run_id() -> Option<&'static str> {
    RUN_ID.get().map(String::as_str)
}

/// Create a span carrying the run ID and an empty `duration_ms` field
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        run_id = current_run_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Masking of credential-like values before payloads reach the log
///
/// CMS exports routinely carry user records with password hashes and
/// reset tokens.
pub mod redaction {
    use regex::Regex;
    use serde_json::Value;
    use std::sync::OnceLock;

    static SECRET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

    const SENSITIVE_KEYS: [&str; 6] = ["password", "token", "secret", "apikey", "api_key", "hash"];

    fn secret_regex() -> Option<&'static Regex> {
        SECRET_REGEX
            .get_or_init(|| {
                Regex::new(r#"(?i)(password|token|secret|api[_-]?key)[=:\s]+['"]?([^\s'",]{3,})['"]?"#)
                    .ok()
            })
            .as_ref()
    }

    /// Mask `key=value` style secrets embedded in a string
    pub fn redact_sensitive(input: &str) -> String {
        match secret_regex() {
            Some(regex) => regex.replace_all(input, "$1=***").into_owned(),
            None => input.to_string(),
        }
    }

    /// Mask values under credential-like keys, recursively
    ///
    /// Media `hash` fields are left alone; they name files, not secrets.
    pub fn redact_json_value(value: &mut Value) {
        match value {
            Value::Object(map) => {
                let is_media = map.contains_key("url") || map.contains_key("mime");
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) && !(is_media && key == "hash") && !val.is_null() {
                        *val = Value::String("***".to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(redact_json_value),
            Value::String(s) => *s = redact_sensitive(s),
            _ => {}
        }
    }

    fn is_sensitive_key(key: &str) -> bool {
        let lower = key.to_ascii_lowercase();
        SENSITIVE_KEYS.iter().any(|needle| lower.contains(needle))
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::{Duration, Instant};
    use tracing::Span;

    /// Records `duration_ms` on its operation span when finished or dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: &'static str,
    }

    impl Timer {
        pub fn new(operation: &'static str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, None),
                operation,
            }
        }

        pub fn with_details(operation: &'static str, details: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, Some(details)),
                operation,
            }
        }

        pub fn elapsed(&self) -> Duration {
            self.start.elapsed()
        }

        fn record(&self) -> u64 {
            let millis = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
            self.span.record("duration_ms", millis);
            millis
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration_ms = self.record();
            tracing::debug!(operation = self.operation, duration_ms, "Operation completed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_logging_config_from_verbosity() {
        assert_eq!(LoggingConfig::from_verbosity(0).level, "warn");
        assert_eq!(LoggingConfig::from_verbosity(1).level, "info");

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert_eq!(config.format, LogFormat::Full);
        assert!(config.thread_ids);
    }

    #[test]
    fn test_resolve_against_config_section() {
        let section = config::LoggingConfig {
            level: "error".to_string(),
            format: "json".to_string(),
            file: Some(PathBuf::from("bridge.log")),
        };

        let quiet = LoggingConfig::resolve(0, &section).unwrap();
        assert_eq!(quiet.level, "error");
        assert_eq!(quiet.format, LogFormat::Json);
        assert_eq!(quiet.file, Some(PathBuf::from("bridge.log")));

        let verbose = LoggingConfig::resolve(2, &section).unwrap();
        assert_eq!(verbose.level, "debug");

        let bad = config::LoggingConfig {
            format: "xml".to_string(),
            ..section
        };
        assert!(LoggingConfig::resolve(0, &bad).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RUST_LOG", "cms_bridge_core=trace"),
            ("CMS_BRIDGE_LOG_FORMAT", "JSON"),
            ("CMS_BRIDGE_LOG_FILE", "/tmp/bridge.log"),
        ]
        .into_iter()
        .collect();

        let mut config = LoggingConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.level, "cms_bridge_core=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/bridge.log")));
    }

    #[test]
    fn test_invalid_env_format_is_ignored() {
        let mut config = LoggingConfig::default();
        config.apply_env(|name| (name == "CMS_BRIDGE_LOG_FORMAT").then(|| "xml".to_string()));
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn test_run_id_shape() {
        let id = generate_run_id();
        assert!(id.starts_with("run_"));
        assert_eq!(id.len(), 4 + 32);
        assert_ne!(id, generate_run_id());
    }

    #[test]
    fn test_redaction() {
        let redacted = redaction::redact_sensitive("token=abc123xyz password: hunter22");
        assert_eq!(redacted, "token=*** password=***");
    }

    #[test]
    fn test_json_redaction() {
        let mut value = json!({
            "id": 1,
            "attributes": {
                "username": "ann",
                "password": "$2a$10$abcdef",
                "resetPasswordToken": null,
                "avatar": {"data": {"id": 2, "attributes": {"url": "/a.png", "hash": "a_1f"}}}
            }
        });

        redaction::redact_json_value(&mut value);

        assert_eq!(value["attributes"]["username"], "ann");
        assert_eq!(value["attributes"]["password"], "***");
        assert!(value["attributes"]["resetPasswordToken"].is_null());
        assert_eq!(
            value["attributes"]["avatar"]["data"]["attributes"]["hash"],
            "a_1f"
        );
    }
}
