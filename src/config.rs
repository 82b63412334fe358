use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_source() -> String {
    "-".into()
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_concurrency() -> usize {
    4
}

fn default_sink() -> String {
    "stdout".into()
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    /// Path to a newline-delimited JSON file, or `"-"` for stdin.
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorkerConfig {
    /// Batches analyzed in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Accepted values: `"stdout"` | `"log"`
    #[serde(default = "default_sink")]
    pub sink: String,
    /// Attach the full enriched series to every report.
    #[serde(default)]
    pub include_series: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            include_series: false,
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];
const VALID_SINKS: &[&str] = &["stdout", "log"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_log_format(config)?;
    validate_sink(config)?;
    validate_limits(config)?;
    Ok(())
}

fn validate_log_format(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_LOG_FORMATS.contains(&config.general.log_format.as_str()) {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "general.log_format \"{}\" is not valid",
                config.general.log_format
            ),
        }));
    }
    Ok(())
}

fn validate_sink(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_SINKS.contains(&config.output.sink.as_str()) {
        return Err(Report::new(ConfigError::Validation {
            field: format!("output.sink \"{}\" is not valid", config.output.sink),
        }));
    }
    Ok(())
}

fn validate_limits(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.worker.concurrency == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "worker.concurrency must be > 0".into(),
        }));
    }
    if config.input.channel_capacity == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "input.channel_capacity must be > 0".into(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[input]
source = "/var/spool/prices.ndjson"
channel_capacity = 64

[worker]
concurrency = 8

[output]
sink = "log"
include_series = true
"#;
        let config = parse(toml);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.input.source, "/var/spool/prices.ndjson");
        assert_eq!(config.input.channel_capacity, 64);
        assert_eq!(config.worker.concurrency, 8);
        assert_eq!(config.output.sink, "log");
        assert!(config.output.include_series);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let config = parse("");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.input.source, "-");
        assert_eq!(config.input.channel_capacity, 1024);
        assert_eq!(config.worker.concurrency, 4);
        assert_eq!(config.output.sink, "stdout");
        assert!(!config.output.include_series);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn default_matches_empty_file() {
        let config = AppConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.worker.concurrency, 4);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn invalid_log_format_rejected() {
        let config = parse(
            r#"
[general]
log_format = "xml"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn invalid_sink_rejected() {
        let config = parse(
            r#"
[output]
sink = "rabbitmq"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = parse(
            r#"
[worker]
concurrency = 0
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_channel_capacity_rejected() {
        let config = parse(
            r#"
[input]
channel_capacity = 0
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load(Path::new("/nonexistent/momentum.toml")).unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::ReadFile));
    }
}
