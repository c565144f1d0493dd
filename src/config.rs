//! Server configuration loaded from `PROMETHEUS_*` environment variables

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

const VALID_LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];
const VALID_LOG_FORMATS: [&str; 2] = ["json", "text"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

/// Processing limits and output settings for the server and CLI
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Logging level (DEBUG, INFO, WARNING, ERROR, CRITICAL)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Maximum PDF file size in MB (default: 500)
    pub max_file_size_mb: u64,
    /// Upper bound for `pages_per_chunk` when splitting (default: 200)
    pub max_pages_per_chunk: u32,
    /// Upper bound for `max_tokens_per_chunk` when extracting text (default: 32000)
    pub max_token_limit: usize,
    /// Per-call processing timeout in seconds (default: 300)
    pub processing_timeout_secs: u64,
    /// Default directory for generated files
    pub default_output_dir: Option<PathBuf>,
    /// tiktoken encoding used for token counting (default: cl100k_base)
    pub tokenizer_encoding: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            log_format: LogFormat::Json,
            max_file_size_mb: 500,
            max_pages_per_chunk: 200,
            max_token_limit: 32_000,
            processing_timeout_secs: 300,
            default_output_dir: None,
            tokenizer_encoding: "cl100k_base".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to read each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_level = match lookup("PROMETHEUS_LOG_LEVEL") {
            Some(v) => validate_log_level(&v)?,
            None => defaults.log_level,
        };
        let log_format = match lookup("PROMETHEUS_LOG_FORMAT") {
            Some(v) => validate_log_format(&v)?,
            None => defaults.log_format,
        };

        let default_output_dir = match lookup("PROMETHEUS_OUTPUT_DIR") {
            Some(v) if !v.trim().is_empty() => Some(ensure_output_dir(Path::new(v.trim()))?),
            _ => None,
        };

        Ok(Self {
            log_level,
            log_format,
            max_file_size_mb: parse_var(&lookup, "PROMETHEUS_MAX_FILE_SIZE_MB")?
                .unwrap_or(defaults.max_file_size_mb),
            max_pages_per_chunk: parse_var(&lookup, "PROMETHEUS_MAX_PAGES_PER_CHUNK")?
                .unwrap_or(defaults.max_pages_per_chunk),
            max_token_limit: parse_var(&lookup, "PROMETHEUS_MAX_TOKEN_LIMIT")?
                .unwrap_or(defaults.max_token_limit),
            processing_timeout_secs: parse_var(&lookup, "PROMETHEUS_TIMEOUT")?
                .unwrap_or(defaults.processing_timeout_secs),
            default_output_dir,
            tokenizer_encoding: lookup("PROMETHEUS_TOKENIZER")
                .unwrap_or(defaults.tokenizer_encoding),
        })
    }

    /// Filter directive for `tracing_subscriber::EnvFilter` matching `log_level`
    pub fn tracing_directive(&self) -> &'static str {
        match self.log_level.as_str() {
            "DEBUG" => "debug",
            "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| Error::Config {
            reason: format!("{} must be a non-negative integer, got {:?}", key, raw),
        }),
        None => Ok(None),
    }
}

fn validate_log_level(value: &str) -> Result<String> {
    let upper = value.trim().to_uppercase();
    if VALID_LOG_LEVELS.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(Error::Config {
            reason: format!(
                "Invalid log level: {}. Must be one of {:?}",
                value, VALID_LOG_LEVELS
            ),
        })
    }
}

fn validate_log_format(value: &str) -> Result<LogFormat> {
    match value.trim().to_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "text" => Ok(LogFormat::Text),
        _ => Err(Error::Config {
            reason: format!(
                "Invalid log format: {}. Must be one of {:?}",
                value, VALID_LOG_FORMATS
            ),
        }),
    }
}

fn ensure_output_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| Error::Config {
            reason: format!("Cannot create output directory {}: {}", path.display(), e),
        })?;
    }
    Ok(path.to_path_buf())
}
