//! Configuration layer: typed settings with layered precedence (file → env).

use std::path::Path;
use std::str::FromStr;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "custode";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub contexts: ContextSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Operator-curated allow-list of JSON-LD context sources, in declaration
/// order. Read once at startup; immutable for the lifetime of a warm-up
/// pass.
#[derive(Debug, Clone, Default)]
pub struct ContextSettings {
    pub mappings: Vec<ContextMapping>,
}

/// One namespace → target pair. The target may embed `%PWD%`, substituted
/// with the process working directory at warm-up time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMapping {
    pub namespace: String,
    pub target: String,
}

impl ContextMapping {
    pub fn new(namespace: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment).
pub fn load() -> Result<Settings, LoadError> {
    load_from(None)
}

/// Load settings, additionally reading `config_file` when the embedding
/// service supplies one.
pub fn load_from(config_file: Option<&Path>) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("CUSTODE").separator("__"));

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::from_raw(raw)
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            logging: build_logging_settings(raw.logging)?,
            contexts: build_context_settings(raw.contexts)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    contexts: RawContextSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContextSettings {
    mappings: Vec<RawContextMapping>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawContextMapping {
    namespace: String,
    target: String,
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_context_settings(contexts: RawContextSettings) -> Result<ContextSettings, LoadError> {
    let mut mappings = Vec::with_capacity(contexts.mappings.len());
    for mapping in contexts.mappings {
        let namespace = mapping.namespace.trim();
        if namespace.is_empty() {
            return Err(LoadError::invalid(
                "contexts.mappings.namespace",
                "must not be empty",
            ));
        }
        let target = mapping.target.trim();
        if target.is_empty() {
            return Err(LoadError::invalid(
                "contexts.mappings.target",
                "must not be empty",
            ));
        }
        mappings.push(ContextMapping::new(namespace, target));
    }
    Ok(ContextSettings { mappings })
}
