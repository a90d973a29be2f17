#![forbid(unsafe_code)]

//! Render configuration.
//!
//! [`RenderConfig`] gathers the knobs that drive a single render: the layout
//! budget, roundtrip mode, and how expensive summaries are deferred. Values
//! come from defaults, environment variables, or a JSON document. Lookups are
//! deterministic given the environment, and tests inject their own lookup via
//! [`RenderConfig::from_env_with`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the target line width.
pub const ENV_TARGET_WIDTH: &str = "TREESCOPE_TARGET_WIDTH";
/// Environment variable overriding the balanced-layout height budget.
pub const ENV_MAX_HEIGHT: &str = "TREESCOPE_MAX_HEIGHT";
/// Environment variable enabling roundtrip mode (`1/0/true/false`).
pub const ENV_ROUNDTRIP: &str = "TREESCOPE_ROUNDTRIP";
/// Environment variable toggling deferred summaries (`1/0/true/false`).
pub const ENV_DEFER: &str = "TREESCOPE_DEFER";
/// Environment variable toggling streamed replacement of deferred HTML (`1/0/true/false`).
pub const ENV_STREAM_DEFERRED: &str = "TREESCOPE_STREAM_DEFERRED";

/// Default target line width for automatic layout.
pub const DEFAULT_TARGET_WIDTH: usize = 80;
/// Default number of lines the balanced layout may expand into.
pub const DEFAULT_MAX_HEIGHT: usize = 20;

/// Errors produced while loading a [`RenderConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    InvalidEnv { key: &'static str, value: String },
    /// A numeric setting was zero where a positive value is required.
    ZeroValue { field: &'static str },
    /// The JSON document could not be decoded.
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv { key, value } => {
                write!(f, "invalid value '{}' for {}", value, key)
            }
            Self::ZeroValue { field } => write!(f, "{} must be greater than zero", field),
            Self::Json(msg) => write!(f, "invalid render config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for one render invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Preferred maximum line width; wider collapsed nodes are expanded.
    pub target_width: usize,
    /// Number of lines the balanced layout may grow the output to.
    pub max_height: usize,
    /// Emit text that re-evaluates to an equal value.
    pub roundtrip: bool,
    /// Produce placeholders for expensive summaries and compute them on demand.
    pub defer_summaries: bool,
    /// In HTML output, emit deferred placeholders in place and stream the real
    /// content after the body instead of inlining it.
    pub stream_deferred: bool,
    /// Collapse whitespace runs inside emitted CSS and script definitions.
    pub compress_css: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            roundtrip: false,
            defer_summaries: true,
            stream_deferred: false,
            compress_css: true,
        }
    }
}

impl RenderConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using a custom environment lookup (for tests).
    pub fn from_env_with<F>(get_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(width) = env_usize(&get_env, ENV_TARGET_WIDTH)? {
            config.target_width = width;
        }
        if let Some(height) = env_usize(&get_env, ENV_MAX_HEIGHT)? {
            config.max_height = height;
        }
        if let Some(roundtrip) = env_bool(&get_env, ENV_ROUNDTRIP)? {
            config.roundtrip = roundtrip;
        }
        if let Some(defer) = env_bool(&get_env, ENV_DEFER)? {
            config.defer_summaries = defer;
        }
        if let Some(stream) = env_bool(&get_env, ENV_STREAM_DEFERRED)? {
            config.stream_deferred = stream;
        }
        config.validate()?;
        Ok(config)
    }

    /// Decode configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON (for diagnostics/evidence logs).
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Return a copy with roundtrip mode set.
    #[must_use]
    pub fn with_roundtrip(mut self, roundtrip: bool) -> Self {
        self.roundtrip = roundtrip;
        self
    }

    /// Return a copy with the given target width.
    #[must_use]
    pub fn with_target_width(mut self, width: usize) -> Self {
        self.target_width = width;
        self
    }

    /// Return a copy with the given height budget.
    #[must_use]
    pub fn with_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.target_width == 0 {
            return Err(ConfigError::ZeroValue {
                field: "target_width",
            });
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_bool<F>(get_env: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get_env(key) {
        None => Ok(None),
        Some(value) => parse_bool(&value)
            .map(Some)
            .ok_or(ConfigError::InvalidEnv { key, value }),
    }
}

fn env_usize<F>(get_env: &F, key: &'static str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get_env(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
    }
}
