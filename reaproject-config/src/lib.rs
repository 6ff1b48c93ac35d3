//! Shared configuration loader for the reaproject tools.
//!
//! `defaults/reaproject.default.toml` is embedded into every binary so that docs and runtime
//! behavior stay in sync. Applications layer user files, environment variables and explicit
//! overrides on top of those defaults via [`Loader`] before deserializing into
//! [`ReaprojectConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, ValueKind};
use reaproject::rpp::serializer::{LineEnding, SerializeOptions};
use reaproject::rpp::transform::EngineLimits;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/reaproject.default.toml");

/// Prefix of environment overrides, e.g. `REAPROJECT__ENGINE__TIMEOUT_MS`.
pub const ENV_PREFIX: &str = "REAPROJECT";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Deserialize)]
pub struct ReaprojectConfig {
    pub engine: EngineConfig,
    pub serializer: SerializerConfig,
    pub inspect: InspectConfig,
}

/// Limits applied to every transform run.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub timeout_ms: u64,
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerializerConfig {
    pub indent: String,
    pub line_ending: LineEndingSetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineEndingSetting {
    Lf,
    Crlf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub format: String,
}

impl ReaprojectConfig {
    pub fn engine_limits(&self) -> EngineLimits {
        let engine = &self.engine;
        EngineLimits {
            timeout: Duration::from_millis(engine.timeout_ms),
            max_operations: engine.max_operations,
            max_call_levels: engine.max_call_levels,
            max_expr_depth: engine.max_expr_depth,
            max_string_size: engine.max_string_size,
            max_array_size: engine.max_array_size,
            max_map_size: engine.max_map_size,
        }
    }

    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            indent: self.serializer.indent.clone(),
            line_ending: match self.serializer.line_ending {
                LineEndingSetting::Lf => LineEnding::Lf,
                LineEndingSetting::Crlf => LineEnding::CrLf,
            },
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `REAPROJECT__SECTION__KEY` variables from the process environment.
    pub fn with_environment(mut self) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ReaprojectConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ReaprojectConfig, ConfigError> {
    Loader::new().build()
}
