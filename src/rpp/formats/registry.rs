//! Format lookup by name

use super::{Format, FormatError};
use crate::rpp::chunk::Chunk;
use crate::rpp::serializer::SerializeOptions;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static DEFAULT_REGISTRY: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::with_defaults);

/// Registry of formats
///
/// ```ignore
/// let registry = FormatRegistry::global();
/// let root = registry.parse(&text, "rpp")?;
/// println!("{}", registry.serialize(&root, "treeviz")?);
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Shared registry with the default formats and default `rpp` layout.
    pub fn global() -> &'static FormatRegistry {
        &DEFAULT_REGISTRY
    }

    /// Register a format, replacing any format with the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// All format names, sorted.
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn parse(&self, source: &str, format: &str) -> Result<Chunk, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{}' does not support parsing",
                format
            )));
        }
        fmt.parse(source)
    }

    pub fn serialize(&self, root: &Chunk, format: &str) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{}' does not support serialization",
                format
            )));
        }
        fmt.serialize(root)
    }

    pub fn with_defaults() -> Self {
        Self::with_options(SerializeOptions::default())
    }

    /// Default formats, with `rpp` writing the given layout.
    pub fn with_options(options: SerializeOptions) -> Self {
        let mut registry = Self::new();
        registry.register(super::rpp::RppFormat::new(options));
        registry.register(super::projection::JsonFormat);
        registry.register(super::projection::YamlFormat);
        registry.register(super::treeviz::TreevizFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
