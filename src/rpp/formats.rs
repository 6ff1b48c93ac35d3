//! Renderings of a chunk tree
//!
//! A [`Format`] converts between text and a [`Chunk`]. Formats can support parsing,
//! serialization, or both:
//!
//! - `rpp`: the project file itself (both directions).
//! - `json`, `yaml`: the projection of [`crate::rpp::projection`] (both directions; parsing goes
//!   through `from_value`, so hand edited projections are validated).
//! - `treeviz`: a read-only tree drawing for humans.
//!
//! Formats are looked up by name through a [`FormatRegistry`].

pub mod projection;
pub mod registry;
pub mod rpp;
pub mod treeviz;

pub use crate::rpp::error::FormatError;
pub use registry::FormatRegistry;

use crate::rpp::chunk::Chunk;

pub trait Format: Send + Sync {
    /// The name the registry knows this format by.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    fn parse(&self, _source: &str) -> Result<Chunk, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    fn serialize(&self, _root: &Chunk) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }
}
