//! The project file format

use super::{Format, FormatError};
use crate::rpp::chunk::Chunk;
use crate::rpp::parser;
use crate::rpp::serializer::{serialize_with, SerializeOptions};

#[derive(Debug, Clone, Default)]
pub struct RppFormat {
    options: SerializeOptions,
}

impl RppFormat {
    pub fn new(options: SerializeOptions) -> Self {
        RppFormat { options }
    }
}

impl Format for RppFormat {
    fn name(&self) -> &str {
        "rpp"
    }

    fn description(&self) -> &str {
        "REAPER project file"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Chunk, FormatError> {
        Ok(parser::parse(source)?)
    }

    fn serialize(&self, root: &Chunk) -> Result<String, FormatError> {
        Ok(serialize_with(root, &self.options))
    }
}
