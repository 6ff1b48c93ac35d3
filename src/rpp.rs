//! Main module for REAPER project handling

pub mod chunk;
pub mod document;
pub mod error;
pub mod formats;
pub mod parser;
pub mod projection;
pub mod serializer;
pub mod testing;
pub mod token;
pub mod transform;

pub use chunk::{Chunk, Line, Node};
pub use document::{DocumentError, DocumentId, DocumentSet, ProjectDocument, TransformInputs};
pub use error::{FormatError, ParseError, ProjectionError, ScriptError};
pub use parser::{parse, parse_bytes};
pub use projection::{from_value, to_value, Value};
pub use serializer::{serialize, serialize_with, LineEnding, SerializeOptions};
