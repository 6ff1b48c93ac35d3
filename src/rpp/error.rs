//! Error types for parsing, projection, transforms and format conversion
//!
//! Every error aborts only the call that produced it. Line numbers are 1-based.

use thiserror::Error;

/// Failure to read project text into a chunk tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("chunk <{tag} opened on line {line} is never closed")]
    UnterminatedChunk { tag: String, line: usize },

    #[error("unexpected '>' on line {line}: no chunk is open")]
    UnexpectedClose { line: usize },

    #[error("malformed chunk header on line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("content outside the root chunk on line {line}")]
    TrailingContent { line: usize },

    #[error("input does not contain a chunk")]
    MissingRoot,

    #[error("project file is not valid UTF-8 (at byte {offset})")]
    InvalidEncoding { offset: usize },
}

/// A projection value that cannot be turned back into a chunk tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct ProjectionError {
    /// Where the offending value sits, e.g. `children[2].params[0]`.
    pub path: String,
    pub reason: String,
}

impl ProjectionError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectionError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the path with the location of the enclosing value.
    pub fn within(mut self, parent: &str) -> Self {
        self.path = if self.path.is_empty() {
            parent.to_string()
        } else if self.path.starts_with('[') {
            format!("{}{}", parent, self.path)
        } else {
            format!("{}.{}", parent, self.path)
        };
        self
    }
}

/// Failure of a transform script run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script did not compile: {message}")]
    Syntax { message: String },

    #[error("script exceeded its time limit of {limit_ms} ms")]
    Timeout { limit_ms: u64 },

    #[error("invalid script output: {detail}")]
    InvalidOutput { detail: String },

    #[error("{message}")]
    Runtime { message: String },
}

impl From<ProjectionError> for ScriptError {
    fn from(err: ProjectionError) -> Self {
        ScriptError::InvalidOutput {
            detail: err.to_string(),
        }
    }
}

/// Failure to look up a format or to convert through it.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown format '{0}'")]
    FormatNotFound(String),

    #[error("{0}")]
    NotSupported(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_path_nesting() {
        let err = ProjectionError::new("params[0]", "expected a scalar")
            .within("[3]")
            .within("children")
            .within("data");
        assert_eq!(err.path, "data.children[3].params[0]");
        assert_eq!(err.to_string(), "data.children[3].params[0]: expected a scalar");
    }

    #[test]
    fn test_projection_error_becomes_invalid_output() {
        let err: ScriptError = ProjectionError::new("tag", "missing").into();
        assert_eq!(
            err,
            ScriptError::InvalidOutput {
                detail: "tag: missing".to_string()
            }
        );
    }

    #[test]
    fn test_messages() {
        let err = ParseError::UnterminatedChunk {
            tag: "TRACK".into(),
            line: 3,
        };
        assert_eq!(err.to_string(), "chunk <TRACK opened on line 3 is never closed");
        assert_eq!(
            ScriptError::Runtime {
                message: "boom".into()
            }
            .to_string(),
            "boom"
        );
    }
}
