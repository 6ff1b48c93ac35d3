//! Document projection
//!
//!     Scripts never see [`Chunk`] itself. They get a plain [`Value`] tree instead, which is also
//!     what the JSON and YAML renderings show:
//!
//!         chunk   { "tag": "TRACK", "params": ["{0001}"], "children": [ ... ] }
//!         line    { "tag": "NAME", "params": ["Kick"] }
//!         opaque  { "raw": "  NAME \"unterminated" }
//!
//!     Children stay in file order so a projection that is passed through unchanged serializes to
//!     exactly the original text. Params are always projected as strings; on the way back numbers
//!     are accepted too and written in their shortest decimal form.
//!
//!     The reverse direction is strict. Unknown keys, missing tags and values of the wrong shape
//!     are errors that name the offending path, so a script that forgets to carry a field through
//!     fails loudly instead of silently dropping data.

use super::chunk::{Chunk, Line, Node};
use super::error::ProjectionError;
use super::token::{is_blank, is_writable, tokenize_line};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TAG: &str = "tag";
pub const PARAMS: &str = "params";
pub const CHILDREN: &str = "children";
pub const RAW: &str = "raw";

/// Plain data as exchanged with scripts and renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Project a chunk tree. Never fails and has no side effects.
pub fn to_value(chunk: &Chunk) -> Value {
    let mut map = header(&chunk.tag, &chunk.params);
    map.insert(
        CHILDREN.to_string(),
        Value::Sequence(chunk.children.iter().map(node_to_value).collect()),
    );
    Value::Mapping(map)
}

fn node_to_value(node: &Node) -> Value {
    match node {
        Node::Chunk(chunk) => to_value(chunk),
        Node::Line(line) => Value::Mapping(header(&line.key, &line.params)),
        Node::Opaque(text) => {
            let mut map = BTreeMap::new();
            map.insert(RAW.to_string(), Value::String(text.clone()));
            Value::Mapping(map)
        }
    }
}

fn header(tag: &str, params: &[String]) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    map.insert(TAG.to_string(), Value::String(tag.to_string()));
    map.insert(
        PARAMS.to_string(),
        Value::Sequence(params.iter().cloned().map(Value::String).collect()),
    );
    map
}

/// Rebuild a chunk tree from a projection. The top level value must be a chunk.
pub fn from_value(value: &Value) -> Result<Chunk, ProjectionError> {
    match value_to_node(value)? {
        Node::Chunk(chunk) => Ok(chunk),
        _ => Err(ProjectionError::new(
            "",
            format!("expected a chunk (a mapping with `{}`)", CHILDREN),
        )),
    }
}

fn value_to_node(value: &Value) -> Result<Node, ProjectionError> {
    let map = value
        .as_mapping()
        .ok_or_else(|| ProjectionError::new("", format!("expected a mapping, found {}", value.kind())))?;

    if let Some(raw) = map.get(RAW) {
        if let Some(extra) = map.keys().find(|k| k.as_str() != RAW) {
            return Err(ProjectionError::new(
                extra.as_str(),
                format!("unexpected field next to `{}`", RAW),
            ));
        }
        return raw_line(raw).map(Node::Opaque);
    }

    if let Some(unknown) = map
        .keys()
        .find(|k| ![TAG, PARAMS, CHILDREN].contains(&k.as_str()))
    {
        return Err(ProjectionError::new(unknown.as_str(), "unknown field"));
    }

    let tag = match map.get(TAG) {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => {
            return Err(ProjectionError::new(
                TAG,
                format!("expected a string, found {}", other.kind()),
            ))
        }
        None => return Err(ProjectionError::new(TAG, "missing")),
    };
    check_token(&tag).map_err(|e| e.within(TAG))?;

    let params = match map.get(PARAMS) {
        Some(value) => params(value).map_err(|e| e.within(PARAMS))?,
        None => Vec::new(),
    };

    let Some(children) = map.get(CHILDREN) else {
        return Ok(Node::Line(Line { key: tag, params }));
    };

    // Chunk tags are written bare, so they must read back as one bare token.
    if tag.is_empty() || tag.contains(is_blank) || tag.starts_with(['"', '\'', '`']) {
        return Err(ProjectionError::new(
            TAG,
            "chunk tags must be non-empty, without blanks and not start with a quote",
        ));
    }

    let items = children.as_sequence().ok_or_else(|| {
        ProjectionError::new(
            CHILDREN,
            format!("expected a sequence, found {}", children.kind()),
        )
    })?;
    let children = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            value_to_node(item).map_err(|e| e.within(&format!("[{}]", index)).within(CHILDREN))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Node::Chunk(Chunk {
        tag,
        params,
        children,
    }))
}

fn params(value: &Value) -> Result<Vec<String>, ProjectionError> {
    let items = value.as_sequence().ok_or_else(|| {
        ProjectionError::new("", format!("expected a sequence, found {}", value.kind()))
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| scalar(item).map_err(|e| e.within(&format!("[{}]", index))))
        .collect()
}

fn scalar(value: &Value) -> Result<String, ProjectionError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        Value::Float(f) => {
            return Err(ProjectionError::new("", format!("{} is not a valid param", f)))
        }
        other => {
            return Err(ProjectionError::new(
                "",
                format!("expected a string or number, found {}", other.kind()),
            ))
        }
    };
    check_token(&text)?;
    Ok(text)
}

fn raw_line(value: &Value) -> Result<String, ProjectionError> {
    let text = value.as_str().ok_or_else(|| {
        ProjectionError::new(RAW, format!("expected a string, found {}", value.kind()))
    })?;
    if text.contains('\n') || text.ends_with('\r') {
        return Err(ProjectionError::new(
            RAW,
            "must not contain line breaks or end in a carriage return",
        ));
    }
    let trimmed = text.trim_matches(is_blank);
    if trimmed.is_empty() || trimmed.starts_with('<') || trimmed == ">" {
        return Err(ProjectionError::new(
            RAW,
            "raw lines cannot be blank or look like chunk boundaries",
        ));
    }
    if tokenize_line(trimmed).is_ok() {
        return Err(ProjectionError::new(
            RAW,
            "reads as a parameter line; use `tag` and `params` instead",
        ));
    }
    Ok(text.to_string())
}

fn check_token(text: &str) -> Result<(), ProjectionError> {
    if text.contains('\n') {
        return Err(ProjectionError::new("", "must not contain line breaks"));
    }
    if !is_writable(text) {
        return Err(ProjectionError::new("", "cannot be written back as a single token"));
    }
    Ok(())
}
