//! Tree visualization
//!
//! One node per row, drawn with box characters:
//!
//! ```text
//! ⧉ REAPER_PROJECT 0.1
//! ├─ · TEMPO 120 4 4
//! ├─ ▣ TRACK {0001}
//! │ └─ · NAME Kick
//! └─ ? |Take "two
//! ```
//!
//! `▣` marks a chunk, `·` a parameter line and `?` an opaque line. Params are shown quoted the
//! way the serializer would write them.

use super::{Format, FormatError};
use crate::rpp::chunk::{Chunk, Node};
use crate::rpp::token::{is_blank, quote};

const ROOT_ICON: &str = "⧉";
const CHUNK_ICON: &str = "▣";
const LINE_ICON: &str = "·";
const OPAQUE_ICON: &str = "?";

pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Tree drawing of the chunk structure"
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, root: &Chunk) -> Result<String, FormatError> {
        Ok(to_treeviz_str(root))
    }
}

fn label(tag: &str, params: &[String]) -> String {
    let mut label = tag.to_string();
    for param in params {
        label.push(' ');
        label.push_str(&quote(param));
    }
    label
}

fn format_node(node: &Node, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    let (icon, text) = match node {
        Node::Chunk(chunk) => (CHUNK_ICON, label(&chunk.tag, &chunk.params)),
        Node::Line(line) => (LINE_ICON, label(&line.key, &line.params)),
        Node::Opaque(raw) => (OPAQUE_ICON, raw.trim_matches(is_blank).to_string()),
    };
    output.push_str(&format!("{}{} {} {}\n", prefix, connector, icon, text));

    if let Node::Chunk(chunk) = node {
        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        format_children(chunk, &child_prefix, output);
    }
}

fn format_children(chunk: &Chunk, prefix: &str, output: &mut String) {
    let count = chunk.children.len();
    for (i, child) in chunk.children.iter().enumerate() {
        format_node(child, prefix, i + 1 == count, output);
    }
}

pub fn to_treeviz_str(root: &Chunk) -> String {
    let mut output = format!("{} {}\n", ROOT_ICON, label(&root.tag, &root.params));
    format_children(root, "", &mut output);
    output
}
