//! Project file serializer
//!
//!     Writes a chunk tree back to text. Indentation comes from nesting depth alone, so a tree
//!     assembled by a script is laid out the same way as one read from disk. Tokens are quoted
//!     only when the tokenizer would otherwise read them differently, and opaque lines are
//!     written exactly as they were read.
//!
//!     For every tree the parser produces, parsing the serializer's output yields the same tree.

use super::chunk::{Chunk, Node};
use super::token::quote;

/// Line terminator written after every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Layout knobs for [`serialize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Written once per nesting level.
    pub indent: String,
    pub line_ending: LineEnding,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            indent: "  ".to_string(),
            line_ending: LineEnding::Lf,
        }
    }
}

/// Serialize with the default layout (two space indent, `\n`).
pub fn serialize(root: &Chunk) -> String {
    serialize_with(root, &SerializeOptions::default())
}

pub fn serialize_with(root: &Chunk, options: &SerializeOptions) -> String {
    let mut writer = Writer {
        options,
        output: String::new(),
    };

    // Each frame is a chunk whose header has been written and the index of its next child.
    let mut stack: Vec<(&Chunk, usize)> = Vec::new();
    writer.open(root, 0);
    stack.push((root, 0));

    loop {
        let depth = stack.len();
        let Some((chunk, next)) = stack.last_mut() else {
            break;
        };
        let chunk: &Chunk = *chunk;
        let index = *next;
        *next += 1;

        let Some(child) = chunk.children.get(index) else {
            stack.pop();
            writer.close(depth - 1);
            continue;
        };

        match child {
            Node::Chunk(sub) => {
                writer.open(sub, depth);
                stack.push((sub, 0));
            }
            Node::Line(line) => writer.tokens(depth, &line.key, &line.params),
            Node::Opaque(text) => writer.raw(text),
        }
    }

    writer.output
}

struct Writer<'o> {
    options: &'o SerializeOptions,
    output: String,
}

impl Writer<'_> {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.output.push_str(&self.options.indent);
        }
    }

    fn end_line(&mut self) {
        self.output.push_str(self.options.line_ending.as_str());
    }

    fn open(&mut self, chunk: &Chunk, depth: usize) {
        self.indent(depth);
        self.output.push('<');
        // Tags are bare tokens; the parser rejects quoted ones.
        self.output.push_str(&chunk.tag);
        self.params(&chunk.params);
        self.end_line();
    }

    fn close(&mut self, depth: usize) {
        self.indent(depth);
        self.output.push('>');
        self.end_line();
    }

    fn tokens(&mut self, depth: usize, key: &str, params: &[String]) {
        self.indent(depth);
        self.output.push_str(&quote(key));
        self.params(params);
        self.end_line();
    }

    fn params(&mut self, params: &[String]) {
        for param in params {
            self.output.push(' ');
            self.output.push_str(&quote(param));
        }
    }

    fn raw(&mut self, text: &str) {
        self.output.push_str(text);
        self.end_line();
    }
}
