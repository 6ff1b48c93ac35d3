//! Testing utilities for chunk trees
//!
//! Two tools, meant to be used together:
//!
//! 1. [`RppSources`] for project text. Test projects live in `tests/fixtures/` and were checked
//!    against REAPER's own output, so tests do not have to hand write (and get wrong) the file
//!    format.
//! 2. [`assert_chunk`] for tree shape. It walks a whole hierarchy with one fluent expression and
//!    reports the path to the node that failed:
//!
//!     assert_chunk(&root)
//!         .tag("REAPER_PROJECT")
//!         .chunk(3, |track| {
//!             track.tag("TRACK").line(0, |name| name.key("NAME").params(&["Kick"]));
//!         });
//!
//! Short inline snippets are fine for edge cases the fixtures do not cover.

use crate::rpp::chunk::{Chunk, Line, Node};

/// Verified sample projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RppSources {
    /// An empty project: a root header and its closing line.
    Minimal,
    /// Notes with an opaque line, two tracks, one of them with an effect chain.
    TwoTracks,
    /// A one track project used as the "other" input in transform tests.
    Second,
    /// REAPER styled output: CRLF endings, a blank line and every quote style.
    ReaperExport,
}

impl RppSources {
    pub const ALL: [RppSources; 4] = [
        RppSources::Minimal,
        RppSources::TwoTracks,
        RppSources::Second,
        RppSources::ReaperExport,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            RppSources::Minimal => "minimal.rpp",
            RppSources::TwoTracks => "two_tracks.rpp",
            RppSources::Second => "second.rpp",
            RppSources::ReaperExport => "reaper_export.rpp",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            RppSources::Minimal => include_str!("../../tests/fixtures/minimal.rpp"),
            RppSources::TwoTracks => include_str!("../../tests/fixtures/two_tracks.rpp"),
            RppSources::Second => include_str!("../../tests/fixtures/second.rpp"),
            RppSources::ReaperExport => include_str!("../../tests/fixtures/reaper_export.rpp"),
        }
    }

    /// Whether serializing the parsed fixture with default options gives back the exact text.
    pub fn is_canonical(self) -> bool {
        !matches!(self, RppSources::ReaperExport)
    }

    /// Parse the fixture. Panics if it does not parse, which would mean the fixture is broken.
    pub fn parse(self) -> Chunk {
        crate::rpp::parser::parse(self.text())
            .unwrap_or_else(|err| panic!("fixture {} does not parse: {}", self.file_name(), err))
    }
}

/// Start a fluent assertion on a chunk.
pub fn assert_chunk(chunk: &Chunk) -> ChunkAssertion<'_> {
    ChunkAssertion {
        chunk,
        context: chunk.tag.clone(),
    }
}

fn describe(node: &Node) -> String {
    match node {
        Node::Chunk(chunk) => format!("chunk <{}", chunk.tag),
        Node::Line(line) => format!("line {}", line.key),
        Node::Opaque(text) => format!("opaque {:?}", text),
    }
}

pub struct ChunkAssertion<'a> {
    chunk: &'a Chunk,
    context: String,
}

impl<'a> ChunkAssertion<'a> {
    pub fn tag(self, expected: &str) -> Self {
        assert_eq!(
            self.chunk.tag, expected,
            "{}: Expected tag {:?}, found {:?}",
            self.context, expected, self.chunk.tag
        );
        self
    }

    pub fn params(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.chunk.params, expected,
            "{}: Header params differ",
            self.context
        );
        self
    }

    pub fn no_params(self) -> Self {
        assert!(
            self.chunk.params.is_empty(),
            "{}: Expected no header params, found {:?}",
            self.context,
            self.chunk.params
        );
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let actual = self.chunk.children.len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} children, found {} children: [{}]",
            self.context,
            expected,
            actual,
            self.chunk
                .children
                .iter()
                .map(describe)
                .collect::<Vec<_>>()
                .join(", ")
        );
        self
    }

    fn child(&self, index: usize) -> &'a Node {
        let children = &self.chunk.children;
        assert!(
            index < children.len(),
            "{}: Child index {} out of bounds (chunk has {} children)",
            self.context,
            index,
            children.len()
        );
        &children[index]
    }

    pub fn chunk<F, R>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ChunkAssertion<'a>) -> R,
    {
        let node = self.child(index);
        let Node::Chunk(chunk) = node else {
            panic!(
                "{}: Expected a chunk at index {}, found {}",
                self.context,
                index,
                describe(node)
            );
        };
        assertion(ChunkAssertion {
            chunk,
            context: format!("{}[{}]<{}", self.context, index, chunk.tag),
        });
        self
    }

    pub fn line<F, R>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(LineAssertion<'a>) -> R,
    {
        let node = self.child(index);
        let Node::Line(line) = node else {
            panic!(
                "{}: Expected a line at index {}, found {}",
                self.context,
                index,
                describe(node)
            );
        };
        assertion(LineAssertion {
            line,
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    /// The child at `index` is an opaque line with exactly this text.
    pub fn opaque(self, index: usize, expected: &str) -> Self {
        let node = self.child(index);
        match node {
            Node::Opaque(text) => assert_eq!(
                text, expected,
                "{}[{}]: Opaque text differs",
                self.context, index
            ),
            other => panic!(
                "{}: Expected an opaque line at index {}, found {}",
                self.context,
                index,
                describe(other)
            ),
        }
        self
    }
}

pub struct LineAssertion<'a> {
    line: &'a Line,
    context: String,
}

impl LineAssertion<'_> {
    pub fn key(self, expected: &str) -> Self {
        assert_eq!(
            self.line.key, expected,
            "{}: Expected key {:?}, found {:?}",
            self.context, expected, self.line.key
        );
        self
    }

    pub fn params(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.line.params, expected,
            "{}: Params of {} differ",
            self.context, self.line.key
        );
        self
    }

    pub fn param_count(self, expected: usize) -> Self {
        assert_eq!(
            self.line.params.len(),
            expected,
            "{}: Expected {} params on {}, found {:?}",
            self.context,
            expected,
            self.line.key,
            self.line.params
        );
        self
    }
}
