//! Chunk tree
//!
//!     A REAPER project is a tree of chunks. Each chunk has a tag and the params written on its
//!     opening line, followed by its children in file order:
//!
//!         <TRACK {5A1B...}
//!           NAME "Kick"
//!           VOLPAN 1 0 -1 -1 1
//!           <FXCHAIN
//!             SHOW 0
//!           >
//!         >
//!
//!     Children are either nested chunks, parameter lines (key + params) or opaque lines. Opaque
//!     lines are whatever the tokenizer could not split cleanly; they are kept byte for byte so
//!     content this crate does not understand survives a round trip.
//!
//!     Trees are plain owned data. Once a tree is handed out (to a document, to a script input)
//!     it is shared behind an `Arc` and replaced wholesale rather than edited.

use std::fmt;

/// A chunk: `<TAG params...` ... `>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chunk {
    pub tag: String,
    pub params: Vec<String>,
    pub children: Vec<Node>,
}

/// A parameter line inside a chunk: `KEY params...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub key: String,
    pub params: Vec<String>,
}

/// One child entry of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Chunk(Chunk),
    Line(Line),
    /// Verbatim line text, indentation included.
    Opaque(String),
}

impl Chunk {
    pub fn new(tag: impl Into<String>) -> Self {
        Chunk {
            tag: tag.into(),
            params: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Direct sub-chunks with the given tag, in file order.
    pub fn chunks<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Chunk> + 'a {
        self.children.iter().filter_map(move |child| match child {
            Node::Chunk(chunk) if chunk.tag == tag => Some(chunk),
            _ => None,
        })
    }

    /// First direct sub-chunk with the given tag.
    pub fn chunk(&self, tag: &str) -> Option<&Chunk> {
        self.children.iter().find_map(|child| match child {
            Node::Chunk(chunk) if chunk.tag == tag => Some(chunk),
            _ => None,
        })
    }

    /// First direct parameter line with the given key.
    pub fn line(&self, key: &str) -> Option<&Line> {
        self.children.iter().find_map(|child| match child {
            Node::Line(line) if line.key == key => Some(line),
            _ => None,
        })
    }

    /// Number of chunks in this subtree, this one included.
    pub fn chunk_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(chunk) = stack.pop() {
            count += 1;
            for child in &chunk.children {
                if let Node::Chunk(sub) = child {
                    stack.push(sub);
                }
            }
        }
        count
    }

    /// Number of opaque lines anywhere in this subtree.
    pub fn opaque_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(chunk) = stack.pop() {
            for child in &chunk.children {
                match child {
                    Node::Chunk(sub) => stack.push(sub),
                    Node::Opaque(_) => count += 1,
                    Node::Line(_) => {}
                }
            }
        }
        count
    }
}

impl Line {
    pub fn new<I, S>(key: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Line {
            key: key.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

impl Node {
    /// The tag of a chunk or the key of a line. Opaque lines have none.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Chunk(chunk) => Some(&chunk.tag),
            Node::Line(line) => Some(&line.key),
            Node::Opaque(_) => None,
        }
    }
}

impl From<Chunk> for Node {
    fn from(chunk: Chunk) -> Self {
        Node::Chunk(chunk)
    }
}

impl From<Line> for Node {
    fn from(line: Line) -> Self {
        Node::Line(line)
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::rpp::serializer::serialize(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Chunk {
        Chunk::new("TRACK")
            .with_params(["{0001}"])
            .with_child(Line::new("NAME", ["Kick"]))
            .with_child(Chunk::new("FXCHAIN").with_child(Line::new("SHOW", ["0"])))
            .with_child(Node::Opaque("  \"broken".to_string()))
            .with_child(Chunk::new("FXCHAIN"))
    }

    #[test]
    fn test_lookup_helpers() {
        let chunk = track();
        assert_eq!(chunk.chunks("FXCHAIN").count(), 2);
        assert_eq!(chunk.chunk("FXCHAIN").unwrap().children.len(), 1);
        assert_eq!(chunk.line("NAME").unwrap().params, vec!["Kick"]);
        assert!(chunk.line("FXCHAIN").is_none());
        assert!(chunk.chunk("NAME").is_none());
    }

    #[test]
    fn test_lookup_with_borrowed_tag() {
        let chunk = track();
        let found = {
            let tag = String::from("FXCHAIN");
            chunk.chunk(&tag)
        };
        assert_eq!(found.map(|fx| fx.children.len()), Some(1));
    }

    #[test]
    fn test_counts() {
        let chunk = Chunk::new("REAPER_PROJECT").with_child(track());
        assert_eq!(chunk.chunk_count(), 4);
        assert_eq!(chunk.opaque_count(), 1);
    }

    #[test]
    fn test_node_tag() {
        assert_eq!(Node::from(Line::new("NAME", ["x"])).tag(), Some("NAME"));
        assert_eq!(Node::from(Chunk::new("TRACK")).tag(), Some("TRACK"));
        assert_eq!(Node::Opaque("x".into()).tag(), None);
    }
}
