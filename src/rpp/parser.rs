//! Project file parser
//!
//!     The grammar is line oriented:
//!
//!         <TAG params...      opens a chunk
//!         >                   closes the innermost open chunk
//!         KEY params...       parameter line inside the current chunk
//!
//!     Open chunks live on an explicit stack so nesting depth is bounded by memory only, never by
//!     the call stack. A line that does not tokenize cleanly is kept as an opaque child instead
//!     of failing the parse; chunk headers have to be well formed because the tree shape depends
//!     on them.

use super::chunk::{Chunk, Line, Node};
use super::error::ParseError;
use super::token::{is_blank, tokenize_line, TokenKind};

const BOM: char = '\u{feff}';

/// Parse raw file bytes. The input must be UTF-8; a leading byte order mark is ignored.
pub fn parse_bytes(bytes: &[u8]) -> Result<Chunk, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidEncoding {
        offset: e.valid_up_to(),
    })?;
    parse(text)
}

/// Parse project text into its root chunk.
pub fn parse(text: &str) -> Result<Chunk, ParseError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    // Each open chunk with the line it was opened on.
    let mut stack: Vec<(Chunk, usize)> = Vec::new();
    let mut root: Option<Chunk> = None;
    let mut opaque = 0usize;

    for (index, raw_line) in text.split('\n').enumerate() {
        let number = index + 1;
        // Stray CRs before the line ending go too; the serializer never writes them back.
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim_matches(is_blank);
        if trimmed.is_empty() {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('<') {
            if root.is_some() {
                return Err(ParseError::TrailingContent { line: number });
            }
            stack.push((parse_header(header, number)?, number));
            continue;
        }

        if trimmed == ">" {
            let (closed, _) = stack
                .pop()
                .ok_or(ParseError::UnexpectedClose { line: number })?;
            match stack.last_mut() {
                Some((parent, _)) => parent.children.push(Node::Chunk(closed)),
                None => root = Some(closed),
            }
            continue;
        }

        let Some((current, _)) = stack.last_mut() else {
            return Err(if root.is_some() {
                ParseError::TrailingContent { line: number }
            } else {
                ParseError::MissingRoot
            });
        };

        match tokenize_line(trimmed) {
            Ok(tokens) => {
                let mut values = tokens.into_iter().map(|t| t.value);
                // A non-blank line always yields at least one token.
                let key = values.next().unwrap_or_default();
                current.children.push(Node::Line(Line {
                    key,
                    params: values.collect(),
                }));
            }
            Err(err) => {
                tracing::trace!(line = number, %err, "keeping line verbatim");
                opaque += 1;
                current.children.push(Node::Opaque(line.to_string()));
            }
        }
    }

    if let Some((open, opened_on)) = stack.pop() {
        return Err(ParseError::UnterminatedChunk {
            tag: open.tag,
            line: opened_on,
        });
    }

    let root = root.ok_or(ParseError::MissingRoot)?;
    if opaque > 0 {
        tracing::warn!(
            tag = %root.tag,
            opaque,
            "project contains lines that were kept verbatim"
        );
    }
    tracing::debug!(tag = %root.tag, chunks = root.chunk_count(), "parsed project");
    Ok(root)
}

fn parse_header(header: &str, line: usize) -> Result<Chunk, ParseError> {
    let tokens = tokenize_line(header).map_err(|err| ParseError::MalformedHeader {
        line,
        reason: err.to_string(),
    })?;

    let mut tokens = tokens.into_iter();
    let tag = match tokens.next() {
        Some(token) if token.kind == TokenKind::Bare => token.value,
        Some(_) => {
            return Err(ParseError::MalformedHeader {
                line,
                reason: "chunk tag must not be quoted".to_string(),
            })
        }
        None => {
            return Err(ParseError::MalformedHeader {
                line,
                reason: "missing chunk tag".to_string(),
            })
        }
    };

    Ok(Chunk {
        tag,
        params: tokens.map(|t| t.value).collect(),
        children: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpp::testing::assert_chunk;

    #[test]
    fn test_single_chunk_with_line() {
        let root = parse("<TRACK\n  NAME \"Kick\"\n>\n").unwrap();
        assert_chunk(&root)
            .tag("TRACK")
            .no_params()
            .child_count(1)
            .line(0, |line| line.key("NAME").params(&["Kick"]));
    }

    #[test]
    fn test_header_params() {
        let root = parse("<REAPER_PROJECT 0.1 \"7.0/linux\" 1700000000\n>").unwrap();
        assert_chunk(&root)
            .tag("REAPER_PROJECT")
            .params(&["0.1", "7.0/linux", "1700000000"])
            .child_count(0);
    }

    #[test]
    fn test_nested_chunks() {
        let text = "<A\n  <B 1\n    <C\n      X 1\n    >\n  >\n  Y 2\n>\n";
        let root = parse(text).unwrap();
        assert_chunk(&root)
            .tag("A")
            .child_count(2)
            .chunk(0, |b| {
                b.tag("B").params(&["1"]).chunk(0, |c| {
                    c.tag("C").line(0, |x| x.key("X").params(&["1"]));
                });
            })
            .line(1, |y| y.key("Y").params(&["2"]));
    }

    #[test]
    fn test_opaque_line_is_kept_verbatim() {
        let root = parse("<A\n    NAME \"unterminated\n  B 1\n>").unwrap();
        assert_eq!(
            root.children[0],
            Node::Opaque("    NAME \"unterminated".to_string())
        );
        assert_chunk(&root).line(1, |b| b.key("B").params(&["1"]));
    }

    #[test]
    fn test_opaque_line_drops_every_trailing_carriage_return() {
        let root = parse("<A\r\n  X \"a\r\r\n>\r\n").unwrap();
        assert_eq!(root.children, vec![Node::Opaque("  X \"a".to_string())]);
        assert_eq!(parse(&crate::rpp::serializer::serialize(&root)), Ok(root));
    }

    #[test]
    fn test_unwritable_token_keeps_line_verbatim() {
        let root = parse("<A\n  K x\"'`\\\n  B 1\n>\n").unwrap();
        assert_eq!(root.children[0], Node::Opaque("  K x\"'`\\".to_string()));
        assert_chunk(&root).line(1, |b| b.key("B").params(&["1"]));
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let root = parse("\u{feff}<A\r\n\r\n  B 1\r\n>\r\n\r\n").unwrap();
        assert_chunk(&root)
            .tag("A")
            .child_count(1)
            .line(0, |b| b.key("B").params(&["1"]));
    }

    #[test]
    fn test_unexpected_close() {
        assert_eq!(
            parse("<A\n>\n>\n"),
            Err(ParseError::UnexpectedClose { line: 3 })
        );
    }

    #[test]
    fn test_unterminated_chunk_reports_innermost() {
        assert_eq!(
            parse("<A\n  <B\n  >\n  <C\n"),
            Err(ParseError::UnterminatedChunk {
                tag: "C".to_string(),
                line: 4
            })
        );
    }

    #[test]
    fn test_missing_root() {
        assert_eq!(parse(""), Err(ParseError::MissingRoot));
        assert_eq!(parse("  \n\n"), Err(ParseError::MissingRoot));
        assert_eq!(parse("NAME x\n"), Err(ParseError::MissingRoot));
    }

    #[test]
    fn test_trailing_content() {
        assert_eq!(
            parse("<A\n>\nB 1\n"),
            Err(ParseError::TrailingContent { line: 3 })
        );
        assert_eq!(
            parse("<A\n>\n<B\n>\n"),
            Err(ParseError::TrailingContent { line: 3 })
        );
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse("<\n>"),
            Err(ParseError::MalformedHeader { line: 1, .. })
        ));
        assert!(matches!(
            parse("<A \"open\n>"),
            Err(ParseError::MalformedHeader { line: 1, .. })
        ));
        assert!(matches!(
            parse("<\"A\"\n>"),
            Err(ParseError::MalformedHeader { line: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(
            parse_bytes(b"<A\n\xff\n>"),
            Err(ParseError::InvalidEncoding { offset: 3 })
        );
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 100_000;
        let mut text = String::new();
        for _ in 0..depth {
            text.push_str("<N\n");
        }
        for _ in 0..depth {
            text.push_str(">\n");
        }
        let root = parse(&text).unwrap();
        assert_eq!(root.chunk_count(), depth);
        // Dropping a tree this deep recurses in the compiler generated drop glue.
        std::mem::forget(root);
    }
}
