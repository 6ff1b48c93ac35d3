//! Line tokenization
//!
//! Every non-structural line of a project file is a whitespace separated list of tokens. A token
//! is either bare or quoted with one of the three delimiters REAPER writes:
//!
//!     NAME "Kick drum"
//!     NAME 'say "hi"'
//!     NAME `it's "quoted"`
//!
//! Inside double quotes a doubled quote (`""`) or a backslash escaped quote (`\"`) stands for a
//! literal quote. Any other backslash pair is kept as written, so Windows paths pass through
//! untouched. Single quotes and backticks have no escapes at all.
//!
//! A line tokenizes cleanly when every quoted token is terminated and is followed by whitespace
//! or the end of the line, and when [`quote`] can write every token back. Anything else is
//! reported as an error and the parser keeps the line verbatim.

use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\x0C]+")]
    Whitespace,

    #[regex(r#""([^"\\]|""|\\.)*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[regex(r"`[^`]*`")]
    BacktickQuoted,

    #[regex(r#"[^ \t\r\x0C"'`][^ \t\r\x0C]*"#)]
    Bare,
}

/// How a token was written in the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Bare,
    Quoted,
}

/// A token with quoting and escapes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

/// Why a line could not be tokenized cleanly. Columns are byte offsets into the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// A quote opened at this column is never closed.
    UnterminatedQuote { column: usize },
    /// A quoted token is immediately followed by more text.
    UnseparatedToken { column: usize },
    /// The token's value has no quoted form that reads back the same.
    Unwritable { column: usize },
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::UnterminatedQuote { column } => {
                write!(f, "unterminated quote at column {}", column)
            }
            TokenizeError::UnseparatedToken { column } => {
                write!(f, "quoted token runs into text at column {}", column)
            }
            TokenizeError::Unwritable { column } => {
                write!(f, "token at column {} cannot be written back", column)
            }
        }
    }
}

/// Whitespace as the tokenizer sees it.
pub fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\x0C')
}

/// Split one line into tokens.
pub fn tokenize_line(line: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut lexer = RawToken::lexer(line);
    let mut tokens = Vec::new();
    let mut after_quoted = false;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let raw = match result {
            Ok(raw) => raw,
            Err(()) => {
                return Err(TokenizeError::UnterminatedQuote { column: span.start });
            }
        };

        if after_quoted && raw != RawToken::Whitespace {
            return Err(TokenizeError::UnseparatedToken { column: span.start });
        }

        if raw == RawToken::Whitespace {
            after_quoted = false;
            continue;
        }

        let token = raw_token(raw, lexer.slice());
        if !is_writable(&token.value) {
            return Err(TokenizeError::Unwritable { column: span.start });
        }
        after_quoted = token.kind == TokenKind::Quoted;
        tokens.push(token);
    }

    Ok(tokens)
}

fn raw_token(raw: RawToken, text: &str) -> Token {
    match raw {
        RawToken::DoubleQuoted => Token {
            kind: TokenKind::Quoted,
            value: unescape_double(&text[1..text.len() - 1]),
        },
        RawToken::SingleQuoted | RawToken::BacktickQuoted => Token {
            kind: TokenKind::Quoted,
            value: text[1..text.len() - 1].to_string(),
        },
        RawToken::Bare | RawToken::Whitespace => Token {
            kind: TokenKind::Bare,
            value: text.to_string(),
        },
    }
}

/// Resolve `""` and `\"` inside a double quoted token. Consumes characters in the same pairs the
/// token regex matched them.
fn unescape_double(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '"' => {
                // The regex only admits a quote here as the first half of `""`.
                chars.next();
                out.push('"');
            }
            other => out.push(other),
        }
    }
    out
}

/// Render a token so that [`tokenize_line`] reads it back as `value`.
pub fn quote(value: &str) -> String {
    if !needs_quotes(value) {
        return value.to_string();
    }
    if !value.contains('"') && !value.ends_with('\\') {
        return format!("\"{}\"", value);
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('`') {
        return format!("`{}`", value);
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Whether [`quote`] renders `value` as a single token that reads back unchanged.
pub fn is_writable(value: &str) -> bool {
    if value.contains('\n') {
        return false;
    }
    // Only the doubled-quote fallback can fail.
    if !(value.contains('\'') && value.contains('`')) {
        return true;
    }
    let written = quote(value);
    let mut lexer = RawToken::lexer(&written);
    let read = match lexer.next() {
        Some(Ok(raw)) if raw != RawToken::Whitespace => raw_token(raw, lexer.slice()),
        _ => return false,
    };
    lexer.next().is_none() && read.value == value
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.starts_with('<')
        || value.starts_with('>')
        || value
            .chars()
            .any(|c| is_blank(c) || matches!(c, '"' | '\'' | '`'))
}
