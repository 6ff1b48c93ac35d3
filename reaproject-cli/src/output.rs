//! File names for transform results
//!
//! Scripts pick document names freely. Before a name becomes a file name, characters that are
//! not safe on common file systems are replaced, a trailing `.rpp` is dropped (it is added back)
//! and repeated names get a numeric suffix: `drums.rpp`, `drums-2.rpp`, `drums-3.rpp`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9 ._()+-]+").expect("valid file name pattern"));

static RPP_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.rpp$").expect("valid suffix pattern"));

const FALLBACK_NAME: &str = "untitled";

/// Turn a document name into a file stem.
pub fn sanitize(name: &str) -> String {
    let stem = RPP_SUFFIX.replace(name.trim(), "");
    let cleaned = UNSAFE_CHARS.replace_all(&stem, "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == ' ');
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Hands out unique `<stem>.rpp` file names for one output directory.
#[derive(Debug, Default)]
pub struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_name(&mut self, name: &str) -> String {
        let stem = sanitize(name);
        let mut candidate = format!("{}.rpp", stem);
        let mut counter = 2;
        while !self.taken.insert(candidate.to_lowercase()) {
            candidate = format!("{}-{}.rpp", stem, counter);
            counter += 1;
        }
        candidate
    }
}
