//! Built-in transform scripts
//!
//! The catalog is fixed at compile time. Editing a script produces a detached copy; the
//! catalog itself never changes.

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformScript {
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub body: Cow<'static, str>,
}

impl TransformScript {
    const fn builtin(name: &'static str, description: &'static str, body: &'static str) -> Self {
        TransformScript {
            name: Cow::Borrowed(name),
            description: Cow::Borrowed(description),
            body: Cow::Borrowed(body),
        }
    }

    /// A script that did not come from the catalog.
    pub fn custom(name: impl Into<String>, body: impl Into<String>) -> Self {
        TransformScript {
            name: Cow::Owned(name.into()),
            description: Cow::Borrowed(""),
            body: Cow::Owned(body.into()),
        }
    }

    /// Copy of this script with a different body, keeping name and description.
    pub fn edited(&self, body: impl Into<String>) -> Self {
        TransformScript {
            name: self.name.clone(),
            description: self.description.clone(),
            body: Cow::Owned(body.into()),
        }
    }
}

static BUILTIN_SCRIPTS: &[TransformScript] = &[
    TransformScript::builtin(
        "copy-source",
        "Return the source project unchanged",
        include_str!("scripts/copy_source.rhai"),
    ),
    TransformScript::builtin(
        "merge-tracks",
        "Append the tracks of all other projects to the source project",
        include_str!("scripts/merge_tracks.rhai"),
    ),
    TransformScript::builtin(
        "split-tracks",
        "Write one project per track of the source project",
        include_str!("scripts/split_tracks.rhai"),
    ),
    TransformScript::builtin(
        "strip-fx",
        "Remove all effect chains from the source project",
        include_str!("scripts/strip_fx.rhai"),
    ),
];

/// The built-in scripts, in display order. The first one is the default.
pub fn builtin_scripts() -> &'static [TransformScript] {
    BUILTIN_SCRIPTS
}

pub fn find(name: &str) -> Option<&'static TransformScript> {
    BUILTIN_SCRIPTS.iter().find(|script| script.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = builtin_scripts().iter().map(|s| &s.name).collect();
        assert_eq!(names.len(), builtin_scripts().len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("copy-source").unwrap().name, "copy-source");
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_edits_do_not_touch_catalog() {
        let original = find("strip-fx").unwrap();
        let edited = original.edited("[]");
        assert_eq!(edited.name, original.name);
        assert_eq!(edited.body, "[]");
        assert_ne!(find("strip-fx").unwrap().body, "[]");
    }
}
