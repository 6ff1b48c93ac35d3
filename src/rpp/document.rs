//! Project documents and the working set
//!
//!     A [`ProjectDocument`] wraps one parsed tree with a session-unique id and a display name.
//!     The [`DocumentSet`] holds every loaded document in load order and tracks which one is the
//!     transform source.
//!
//!     Roots sit behind `Arc` and are never edited. Taking a transform snapshot projects the roots
//!     up front, so a run observes the set as it was when the snapshot was taken regardless of
//!     what happens to the set afterwards.

use super::chunk::Chunk;
use super::error::ParseError;
use super::parser::parse_bytes;
use super::projection::{to_value, Value};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Session-unique document id. Ids are handed out in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectDocument {
    id: DocumentId,
    name: String,
    root: Arc<Chunk>,
}

impl ProjectDocument {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Arc<Chunk> {
        &self.root
    }

    /// The projection shown when the document is inspected.
    pub fn to_value(&self) -> Value {
        to_value(&self.root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("no document with id {0}")]
    UnknownDocument(DocumentId),
}

/// Projections of a source document and all others, frozen at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformInputs {
    pub source: Value,
    pub others: Vec<Value>,
}

/// Display name for an imported file: its file name, or the path as given if it has none.
pub fn name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The loaded documents in load order.
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: Vec<ProjectDocument>,
    source: Option<DocumentId>,
    next_id: u64,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `bytes` and add the result. Nothing is added when parsing fails.
    pub fn import(
        &mut self,
        name: impl Into<String>,
        bytes: &[u8],
    ) -> Result<DocumentId, ParseError> {
        let name = name.into();
        let root = parse_bytes(bytes).inspect_err(|err| {
            tracing::debug!(%name, %err, "import failed");
        })?;
        Ok(self.import_parsed(name, root))
    }

    /// Add an already parsed tree.
    pub fn import_parsed(&mut self, name: impl Into<String>, root: Chunk) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        let name = name.into();
        tracing::debug!(%id, %name, "imported document");

        self.documents.push(ProjectDocument {
            id,
            name,
            root: Arc::new(root),
        });
        if self.source.is_none() {
            self.source = Some(id);
        }
        id
    }

    /// Remove a document. When it was the source, the first remaining document becomes the
    /// source.
    pub fn remove(&mut self, id: DocumentId) -> Result<ProjectDocument, DocumentError> {
        let index = self.index_of(id)?;
        let removed = self.documents.remove(index);
        tracing::debug!(%id, name = %removed.name, "removed document");

        if self.source == Some(id) {
            self.source = self.documents.first().map(|doc| doc.id);
        }
        Ok(removed)
    }

    pub fn set_source(&mut self, id: DocumentId) -> Result<(), DocumentError> {
        self.index_of(id)?;
        self.source = Some(id);
        Ok(())
    }

    pub fn source(&self) -> Option<&ProjectDocument> {
        self.source.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: DocumentId) -> Option<&ProjectDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectDocument> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Snapshot `source` and every other document, in load order, for a transform run.
    pub fn transform_inputs(&self, source: DocumentId) -> Result<TransformInputs, DocumentError> {
        let source_doc = self
            .get(source)
            .ok_or(DocumentError::UnknownDocument(source))?;
        let others = self
            .documents
            .iter()
            .filter(|doc| doc.id != source)
            .map(ProjectDocument::to_value)
            .collect();
        Ok(TransformInputs {
            source: source_doc.to_value(),
            others,
        })
    }

    fn index_of(&self, id: DocumentId) -> Result<usize, DocumentError> {
        self.documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or(DocumentError::UnknownDocument(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(tag: &str) -> Vec<u8> {
        format!("<{}\n>\n", tag).into_bytes()
    }

    fn set_of(tags: &[&str]) -> (DocumentSet, Vec<DocumentId>) {
        let mut set = DocumentSet::new();
        let ids = tags
            .iter()
            .map(|tag| set.import(format!("{}.rpp", tag), &project(tag)).unwrap())
            .collect();
        (set, ids)
    }

    #[test]
    fn test_first_import_becomes_source() {
        let (set, ids) = set_of(&["A", "B"]);
        assert_eq!(set.source().unwrap().id(), ids[0]);
        assert_eq!(set.get(ids[1]).unwrap().name(), "B.rpp");
    }

    #[test]
    fn test_failed_import_leaves_set_untouched() {
        let (mut set, _) = set_of(&["A"]);
        assert!(set.import("bad.rpp", b"<A\n").is_err());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (mut set, ids) = set_of(&["A", "B"]);
        set.remove(ids[1]).unwrap();
        let c = set.import("C.rpp", &project("C")).unwrap();
        assert!(c > ids[1]);
        assert_eq!(set.remove(ids[1]).unwrap_err(), DocumentError::UnknownDocument(ids[1]));
    }

    #[test]
    fn test_removing_source_moves_source() {
        let (mut set, ids) = set_of(&["A", "B", "C"]);
        set.set_source(ids[1]).unwrap();

        set.remove(ids[1]).unwrap();
        assert_eq!(set.source().unwrap().id(), ids[0]);

        set.remove(ids[0]).unwrap();
        assert_eq!(set.source().unwrap().id(), ids[2]);

        set.remove(ids[2]).unwrap();
        assert!(set.source().is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_removing_other_keeps_source() {
        let (mut set, ids) = set_of(&["A", "B"]);
        set.remove(ids[1]).unwrap();
        assert_eq!(set.source().unwrap().id(), ids[0]);
    }

    #[test]
    fn test_transform_inputs_exclude_source_in_load_order() {
        let (set, ids) = set_of(&["A", "B", "C"]);
        let inputs = set.transform_inputs(ids[1]).unwrap();
        let tag = |v: &Value| v.as_mapping().unwrap()["tag"].as_str().unwrap().to_string();
        assert_eq!(tag(&inputs.source), "B");
        assert_eq!(inputs.others.iter().map(tag).collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_changes() {
        let (mut set, ids) = set_of(&["A", "B"]);
        let inputs = set.transform_inputs(ids[0]).unwrap();
        set.remove(ids[1]).unwrap();
        set.import("D.rpp", &project("D")).unwrap();
        assert_eq!(inputs.others.len(), 1);
        assert_eq!(inputs.others[0].as_mapping().unwrap()["tag"], Value::from("B"));
    }

    #[test]
    fn test_name_from_path() {
        assert_eq!(name_from_path(Path::new("/tmp/songs/mix.rpp")), "mix.rpp");
    }
}
