//! Author-side state of a document being composed: title, tags, body, and the
//! submit gate derived from them.

use crate::domain::{
    document::{Document, Operation},
    payload::{Payload, SelectedFile},
    tags::TagSet,
};

use super::{error::PublishError, publish::PublishOutcome};

/// Whether a draft may be submitted: it needs a title and a body that differs
/// from what the editor started with.
///
/// Documents compare by their canonical form (ordered attributes), so this is
/// the same as comparing serializations; it costs O(document size).
pub fn submit_gate(title: &str, current: &Document, initial: &Document) -> bool {
    !title.trim().is_empty() && current != initial
}

#[derive(Debug, Clone)]
pub struct Draft {
    title: String,
    tags: TagSet,
    document: Document,
    initial: Document,
    revision: u64,
    submit_enabled: bool,
}

/// Owned copy of a draft taken when a publish attempt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub revision: u64,
    pub title: String,
    pub tags: TagSet,
    pub document: Document,
    pub submit_enabled: bool,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    /// A draft over a freshly opened, empty editor.
    pub fn new() -> Self {
        Self::with_initial(Document::blank())
    }

    /// A draft whose body starts as `initial`; the gate stays closed until it changes.
    pub fn with_initial(initial: Document) -> Self {
        Self {
            title: String::new(),
            tags: TagSet::new(),
            document: initial.clone(),
            initial,
            revision: 0,
            submit_enabled: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        let added = self.tags.insert(tag);
        if added {
            self.touch();
        }
        added
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.tags.remove(tag);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the body with what the editor currently holds.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
        self.touch();
    }

    /// Insert a picked file as an inline image embed before operation `index`
    /// (clamped to the end). Non-images are refused before anything is encoded.
    pub fn embed_image(&mut self, index: usize, file: &SelectedFile) -> Result<(), PublishError> {
        let payload = Payload::from_selected(file)?;
        let mut ops = self.document.operations().to_vec();
        let at = index.min(ops.len());
        ops.insert(at, Operation::inline_image(payload));
        let mut document = self.document.clone();
        document.set_operations(ops);
        self.set_document(document);
        Ok(())
    }

    /// Counts edits; used to tell whether a publish result is stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.document != self.initial
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            revision: self.revision,
            title: self.title.clone(),
            tags: self.tags.clone(),
            document: self.document.clone(),
            submit_enabled: self.submit_enabled,
        }
    }

    /// Adopt the rewritten body of a finished publish.
    ///
    /// Returns `false` and leaves the draft alone when it was edited after
    /// the snapshot was taken; the late result is discarded.
    pub fn apply_published(&mut self, outcome: &PublishOutcome) -> bool {
        if outcome.snapshot_revision != self.revision {
            return false;
        }
        let mut document = self.document.clone();
        document.set_operations(outcome.document.operations().to_vec());
        self.set_document(document);
        true
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.submit_enabled = submit_gate(&self.title, &self.document, &self.initial);
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::domain::document::ImageSource;

    fn body(text: &str) -> Document {
        Document::new(vec![Operation::text(format!("{text}\n"))])
    }

    fn image_file(media_type: &str) -> SelectedFile {
        SelectedFile {
            name: "pick".into(),
            media_type: media_type.into(),
            bytes: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn gate_needs_title_and_changed_body() {
        let mut draft = Draft::new();
        assert!(!draft.submit_enabled());

        draft.set_document(body("changed"));
        assert!(!draft.submit_enabled(), "no title yet");

        draft.set_title("Hello");
        assert!(draft.submit_enabled());

        draft.set_title("");
        assert!(!draft.submit_enabled(), "title cleared");
    }

    #[test]
    fn undo_back_to_initial_closes_gate() {
        let mut draft = Draft::new();
        draft.set_title("T");
        draft.set_document(body("x"));
        assert!(draft.submit_enabled());

        draft.set_document(Document::blank());
        assert!(!draft.is_dirty());
        assert!(!draft.submit_enabled());
    }

    #[test]
    fn whitespace_title_keeps_gate_closed() {
        let mut draft = Draft::new();
        draft.set_document(body("x"));
        draft.set_title("   ");
        assert!(!draft.submit_enabled());
    }

    #[test]
    fn embedding_an_image_dirties_the_draft() {
        let mut draft = Draft::new();
        draft.set_title("T");
        draft.embed_image(0, &image_file("image/png")).expect("embed");

        assert!(draft.submit_enabled());
        assert_eq!(draft.document().inline_image_count(), 1);
        assert!(matches!(
            draft.document().operations()[0],
            Operation::ImageEmbed { source: ImageSource::Inline(_), .. }
        ));
    }

    #[test]
    fn embedding_clamps_index_to_end() {
        let mut draft = Draft::new();
        draft.embed_image(99, &image_file("image/gif")).expect("embed");
        let ops = draft.document().operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[1], Operation::ImageEmbed { .. }));
    }

    #[test]
    fn non_image_file_is_refused_without_touching_the_body() {
        let mut draft = Draft::new();
        let before = draft.revision();
        let err = draft
            .embed_image(0, &image_file("text/plain"))
            .expect_err("text is refused");
        assert_eq!(
            err,
            PublishError::UnsupportedFileType {
                media_type: "text/plain".into()
            }
        );
        assert_eq!(draft.revision(), before);
        assert_eq!(draft.document(), &Document::blank());
    }

    #[test]
    fn tags_stay_unique() {
        let mut draft = Draft::new();
        assert!(draft.add_tag("rust"));
        assert!(!draft.add_tag("rust"));
        assert!(draft.add_tag("web"));
        assert_eq!(draft.tags().to_vec(), ["rust", "web"]);
        assert_eq!(draft.snapshot().tags.to_vec(), ["rust", "web"]);
    }

    #[test]
    fn every_real_edit_bumps_the_revision() {
        let mut draft = Draft::new();
        draft.set_title("T");
        assert_eq!(draft.revision(), 1);
        draft.add_tag("rust");
        assert_eq!(draft.revision(), 2);
        draft.add_tag("rust");
        draft.remove_tag("missing");
        assert_eq!(draft.revision(), 2);
        draft.set_document(body("x"));
        assert_eq!(draft.revision(), 3);
    }
}
