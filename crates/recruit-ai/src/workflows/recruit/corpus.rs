//! Corpus enumeration: read every job posting in a collection and produce
//! normalized text plus a requirements excerpt per document.
//!
//! The corpus is re-read on every run so newly uploaded postings take part
//! immediately; nothing here is cached. Per-document failures remove that
//! posting from the result set but never abort the listing.

use crate::workflows::recruit::entities;
use crate::workflows::recruit::extract;
use crate::workflows::recruit::state::{CorpusEntry, RecruiterContact};
use tracing::{debug, warn};

/// Postings whose normalized text is shorter than this are treated as blank.
pub const MIN_POSTING_CHARS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("document store operation failed: {0}")]
    Backend(String),
    #[error("document {0} not found")]
    NotFound(String),
}

/// Listing entry as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub id: String,
    pub name: String,
    pub media_type: String,
}

/// Fetched document content with its declared media type.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Storage seam for both the resume collection and the posting corpus.
pub trait DocumentStore: Send + Sync {
    fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentHandle>, DocumentStoreError>;
    fn fetch_document(&self, document_id: &str) -> Result<FetchedDocument, DocumentStoreError>;
    /// Move a document into another collection once a run has finished with it.
    fn archive_document(
        &self,
        document_id: &str,
        target_folder_id: &str,
    ) -> Result<(), DocumentStoreError>;
}

/// Read the posting corpus: list, fetch, extract, normalize, and excerpt each
/// document. Order follows the store listing.
pub fn read_corpus<D>(store: &D, folder_id: &str) -> Vec<CorpusEntry>
where
    D: DocumentStore + ?Sized,
{
    let handles = match store.list_documents(folder_id) {
        Ok(handles) => handles,
        Err(err) => {
            warn!(folder = folder_id, error = %err, "corpus listing failed");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for handle in handles {
        if !extract::is_supported_media_type(&handle.media_type) {
            warn!(posting = %handle.name, media_type = %handle.media_type, "skipping unsupported posting");
            continue;
        }

        let fetched = match store.fetch_document(&handle.id) {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(posting = %handle.name, error = %err, "failed to fetch posting");
                continue;
            }
        };

        let text = extract::document_text(&handle.name, &fetched.media_type, &fetched.bytes);
        let normalized = entities::normalize_posting(&text);
        if normalized.trim().len() < MIN_POSTING_CHARS {
            warn!(posting = %handle.name, length = normalized.trim().len(), "skipping blank or too-short posting");
            continue;
        }

        let requirements_excerpt = entities::requirements_excerpt(&normalized);
        debug!(posting = %handle.name, "extracted requirements");
        entries.push(CorpusEntry {
            filename: handle.name,
            normalized_text: normalized,
            requirements_excerpt,
        });
    }
    entries
}

/// Derive recruiter contacts from corpus entries: the first email found in a
/// posting wins, with a display name recovered by the label cascade. Postings
/// without any email are logged and contribute nothing.
pub fn recruiter_directory(entries: &[CorpusEntry]) -> Vec<RecruiterContact> {
    let mut contacts = Vec::new();
    for entry in entries {
        match entities::first_email(&entry.normalized_text) {
            Some(email) => {
                let name = entities::recruiter_name(&entry.normalized_text, Some(&email));
                debug!(posting = %entry.filename, recruiter = %email, "found recruiter contact");
                contacts.push(RecruiterContact {
                    email,
                    name,
                    source_filename: entry.filename.clone(),
                });
            }
            None => {
                warn!(posting = %entry.filename, "no recruiter email found");
            }
        }
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeStore {
        handles: Vec<DocumentHandle>,
        contents: HashMap<String, FetchedDocument>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                handles: Vec::new(),
                contents: HashMap::new(),
            }
        }

        fn with_text(mut self, id: &str, name: &str, body: &str) -> Self {
            self.handles.push(DocumentHandle {
                id: id.to_string(),
                name: name.to_string(),
                media_type: "text/plain".to_string(),
            });
            self.contents.insert(
                id.to_string(),
                FetchedDocument {
                    bytes: body.as_bytes().to_vec(),
                    media_type: "text/plain".to_string(),
                },
            );
            self
        }

        fn with_unsupported(mut self, id: &str, name: &str) -> Self {
            self.handles.push(DocumentHandle {
                id: id.to_string(),
                name: name.to_string(),
                media_type: "image/png".to_string(),
            });
            self
        }

        fn with_unfetchable(mut self, id: &str, name: &str) -> Self {
            self.handles.push(DocumentHandle {
                id: id.to_string(),
                name: name.to_string(),
                media_type: "text/plain".to_string(),
            });
            self
        }
    }

    impl DocumentStore for FakeStore {
        fn list_documents(
            &self,
            _folder_id: &str,
        ) -> Result<Vec<DocumentHandle>, DocumentStoreError> {
            Ok(self.handles.clone())
        }

        fn fetch_document(&self, document_id: &str) -> Result<FetchedDocument, DocumentStoreError> {
            self.contents
                .get(document_id)
                .cloned()
                .ok_or_else(|| DocumentStoreError::NotFound(document_id.to_string()))
        }

        fn archive_document(
            &self,
            _document_id: &str,
            _target_folder_id: &str,
        ) -> Result<(), DocumentStoreError> {
            Ok(())
        }
    }

    const POSTING: &str = "Acme Corp is hiring\ncontact: Dana Reed\ndana.reed@acme.com\nRole overview paragraph\nSkills Required\nRust\nTokio\nAbout the company\nWe are Acme";

    #[test]
    fn corpus_read_normalizes_and_excerpts_each_posting() {
        let store = FakeStore::new().with_text("p1", "backend.txt", POSTING);
        let entries = read_corpus(&store, "postings");

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.filename, "backend.txt");
        assert!(entry.normalized_text.contains("acme corp is hiring"));
        assert!(entry.requirements_excerpt.contains("rust"));
        assert!(!entry.requirements_excerpt.contains("about the company"));
    }

    #[test]
    fn unsupported_and_unfetchable_postings_are_skipped() {
        let store = FakeStore::new()
            .with_unsupported("img", "team-photo.png")
            .with_unfetchable("gone", "missing.txt")
            .with_text("p1", "backend.txt", POSTING);

        let entries = read_corpus(&store, "postings");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "backend.txt");
    }

    #[test]
    fn short_postings_are_discarded_entirely() {
        let store = FakeStore::new().with_text("tiny", "stub.txt", "too short");
        assert!(read_corpus(&store, "postings").is_empty());
    }

    #[test]
    fn directory_keeps_first_email_and_label_name() {
        let store = FakeStore::new().with_text("p1", "backend.txt", POSTING);
        let entries = read_corpus(&store, "postings");
        let directory = recruiter_directory(&entries);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory[0].email, "dana.reed@acme.com");
        assert_eq!(directory[0].name.as_deref(), Some("dana reed"));
        assert_eq!(directory[0].source_filename, "backend.txt");
    }

    #[test]
    fn postings_without_email_yield_no_contact() {
        let body = "A posting with enough text to clear the blank threshold\nbut with no contact information at all";
        let store = FakeStore::new().with_text("p1", "quiet.txt", body);
        let entries = read_corpus(&store, "postings");
        assert!(recruiter_directory(&entries).is_empty());
    }
}
