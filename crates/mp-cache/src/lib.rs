//! Publish state for markpress documents.
//!
//! Every published document has a side-car file next to it
//! (`post.md` → `post.markpress`) holding a [`PublishRecord`]: the remote post
//! id, the checksum of the last uploaded content and the media uploaded with
//! it. Repeat runs compare checksums against the record and only upload what
//! changed.
//!
//! # Example
//!
//! ```
//! use mp_cache::needs_upload;
//!
//! assert!(needs_upload(None, "abc", false));
//! assert!(!needs_upload(Some("abc"), "abc", false));
//! assert!(needs_upload(Some("abc"), "abc", true));
//! ```

mod store;

pub use store::{RecordStore, SIDECAR_EXTENSION};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mp_document::{DocType, PostStatus, PostType, checksum_bytes};
use serde::{Deserialize, Serialize};

/// Current side-car schema version.
///
/// Version 1 files carried no `version` field and used the `published` /
/// `unpublished` and `html` vocabulary, which still loads.
pub const RECORD_VERSION: u32 = 2;

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt cache file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing cache file: {}", .0.display())]
    Missing(PathBuf),
}

/// Persisted publish state of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishRecord {
    pub version: u32,
    /// Remote post id; present once the document has been published.
    pub id: Option<String>,
    /// Permalink reported by the server.
    pub url: Option<String>,
    pub title: Option<String>,
    pub status: Option<PostStatus>,
    pub post_type: Option<PostType>,
    pub doctype: Option<DocType>,
    /// Seconds since the epoch, UTC.
    pub created_at: Option<i64>,
    /// Seconds since the epoch, UTC.
    pub updated_at: Option<i64>,
    /// Checksum of the last successfully uploaded document content.
    pub checksum: Option<String>,
    pub categories: Vec<String>,
    /// Uploaded media keyed by absolute local path.
    pub media: BTreeMap<String, MediaRecord>,
}

impl Default for PublishRecord {
    fn default() -> Self {
        Self {
            version: RECORD_VERSION,
            id: None,
            url: None,
            title: None,
            status: None,
            post_type: None,
            doctype: None,
            created_at: None,
            updated_at: None,
            checksum: None,
            categories: Vec::new(),
            media: BTreeMap::new(),
        }
    }
}

impl PublishRecord {
    /// Whether the document has been published at least once.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.id.is_some()
    }

    /// Media record for `filename`, created on first sight.
    pub fn media_entry(&mut self, filename: &Path) -> &mut MediaRecord {
        let key = filename.to_string_lossy().into_owned();
        self.media
            .entry(key.clone())
            .or_insert_with(|| MediaRecord::new(key))
    }

    /// Media record for `filename`, if one exists.
    #[must_use]
    pub fn media(&self, filename: &Path) -> Option<&MediaRecord> {
        self.media.get(filename.to_string_lossy().as_ref())
    }
}

/// Upload state of one media file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaRecord {
    /// Absolute local path.
    pub filename: String,
    pub checksum: Option<String>,
    /// Remote URL of the uploaded copy.
    pub url: Option<String>,
}

impl MediaRecord {
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            checksum: None,
            url: None,
        }
    }
}

/// SHA-256 of a file's bytes as lowercase hex.
pub fn checksum_file(path: &Path) -> Result<String, CacheError> {
    let bytes = std::fs::read(path).map_err(|source| CacheError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(checksum_bytes(&bytes))
}

/// Upload decision rule shared by documents and media files.
#[must_use]
pub fn needs_upload(cached: Option<&str>, current: &str, force: bool) -> bool {
    force || cached.is_none_or(|c| c != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_needs_upload() {
        assert!(needs_upload(None, "a", false));
        assert!(needs_upload(Some("a"), "b", false));
        assert!(!needs_upload(Some("a"), "a", false));
        assert!(needs_upload(Some("a"), "a", true));
    }

    #[test]
    fn test_legacy_record_loads() {
        let json = r#"{
            "id": "17",
            "url": "https://blog.example.com/?p=17",
            "status": "published",
            "doctype": "html",
            "checksum": "abc",
            "media": {
                "/b/img.png": {"filename": "/b/img.png", "checksum": "def"}
            }
        }"#;
        let record: PublishRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("17"));
        assert_eq!(record.status, Some(PostStatus::Publish));
        assert_eq!(record.doctype, Some(DocType::Article));
        assert_eq!(record.post_type, None);
        assert!(record.categories.is_empty());
        assert_eq!(record.media["/b/img.png"].url, None);
        assert_eq!(record.version, RECORD_VERSION);
    }

    #[test]
    fn test_media_entry_created_once() {
        let mut record = PublishRecord::default();
        record.media_entry(Path::new("/b/a.png")).checksum = Some("1".to_owned());
        let entry = record.media_entry(Path::new("/b/a.png"));
        assert_eq!(entry.checksum.as_deref(), Some("1"));
        assert_eq!(entry.filename, "/b/a.png");
        assert_eq!(record.media.len(), 1);
        assert!(record.media(Path::new("/b/other.png")).is_none());
    }

    #[test]
    fn test_checksum_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"abc").unwrap();
        assert_eq!(
            checksum_file(tmp.path()).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_checksum_missing_file() {
        let err = checksum_file(Path::new("/no/such/file.png")).unwrap_err();
        assert!(matches!(err, CacheError::Read { .. }));
    }
}
