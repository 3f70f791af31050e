//! Side-car file storage.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{CacheError, PublishRecord, RECORD_VERSION};

/// Extension of side-car files.
pub const SIDECAR_EXTENSION: &str = "markpress";

/// Reads and writes the side-car file of one document.
///
/// With `dry_run` set, [`save`](Self::save) and [`delete`](Self::delete) only
/// log what they would do.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    dry_run: bool,
}

impl RecordStore {
    /// Store for the side-car next to `document` (`<dir>/<stem>.markpress`).
    #[must_use]
    pub fn for_document(document: &Path, dry_run: bool) -> Self {
        Self {
            path: document.with_extension(SIDECAR_EXTENSION),
            dry_run,
        }
    }

    /// Side-car file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the side-car file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the record, or an empty one when no side-car exists.
    pub fn load(&self) -> Result<PublishRecord, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no cache file");
                return Ok(PublishRecord::default());
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        tracing::debug!(path = %self.path.display(), "reading cache");
        let mut record: PublishRecord =
            serde_json::from_str(&content).map_err(|source| CacheError::Parse {
                path: self.path.clone(),
                source,
            })?;
        if record.version != RECORD_VERSION {
            tracing::info!(
                "migrating cache {} from version {} to {RECORD_VERSION}",
                self.path.display(),
                record.version
            );
            record.version = RECORD_VERSION;
        }
        Ok(record)
    }

    /// Load the record, failing when no side-car exists.
    pub fn load_existing(&self) -> Result<PublishRecord, CacheError> {
        if !self.exists() {
            return Err(CacheError::Missing(self.path.clone()));
        }
        self.load()
    }

    /// Atomically replace the side-car with `record`.
    ///
    /// The JSON is written to a temporary file in the same directory and
    /// renamed over the old file, so an interrupted run never leaves a
    /// truncated record behind.
    pub fn save(&self, record: &PublishRecord) -> Result<(), CacheError> {
        if self.dry_run {
            tracing::info!(path = %self.path.display(), "dry run: not writing cache");
            return Ok(());
        }
        tracing::debug!(path = %self.path.display(), "writing cache");

        let write_err = |source: std::io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(record).map_err(|source| CacheError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    /// Remove the side-car file. A missing file is not an error.
    pub fn delete(&self) -> Result<(), CacheError> {
        if self.dry_run {
            tracing::info!(path = %self.path.display(), "dry run: not deleting cache");
            return Ok(());
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "deleted cache file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MediaRecord;
    use mp_document::PostStatus;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_record() -> PublishRecord {
        let mut record = PublishRecord {
            id: Some("42".to_owned()),
            url: Some("https://blog.example.com/?p=42".to_owned()),
            title: Some("Hello".to_owned()),
            status: Some(PostStatus::Draft),
            created_at: Some(1_700_000_000),
            checksum: Some("abc".to_owned()),
            categories: vec!["News".to_owned()],
            ..PublishRecord::default()
        };
        record.media.insert(
            "/b/a.png".to_owned(),
            MediaRecord {
                filename: "/b/a.png".to_owned(),
                checksum: Some("def".to_owned()),
                url: Some("https://blog.example.com/a.png".to_owned()),
            },
        );
        record
    }

    #[test]
    fn test_sidecar_path() {
        let store = RecordStore::for_document(Path::new("/blog/post.md"), false);
        assert_eq!(store.path(), Path::new("/blog/post.markpress"));
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::for_document(&dir.path().join("post.md"), false);
        assert_eq!(store.load().unwrap(), PublishRecord::default());
        assert!(matches!(store.load_existing(), Err(CacheError::Missing(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::for_document(&dir.path().join("post.md"), false);
        let record = sample_record();

        store.save(&record).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), record);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"version\": 2"));
        assert!(raw.contains("\"status\": \"draft\""));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::for_document(&dir.path().join("post.md"), false);
        store.save(&sample_record()).unwrap();

        let mut record = sample_record();
        record.checksum = Some("new".to_owned());
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap().checksum.as_deref(), Some("new"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::for_document(&dir.path().join("post.md"), true);
        store.save(&sample_record()).unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::for_document(&dir.path().join("post.md"), false);
        store.save(&sample_record()).unwrap();

        RecordStore::for_document(&dir.path().join("post.md"), true)
            .delete()
            .unwrap();
        assert!(store.exists());

        store.delete().unwrap();
        assert!(!store.exists());
        store.delete().unwrap();
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::for_document(&dir.path().join("post.md"), false);
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(CacheError::Parse { .. })));
    }

    #[test]
    fn test_old_version_migrated() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::for_document(&dir.path().join("post.md"), false);
        std::fs::write(store.path(), r#"{"version": 1, "id": "9"}"#).unwrap();
        let record = store.load().unwrap();
        assert_eq!(record.version, RECORD_VERSION);
        assert_eq!(record.id.as_deref(), Some("9"));
    }
}
