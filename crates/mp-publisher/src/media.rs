//! Media upload and URL rewriting.
//!
//! Local files referenced from `<a href>` and `<img src>` are uploaded to the
//! blog and the references rewritten to the remote URLs. Upload state lives
//! in the document's [`PublishRecord`], so unchanged files are uploaded once.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use mp_cache::{PublishRecord, checksum_file, needs_upload};
use mp_wordpress::{BlogApi, MediaUpload};
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::error::PublishError;

/// File extensions treated as uploadable media.
///
/// Not every WordPress install accepts all of them; the server answers
/// "Invalid file type" for the rest.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "gif", "jpg", "jpeg", "png", "svg", "webp", "pdf", "doc", "docx", "odt", "mp3", "ogg", "wav",
    "m4a", "mp4", "mov", "wmv", "avi", "mpg",
];

static MEDIA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(?P<tag>a\b[^>]* href|img\b[^>]* src)="(?P<src>[^"]+)""#).unwrap()
});

/// Result of media processing.
#[derive(Debug, Default)]
pub struct MediaResult {
    /// HTML with rewritten media URLs.
    pub html: String,
    /// Number of files uploaded.
    pub uploaded: usize,
}

/// Uploads media referenced from rendered HTML.
pub struct MediaProcessor<'a> {
    blog: &'a dyn BlogApi,
    media_dir: PathBuf,
    force: bool,
    dry_run: bool,
}

impl<'a> MediaProcessor<'a> {
    /// Create a processor resolving relative references against `media_dir`.
    #[must_use]
    pub fn new(blog: &'a dyn BlogApi, media_dir: PathBuf) -> Self {
        Self {
            blog,
            media_dir,
            force: false,
            dry_run: false,
        }
    }

    /// Upload files even when their checksum is unchanged.
    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Record placeholder URLs instead of uploading.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Upload changed media and rewrite references in `html`.
    ///
    /// `record` is updated as files are uploaded. When an upload fails, the
    /// entries of files uploaded before it are already in `record`.
    pub fn process(
        &self,
        html: &str,
        record: &mut PublishRecord,
    ) -> Result<MediaResult, PublishError> {
        let mut result = MediaResult {
            html: String::with_capacity(html.len()),
            uploaded: 0,
        };
        let mut last = 0;

        for caps in MEDIA_RE.captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            let src = &caps["src"];
            let Some(url) = self.resolve(src, record, &mut result.uploaded)? else {
                continue;
            };
            result.html.push_str(&html[last..whole.start()]);
            result.html.push_str(&rewrite(&caps, &url));
            last = whole.end();
        }
        result.html.push_str(&html[last..]);
        Ok(result)
    }

    /// Remote URL for `src`, or `None` to leave the reference untouched.
    fn resolve(
        &self,
        src: &str,
        record: &mut PublishRecord,
        uploaded: &mut usize,
    ) -> Result<Option<String>, PublishError> {
        if src.starts_with("data:") {
            return Ok(None);
        }
        // Converters percent-encode spaces and non-ASCII characters.
        let name = percent_decode_str(src).decode_utf8_lossy();
        if !is_media(&name) {
            return Ok(None);
        }
        let file = self.media_dir.join(name.as_ref());

        if !file.is_file() {
            return match record.media(&file).and_then(|m| m.url.clone()) {
                Some(url) => {
                    warn!("missing media file: {}", file.display());
                    Ok(Some(url))
                }
                None => {
                    warn!("media file not found, leaving reference: {}", file.display());
                    Ok(None)
                }
            };
        }

        let checksum = checksum_file(&file)?;
        let entry = record.media_entry(&file);
        if !needs_upload(entry.checksum.as_deref(), &checksum, self.force) {
            debug!("skipping unmodified media: {}", file.display());
            return Ok(Some(entry.url.clone().unwrap_or_else(|| src.to_owned())));
        }

        let url = if self.dry_run {
            info!("dry run: would upload {}", file.display());
            src.to_owned()
        } else {
            self.upload(&file)?
        };
        entry.url = Some(url.clone());
        entry.checksum = Some(checksum);
        *uploaded += 1;
        Ok(Some(url))
    }

    fn upload(&self, file: &Path) -> Result<String, PublishError> {
        let bits = std::fs::read(file).map_err(|source| PublishError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(file)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        info!("uploading media: {}", file.display());
        let uploaded = self.blog.upload_file(&MediaUpload {
            name,
            mime_type,
            bits,
            overwrite: true,
        })?;
        debug!("media url: {}", uploaded.url);
        Ok(uploaded.url)
    }
}

fn is_media(src: &str) -> bool {
    Path::new(src)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            MEDIA_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn rewrite(caps: &Captures<'_>, url: &str) -> String {
    format!("<{}=\"{url}\"", &caps["tag"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_wordpress::MockBlog;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const URL: &str = "https://blog.example.com/wp-content/uploads";

    #[test]
    fn test_is_media() {
        assert!(is_media("img/a.PNG"));
        assert!(is_media("doc.pdf"));
        assert!(!is_media("page.html"));
        assert!(!is_media("noext"));
    }

    #[test]
    fn test_rewrites_and_uploads() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"png").unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();

        let html = r#"<p><img alt="x" src="a.png"> <a href="https://example.com/">x</a></p>"#;
        let result = MediaProcessor::new(&blog, dir.path().to_path_buf())
            .process(html, &mut record)
            .unwrap();

        assert_eq!(
            result.html,
            format!(r#"<p><img alt="x" src="{URL}/a.png"> <a href="https://example.com/">x</a></p>"#)
        );
        assert_eq!(result.uploaded, 1);
        assert_eq!(blog.uploads()[0].mime_type, "image/png");
        let entry = record.media(&dir.path().join("a.png")).unwrap();
        assert_eq!(entry.url.as_deref(), Some(format!("{URL}/a.png").as_str()));
        assert!(entry.checksum.is_some());
    }

    #[test]
    fn test_unchanged_media_not_uploaded_again() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"png").unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();
        let processor = MediaProcessor::new(&blog, dir.path().to_path_buf());

        processor.process(r#"<img src="a.png">"#, &mut record).unwrap();
        let again = processor.process(r#"<img src="a.png">"#, &mut record).unwrap();

        assert_eq!(again.uploaded, 0);
        assert_eq!(again.html, format!(r#"<img src="{URL}/a.png">"#));
        assert_eq!(blog.uploads().len(), 1);
    }

    #[test]
    fn test_changed_media_uploaded_once() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"v1").unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();
        let processor = MediaProcessor::new(&blog, dir.path().to_path_buf());

        processor.process(r#"<img src="a.png">"#, &mut record).unwrap();
        let first = record.media(&file).unwrap().checksum.clone();

        std::fs::write(&file, b"v2").unwrap();
        let result = processor.process(r#"<img src="a.png">"#, &mut record).unwrap();

        assert_eq!(result.uploaded, 1);
        assert_eq!(blog.uploads().len(), 2);
        assert_eq!(blog.uploads()[1].bits, b"v2".to_vec());
        assert_ne!(record.media(&file).unwrap().checksum, first);
    }

    #[test]
    fn test_force_reuploads() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"png").unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();
        let processor = MediaProcessor::new(&blog, dir.path().to_path_buf()).force(true);

        processor.process(r#"<img src="a.png">"#, &mut record).unwrap();
        processor.process(r#"<img src="a.png">"#, &mut record).unwrap();
        assert_eq!(blog.uploads().len(), 2);
    }

    #[test]
    fn test_missing_file_reuses_recorded_url() {
        let dir = TempDir::new().unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();
        record.media_entry(&dir.path().join("gone.png")).url = Some(format!("{URL}/gone.png"));

        let result = MediaProcessor::new(&blog, dir.path().to_path_buf())
            .process(r#"<img src="gone.png"><img src="never.png">"#, &mut record)
            .unwrap();

        assert_eq!(
            result.html,
            format!(r#"<img src="{URL}/gone.png"><img src="never.png">"#)
        );
        assert!(blog.uploads().is_empty());
    }

    #[test]
    fn test_data_uri_and_non_media_untouched() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();
        let html = r#"<img src="data:image/png;base64,AAAA"><a href="notes.txt">n</a>"#;

        let result = MediaProcessor::new(&blog, dir.path().to_path_buf())
            .process(html, &mut record)
            .unwrap();
        assert_eq!(result.html, html);
        assert!(record.media.is_empty());
    }

    #[test]
    fn test_dry_run_records_placeholder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"png").unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();

        let result = MediaProcessor::new(&blog, dir.path().to_path_buf())
            .dry_run(true)
            .process(r#"<img src="a.png">"#, &mut record)
            .unwrap();

        assert_eq!(result.html, r#"<img src="a.png">"#);
        assert_eq!(result.uploaded, 1);
        assert!(blog.calls().is_empty());
        assert_eq!(
            record.media(&dir.path().join("a.png")).unwrap().url.as_deref(),
            Some("a.png")
        );
    }

    #[test]
    fn test_failed_upload_keeps_earlier_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        let blog = MockBlog::new().with_failing_upload("b.png");
        let mut record = PublishRecord::default();

        let result = MediaProcessor::new(&blog, dir.path().to_path_buf())
            .process(r#"<img src="a.png"><img src="b.png">"#, &mut record);

        assert!(matches!(result, Err(PublishError::Api(_))));
        assert!(record.media(&dir.path().join("a.png")).unwrap().url.is_some());
        assert!(record.media(&dir.path().join("b.png")).unwrap().url.is_none());
    }

    #[test]
    fn test_percent_encoded_names_resolved() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("图片.png"), b"a").unwrap();
        std::fs::write(dir.path().join("my pic.png"), b"b").unwrap();
        let blog = MockBlog::new();
        let mut record = PublishRecord::default();

        let html = r#"<img src="%E5%9B%BE%E7%89%87.png"><img src="my%20pic.png">"#;
        let result = MediaProcessor::new(&blog, dir.path().to_path_buf())
            .process(html, &mut record)
            .unwrap();

        assert_eq!(result.uploaded, 2);
        let names: Vec<_> = blog.uploads().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["图片.png".to_owned(), "my pic.png".to_owned()]);
        assert_eq!(
            result.html,
            format!(r#"<img src="{URL}/图片.png"><img src="{URL}/my pic.png">"#)
        );
        assert!(record.media(&dir.path().join("my pic.png")).is_some());
    }
}
