//! Source documents for markpress.
//!
//! A [`Document`] is a local Markdown, AsciiDoc, or HTML file together with
//! the metadata found in its front matter (and, for AsciiDoc, in
//! `:blogpost-NAME:` attribute lines). Documents are parsed fresh on every
//! run and never persisted.

mod attributes;
mod frontmatter;
mod types;

pub use attributes::{Attribute, PARAMETER_NAMES, asciidoc_title, scan_attributes};
pub use frontmatter::{FrontMatter, clear_value, parse_front_matter, parse_list};
pub use types::{DocType, ParseValueError, PostStatus, PostType};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

/// Source markup of a document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Markdown,
    AsciiDoc,
    Html,
}

impl DocFormat {
    /// Detect the format from a path's extension. Unknown extensions are
    /// treated as Markdown.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("adoc" | "asciidoc" | "asc" | "txt") => Self::AsciiDoc,
            Some("html" | "htm") => Self::Html,
            _ => Self::Markdown,
        }
    }
}

/// Error type for document loading.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: not valid UTF-8", .0.display())]
    Encoding(PathBuf),

    #[error("{file}: line {line}: {message}")]
    InvalidValue {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{file}: missing required attribute: {name}")]
    MissingParameter { file: String, name: String },

    #[error("illegal mandatory parameter name: {0}")]
    IllegalParameter(String),
}

/// A parsed source document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Full text with any byte order mark removed.
    pub text: String,
    pub format: DocFormat,
    /// Raw metadata (front matter plus AsciiDoc attributes).
    pub metadata: HashMap<String, String>,
    /// Text after the metadata block.
    pub body: String,
    /// SHA-256 of the file bytes, lowercase hex.
    pub checksum: String,
    /// Remote post identifier (`uuid` or `id` key).
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<PostStatus>,
    pub post_type: Option<PostType>,
    pub doctype: Option<DocType>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub slug: Option<String>,
    pub date: Option<NaiveDateTime>,
}

impl Document {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        if !path.is_file() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }
        let path = std::path::absolute(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes = std::fs::read(&path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        let checksum = checksum_bytes(&bytes);
        let text = String::from_utf8(bytes).map_err(|_| DocumentError::Encoding(path.clone()))?;
        let mut doc = Self::parse(path, &text)?;
        doc.checksum = checksum;
        Ok(doc)
    }

    /// Parse document text. `path` selects the format and names the file in
    /// error messages; it is not read.
    pub fn parse(path: PathBuf, text: &str) -> Result<Self, DocumentError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text).to_owned();
        let format = DocFormat::from_path(&path);
        let file_name = display_name(&path);

        let FrontMatter {
            mut metadata,
            mut key_lines,
            body,
        } = parse_front_matter(&text);

        if format == DocFormat::AsciiDoc {
            for attr in scan_attributes(&text) {
                if !attr.is_known() {
                    tracing::warn!(
                        "{file_name}: line {}: invalid attribute name: blogpost-{}",
                        attr.line,
                        attr.name
                    );
                    continue;
                }
                key_lines.insert(attr.name.clone(), attr.line);
                metadata.insert(attr.name, attr.value);
            }
        }

        let field = |key: &str| {
            metadata
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let invalid = |key: &str, message: String| DocumentError::InvalidValue {
            file: file_name.clone(),
            line: key_lines.get(key).copied().unwrap_or(1),
            message,
        };

        let (id_key, id) = match (field("uuid"), field("id")) {
            (Some(v), _) => ("uuid", Some(v)),
            (None, v) => ("id", v),
        };
        if let Some(id) = id
            && !id.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid(id_key, format!("invalid uuid {id}")));
        }

        let status = field("status")
            .map(str::parse::<PostStatus>)
            .transpose()
            .map_err(|e| invalid("status", e.to_string()))?;
        let type_key = if field("posttype").is_some() { "posttype" } else { "type" };
        let post_type = field(type_key)
            .map(str::parse::<PostType>)
            .transpose()
            .map_err(|e| invalid(type_key, e.to_string()))?;
        let doctype = field("doctype")
            .map(str::parse::<DocType>)
            .transpose()
            .map_err(|e| invalid("doctype", e.to_string()))?;
        let date = field("date")
            .map(|v| parse_date(v).ok_or_else(|| invalid("date", format!("invalid date {v}"))))
            .transpose()?;

        let mut title = field("title").map(ToOwned::to_owned);
        if title.is_none() && format == DocFormat::AsciiDoc {
            title = asciidoc_title(&body);
        }

        Ok(Self {
            id: id.map(ToOwned::to_owned),
            title,
            status,
            post_type,
            doctype,
            categories: metadata.get("categories").and_then(|v| parse_list(v)),
            tags: metadata.get("tags").and_then(|v| parse_list(v)),
            slug: field("slug").map(ToOwned::to_owned),
            date,
            checksum: checksum_bytes(text.as_bytes()),
            path,
            text,
            format,
            metadata,
            body,
        })
    }

    /// File name used in diagnostics.
    #[must_use]
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }

    /// Directory containing the document.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Ensure every parameter in `names` is present.
    ///
    /// Names must come from [`PARAMETER_NAMES`].
    pub fn check_mandatory<S: AsRef<str>>(&self, names: &[S]) -> Result<(), DocumentError> {
        for name in names {
            let name = name.as_ref().trim();
            let present = match name {
                "title" => self.title.is_some(),
                "status" => self.status.is_some(),
                "doctype" => self.doctype.is_some(),
                "posttype" => self.post_type.is_some(),
                "categories" => self.categories.is_some(),
                _ => return Err(DocumentError::IllegalParameter(name.to_owned())),
            };
            if !present {
                return Err(DocumentError::MissingParameter {
                    file: self.file_name(),
                    name: name.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// SHA-256 of `bytes` as lowercase hex.
#[must_use]
pub fn checksum_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` and RFC 3339 timestamps.
fn parse_date(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
