//! WordPress API request and response types.

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::error::ApiError;
use crate::xmlrpc::Value;

/// Date format WordPress uses for `dateTime.iso8601` values.
const XMLRPC_DATE_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// Post fields sent with `wp.newPost` / `wp.editPost`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostContent {
    pub title: Option<String>,
    pub content: Option<String>,
    /// WordPress `post_status` (`draft`, `private`, `publish`).
    pub status: Option<String>,
    /// WordPress `post_type` (`post`, `page`).
    pub post_type: Option<String>,
    /// URL slug (`post_name`).
    pub slug: Option<String>,
    /// Publication date, UTC.
    pub date: Option<NaiveDateTime>,
    /// Category names, created on the server when missing.
    pub categories: Option<Vec<String>>,
    /// Tag names, created on the server when missing.
    pub tags: Option<Vec<String>>,
    /// Category ids; replaces all categories of the post.
    pub category_ids: Option<Vec<String>>,
}

impl PostContent {
    pub(crate) fn to_value(&self) -> Value {
        let mut members: Vec<(&str, Value)> = Vec::new();
        let mut push = |name, value: &Option<String>| {
            if let Some(v) = value {
                members.push((name, Value::from(v.as_str())));
            }
        };
        push("post_title", &self.title);
        push("post_content", &self.content);
        push("post_status", &self.status);
        push("post_type", &self.post_type);
        push("post_name", &self.slug);
        if let Some(date) = self.date {
            members.push((
                "post_date_gmt",
                Value::DateTime(date.format(XMLRPC_DATE_FORMAT).to_string()),
            ));
        }

        let mut names: Vec<(&str, Value)> = Vec::new();
        if let Some(categories) = &self.categories {
            names.push(("category", Value::from(categories.clone())));
        }
        if let Some(tags) = &self.tags {
            names.push(("post_tag", Value::from(tags.clone())));
        }
        if !names.is_empty() {
            members.push(("terms_names", Value::structure(names)));
        }
        if let Some(ids) = &self.category_ids {
            let ids = ids
                .iter()
                .map(|id| id.parse::<i64>().map_or_else(|_| Value::from(id.as_str()), Value::Int))
                .collect();
            members.push((
                "terms",
                Value::structure([("category", Value::Array(ids))]),
            ));
        }
        Value::structure(members)
    }
}

/// Post as returned by `wp.getPost` / `wp.getPosts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Permalink.
    pub link: String,
    pub status: String,
    pub post_type: String,
    /// Creation time, seconds since the epoch (UTC).
    pub created_at: Option<i64>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl Post {
    pub(crate) fn from_value(value: &Value) -> Result<Self, ApiError> {
        let text = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let id = value
            .get("post_id")
            .and_then(Value::as_id)
            .ok_or_else(|| ApiError::Malformed("post without post_id".to_owned()))?;

        let mut categories = Vec::new();
        let mut tags = Vec::new();
        for term in value.get("terms").and_then(Value::as_array).unwrap_or_default() {
            let name = term.get("name").and_then(Value::as_str).unwrap_or_default();
            match term.get("taxonomy").and_then(Value::as_str) {
                Some("category") => categories.push(name.to_owned()),
                Some("post_tag") => tags.push(name.to_owned()),
                _ => {}
            }
        }

        Ok(Self {
            id,
            title: text("post_title"),
            link: text("link"),
            status: text("post_status"),
            post_type: text("post_type"),
            created_at: value
                .get("post_date_gmt")
                .or_else(|| value.get("post_date"))
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            categories,
            tags,
        })
    }
}

/// Parse a WordPress `dateTime.iso8601` value into epoch seconds.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<i64> {
    const FORMATS: &[&str] = &[XMLRPC_DATE_FORMAT, "%Y%m%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
        // WordPress reports unpublished drafts as 0000-00-00, which fails above.
        .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
}

/// Query for `wp.getPosts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub post_type: String,
    pub number: u32,
}

impl PostFilter {
    pub(crate) fn to_value(&self) -> Value {
        Value::structure([
            ("post_type", Value::from(self.post_type.as_str())),
            ("number", Value::from(self.number)),
            ("orderby", Value::from("post_date")),
            ("order", Value::from("DESC")),
        ])
    }
}

/// Taxonomy term (category).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: String,
    pub name: String,
}

impl Term {
    pub(crate) fn from_value(value: &Value) -> Result<Self, ApiError> {
        Ok(Self {
            id: value
                .get("term_id")
                .and_then(Value::as_id)
                .ok_or_else(|| ApiError::Malformed("term without term_id".to_owned()))?,
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        })
    }
}

/// File sent with `wp.uploadFile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// File name on the server.
    pub name: String,
    pub mime_type: String,
    pub bits: Vec<u8>,
    /// Replace an existing file with the same name.
    pub overwrite: bool,
}

impl MediaUpload {
    pub(crate) fn to_value(&self) -> Value {
        Value::structure([
            ("name", Value::from(self.name.as_str())),
            ("type", Value::from(self.mime_type.as_str())),
            ("bits", Value::Base64(self.bits.clone())),
            ("overwrite", Value::from(self.overwrite)),
        ])
    }
}

/// Result of `wp.uploadFile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: String,
    pub file: String,
    pub url: String,
    pub mime_type: String,
}

impl UploadedFile {
    pub(crate) fn from_value(value: &Value) -> Result<Self, ApiError> {
        let text = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let url = text("url");
        if url.is_empty() {
            return Err(ApiError::Malformed("upload response without url".to_owned()));
        }
        Ok(Self {
            id: value
                .get("id")
                .or_else(|| value.get("attachment_id"))
                .and_then(Value::as_id)
                .unwrap_or_default(),
            file: text("file"),
            url,
            mime_type: text("type"),
        })
    }
}
