//! Enumerated post properties shared by documents and publish records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when an enumerated value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseValueError {
    /// Property being parsed (e.g., "status").
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Saved but not visible.
    #[default]
    #[serde(alias = "unpublished")]
    Draft,
    /// Visible to logged-in editors only.
    Private,
    /// Publicly visible.
    #[serde(alias = "published")]
    Publish,
}

impl PostStatus {
    /// WordPress `post_status` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Private => "private",
            Self::Publish => "publish",
        }
    }
}

impl FromStr for PostStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" | "unpublished" => Ok(Self::Draft),
            "private" => Ok(Self::Private),
            "publish" | "published" => Ok(Self::Publish),
            other => Err(ParseValueError {
                kind: "status",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of WordPress content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    /// Blog post.
    #[default]
    Post,
    /// Static page.
    Page,
}

impl PostType {
    /// WordPress `post_type` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
        }
    }
}

impl FromStr for PostType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "post" => Ok(Self::Post),
            "page" => Ok(Self::Page),
            other => Err(ParseValueError {
                kind: "post type",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AsciiDoc document type passed to the converter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    #[default]
    #[serde(alias = "html")]
    Article,
    Book,
    Manpage,
}

impl DocType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Manpage => "manpage",
        }
    }
}

impl FromStr for DocType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "article" => Ok(Self::Article),
            "book" => Ok(Self::Book),
            "manpage" => Ok(Self::Manpage),
            other => Err(ParseValueError {
                kind: "doctype",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
