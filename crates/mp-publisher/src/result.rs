//! Publish result types.

use mp_document::{PostStatus, PostType};

/// What [`Publisher::publish`](crate::Publisher::publish) did with the
/// document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new remote post was created.
    Created,
    /// The existing remote post was updated.
    Updated,
    /// Content unchanged since the last upload.
    Skipped,
}

impl PublishOutcome {
    /// Past-tense verb for messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
        }
    }
}

/// Result of publishing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub outcome: PublishOutcome,
    /// Remote post id. `None` only for a dry-run create.
    pub id: Option<String>,
    /// Permalink reported by the server.
    pub url: Option<String>,
    pub title: String,
    pub status: PostStatus,
    pub post_type: PostType,
    /// Number of media files uploaded (or that would be, on dry run).
    pub media_uploaded: usize,
}

/// Result of assigning categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryResult {
    pub id: String,
    /// Category names now assigned to the post.
    pub categories: Vec<String>,
    /// Categories created on the blog along the way.
    pub created: Vec<String>,
}
