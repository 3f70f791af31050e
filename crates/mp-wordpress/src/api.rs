//! Blog API abstraction.

use crate::error::ApiError;
use crate::types::{MediaUpload, Post, PostContent, PostFilter, Term, UploadedFile};

/// Remote operations the publisher needs from a blog.
///
/// Implemented by [`WordPressClient`](crate::WordPressClient) over XML-RPC
/// and, with the `mock` feature, by an in-memory `MockBlog` for tests.
pub trait BlogApi {
    /// Create a post and return its id.
    fn new_post(&self, content: &PostContent) -> Result<String, ApiError>;

    /// Update fields of an existing post.
    fn edit_post(&self, id: &str, content: &PostContent) -> Result<bool, ApiError>;

    fn get_post(&self, id: &str) -> Result<Post, ApiError>;

    /// Most recent posts matching `filter`, newest first.
    fn get_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ApiError>;

    fn delete_post(&self, id: &str) -> Result<bool, ApiError>;

    /// All categories defined on the blog.
    fn get_categories(&self) -> Result<Vec<Term>, ApiError>;

    /// Create a category and return its id.
    fn new_category(&self, name: &str) -> Result<String, ApiError>;

    fn upload_file(&self, upload: &MediaUpload) -> Result<UploadedFile, ApiError>;
}
