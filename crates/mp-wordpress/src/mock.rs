//! Mock blog implementation for testing.
//!
//! Provides [`MockBlog`] for unit testing without a WordPress server.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use crate::api::BlogApi;
use crate::error::ApiError;
use crate::types::{MediaUpload, Post, PostContent, PostFilter, Term, UploadedFile};

/// Base URL used for generated links.
const MOCK_URL: &str = "https://blog.example.com";

/// XML-RPC fault code WordPress returns for unknown posts.
const INVALID_POST_FAULT: i64 = 404;

/// Stored post with its last submitted body.
#[derive(Debug, Clone)]
struct MockPost {
    post: Post,
    content: String,
}

/// In-memory blog for testing.
///
/// Keeps posts, categories and uploaded files in memory and records every
/// call. Use the builder methods to seed data or inject failures.
///
/// # Example
///
/// ```ignore
/// use mp_wordpress::{BlogApi, MockBlog, PostContent};
///
/// let blog = MockBlog::new().with_category("7", "News");
/// let id = blog.new_post(&PostContent::default()).unwrap();
/// assert_eq!(blog.calls(), vec!["wp.newPost"]);
/// ```
#[derive(Debug, Default)]
pub struct MockBlog {
    posts: RwLock<BTreeMap<String, MockPost>>,
    categories: RwLock<Vec<Term>>,
    uploads: RwLock<Vec<MediaUpload>>,
    failing_uploads: RwLock<HashSet<String>>,
    calls: RwLock<Vec<String>>,
    next_id: RwLock<u64>,
    offline: RwLock<bool>,
}

impl MockBlog {
    /// Create an empty mock blog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing post.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_post(self, id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        let post = Post {
            link: link_for(&id),
            title: title.into(),
            status: "draft".to_owned(),
            post_type: "post".to_owned(),
            id: id.clone(),
            ..Post::default()
        };
        self.posts.write().unwrap().insert(
            id,
            MockPost {
                post,
                content: String::new(),
            },
        );
        self
    }

    /// Seed an existing category.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_category(self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.categories.write().unwrap().push(Term {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Make uploads of the given file name fail with an XML-RPC fault.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_upload(self, name: impl Into<String>) -> Self {
        self.failing_uploads.write().unwrap().insert(name.into());
        self
    }

    /// Make every call fail as if the server were unreachable.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn offline(self) -> Self {
        *self.offline.write().unwrap() = true;
        self
    }

    /// Names of the methods called so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Files uploaded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn uploads(&self) -> Vec<MediaUpload> {
        self.uploads.read().unwrap().clone()
    }

    /// Last body submitted for a post.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<String> {
        self.posts
            .read()
            .unwrap()
            .get(id)
            .map(|p| p.content.clone())
    }

    /// Stored post.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn post(&self, id: &str) -> Option<Post> {
        self.posts.read().unwrap().get(id).map(|p| p.post.clone())
    }

    fn record(&self, method: &str) -> Result<(), ApiError> {
        self.calls.write().unwrap().push(method.to_owned());
        if *self.offline.read().unwrap() {
            return Err(ApiError::HttpResponse {
                status: 503,
                body: "Service Unavailable".to_owned(),
            });
        }
        Ok(())
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.write().unwrap();
        *next += 1;
        // Leave room for seeded ids.
        (*next + 100).to_string()
    }

    fn apply(&self, post: &mut MockPost, content: &PostContent) {
        if let Some(title) = &content.title {
            post.post.title.clone_from(title);
        }
        if let Some(body) = &content.content {
            post.content.clone_from(body);
        }
        if let Some(status) = &content.status {
            post.post.status.clone_from(status);
        }
        if let Some(post_type) = &content.post_type {
            post.post.post_type.clone_from(post_type);
        }
        if let Some(date) = content.date {
            post.post.created_at = Some(date.and_utc().timestamp());
        }
        if let Some(categories) = &content.categories {
            post.post.categories.clone_from(categories);
        }
        if let Some(tags) = &content.tags {
            post.post.tags.clone_from(tags);
        }
        if let Some(ids) = &content.category_ids {
            let terms = self.categories.read().unwrap();
            post.post.categories = ids
                .iter()
                .filter_map(|id| terms.iter().find(|t| &t.id == id))
                .map(|t| t.name.clone())
                .collect();
        }
    }
}

fn link_for(id: &str) -> String {
    format!("{MOCK_URL}/?p={id}")
}

fn invalid_post() -> ApiError {
    ApiError::Fault {
        code: INVALID_POST_FAULT,
        message: "Invalid post ID.".to_owned(),
    }
}

impl BlogApi for MockBlog {
    fn new_post(&self, content: &PostContent) -> Result<String, ApiError> {
        self.record("wp.newPost")?;
        let id = self.allocate_id();
        let mut post = MockPost {
            post: Post {
                id: id.clone(),
                link: link_for(&id),
                status: "draft".to_owned(),
                post_type: "post".to_owned(),
                created_at: Some(1_700_000_000),
                ..Post::default()
            },
            content: String::new(),
        };
        self.apply(&mut post, content);
        self.posts.write().unwrap().insert(id.clone(), post);
        Ok(id)
    }

    fn edit_post(&self, id: &str, content: &PostContent) -> Result<bool, ApiError> {
        self.record("wp.editPost")?;
        let mut posts = self.posts.write().unwrap();
        let post = posts.get_mut(id).ok_or_else(invalid_post)?;
        self.apply(post, content);
        Ok(true)
    }

    fn get_post(&self, id: &str) -> Result<Post, ApiError> {
        self.record("wp.getPost")?;
        self.post(id).ok_or_else(invalid_post)
    }

    fn get_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ApiError> {
        self.record("wp.getPosts")?;
        let posts = self.posts.read().unwrap();
        let mut matching: Vec<Post> = posts
            .values()
            .filter(|p| p.post.post_type == filter.post_type)
            .map(|p| p.post.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matching.truncate(filter.number as usize);
        Ok(matching)
    }

    fn delete_post(&self, id: &str) -> Result<bool, ApiError> {
        self.record("wp.deletePost")?;
        self.posts
            .write()
            .unwrap()
            .remove(id)
            .map(|_| true)
            .ok_or_else(invalid_post)
    }

    fn get_categories(&self) -> Result<Vec<Term>, ApiError> {
        self.record("wp.getTerms")?;
        Ok(self.categories.read().unwrap().clone())
    }

    fn new_category(&self, name: &str) -> Result<String, ApiError> {
        self.record("wp.newTerm")?;
        let id = self.allocate_id();
        self.categories.write().unwrap().push(Term {
            id: id.clone(),
            name: name.to_owned(),
        });
        Ok(id)
    }

    fn upload_file(&self, upload: &MediaUpload) -> Result<UploadedFile, ApiError> {
        self.record("wp.uploadFile")?;
        if self.failing_uploads.read().unwrap().contains(&upload.name) {
            return Err(ApiError::Fault {
                code: 500,
                message: format!("Could not write file {}", upload.name),
            });
        }
        let id = self.allocate_id();
        self.uploads.write().unwrap().push(upload.clone());
        Ok(UploadedFile {
            id,
            file: upload.name.clone(),
            url: format!("{MOCK_URL}/wp-content/uploads/{}", upload.name),
            mime_type: upload.mime_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_and_get_post() {
        let blog = MockBlog::new();
        let id = blog
            .new_post(&PostContent {
                title: Some("Hello".to_owned()),
                content: Some("<p>Hi</p>".to_owned()),
                ..PostContent::default()
            })
            .unwrap();
        let post = blog.get_post(&id).unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.link, format!("https://blog.example.com/?p={id}"));
        assert_eq!(blog.content(&id).as_deref(), Some("<p>Hi</p>"));
        assert_eq!(blog.calls(), vec!["wp.newPost", "wp.getPost"]);
    }

    #[test]
    fn test_unknown_post_is_fault() {
        let blog = MockBlog::new();
        assert!(matches!(
            blog.get_post("1"),
            Err(ApiError::Fault { code: 404, .. })
        ));
        assert!(blog.delete_post("1").is_err());
    }

    #[test]
    fn test_category_ids_resolve_to_names() {
        let blog = MockBlog::new()
            .with_post("5", "Seeded")
            .with_category("7", "News");
        blog.edit_post(
            "5",
            &PostContent {
                category_ids: Some(vec!["7".to_owned()]),
                ..PostContent::default()
            },
        )
        .unwrap();
        assert_eq!(blog.post("5").unwrap().categories, vec!["News".to_owned()]);
    }

    #[test]
    fn test_failing_upload() {
        let blog = MockBlog::new().with_failing_upload("a.png");
        let upload = MediaUpload {
            name: "a.png".to_owned(),
            mime_type: "image/png".to_owned(),
            bits: vec![1, 2, 3],
            overwrite: true,
        };
        assert!(blog.upload_file(&upload).is_err());
        assert!(blog.uploads().is_empty());
    }

    #[test]
    fn test_offline() {
        let blog = MockBlog::new().offline();
        assert!(matches!(
            blog.get_categories(),
            Err(ApiError::HttpResponse { status: 503, .. })
        ));
    }
}
