//! Error types for publishing.

use std::path::PathBuf;

use mp_cache::CacheError;
use mp_document::DocumentError;
use mp_renderer::ConvertError;
use mp_wordpress::ApiError;

/// Error during publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Document could not be read or has invalid metadata.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Conversion to HTML failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Side-car file could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// WordPress API call failed.
    #[error("WordPress API error: {0}")]
    Api(#[from] ApiError),

    /// `create` on a document that already has a post id.
    #[error("document has been previously posted, use update command")]
    AlreadyPosted,

    /// No post id from the side-car, the document or `--post-id`.
    #[error("missing cache file: specify --post-id instead")]
    MissingCache,

    #[error("missing title: use --title option")]
    MissingTitle,

    /// `-NAME` category spec names a category the blog does not have.
    #[error("no such category: {0}")]
    UnknownCategory(String),

    /// Server answered `false` to a post mutation.
    #[error("failed to {action} post {id}")]
    Rejected { action: &'static str, id: String },

    #[error("missing media directory: {}", .0.display())]
    MediaDir(PathBuf),

    /// Media file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
