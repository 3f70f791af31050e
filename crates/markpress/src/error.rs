//! CLI error types.

use mp_cache::CacheError;
use mp_config::ConfigError;
use mp_document::DocumentError;
use mp_publisher::PublishError;
use mp_renderer::ConvertError;
use mp_wordpress::ApiError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Validation(String),
}
