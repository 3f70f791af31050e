//! WordPress XML-RPC client for markpress.
//!
//! This crate talks to the `wp.*` XML-RPC API of a WordPress site:
//!
//! - [`BlogApi`] trait with the post, category and media operations
//!   the publisher needs
//! - [`WordPressClient`] implementation over HTTP (sync, `ureq`)
//! - [`MockBlog`] for testing (behind `mock` feature flag)
//! - [`xmlrpc`] value model with request encoding and response parsing
//!
//! # Example
//!
//! ```ignore
//! use mp_wordpress::{BlogApi, PostFilter, WordPressClient};
//!
//! let client = WordPressClient::from_site(&site)?;
//! let posts = client.get_posts(&PostFilter { post_type: "post".into(), number: 10 })?;
//! for post in posts {
//!     println!("{} {}", post.id, post.title);
//! }
//! ```

mod api;
mod client;
mod error;
#[cfg(feature = "mock")]
mod mock;
mod types;
pub mod xmlrpc;

pub use api::BlogApi;
pub use client::{WordPressClient, xmlrpc_endpoint};
pub use error::ApiError;
#[cfg(feature = "mock")]
pub use mock::MockBlog;
pub use types::{
    MediaUpload, Post, PostContent, PostFilter, Term, UploadedFile, parse_timestamp,
};
