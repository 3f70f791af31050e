//! Publishing workflow for markpress.
//!
//! [`Publisher`] ties the other crates together for one document:
//!
//! 1. Load the document and its side-car record
//! 2. Convert the body to HTML
//! 3. Upload changed media and rewrite references ([`MediaProcessor`])
//! 4. Sanitize the HTML for WordPress
//! 5. Create or update the remote post when the content checksum changed
//! 6. Save the side-car record
//!
//! It also deletes posts, assigns categories and lists remote posts.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mp_publisher::{PublishMode, PublishOptions, Publisher};
//! use mp_wordpress::WordPressClient;
//!
//! let client = WordPressClient::from_site(&site)?;
//! let publisher = Publisher::new(&client, &site.render, PublishOptions::default());
//! let result = publisher.publish(Path::new("post.md"), PublishMode::Post)?;
//! println!("{} {}", result.outcome.as_str(), result.id.unwrap_or_default());
//! ```

mod categories;
mod error;
mod media;
mod publisher;
mod result;

pub use categories::{CategoryOp, CategorySpec};
pub use error::PublishError;
pub use media::{MEDIA_EXTENSIONS, MediaProcessor, MediaResult};
pub use publisher::{LIST_LIMIT, PublishMode, PublishOptions, Publisher, draft_stub};
pub use result::{CategoryResult, PublishOutcome, PublishResult};
