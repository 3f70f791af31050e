//! Markdown engine selection.

use std::fmt;

/// Markdown conversion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Built-in converter with the fenced code rewrite.
    Default,
    /// Native pulldown-cmark renderer with heading anchors.
    Markdown,
    /// External `pandoc` process.
    Pandoc,
}

impl Engine {
    /// Resolve a configured engine name.
    ///
    /// Names are case-insensitive. `auto` picks [`Engine::Markdown`] when the
    /// `extended` feature is compiled in. Unknown names fall back to
    /// [`Engine::Default`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "default" | "native" | "markdown2" | "0" => Self::Default,
            "markdown" => Self::Markdown,
            "pandoc" => Self::Pandoc,
            "auto" => {
                if cfg!(feature = "extended") {
                    Self::Markdown
                } else {
                    Self::Default
                }
            }
            other => {
                tracing::debug!("unknown engine {other:?}, using default");
                Self::Default
            }
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Markdown => "markdown",
            Self::Pandoc => "pandoc",
        })
    }
}
