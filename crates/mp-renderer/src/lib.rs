//! Document to HTML conversion for markpress.
//!
//! The [`Renderer`] picks a [`Converter`] for each document:
//!
//! | Format   | Converter |
//! |----------|-----------|
//! | Markdown | [`DefaultConverter`], `MarkdownConverter` or [`PandocConverter`], per the configured [`Engine`] |
//! | AsciiDoc | [`AsciidocConverter`] (`asciidoctor`) |
//! | HTML     | [`HtmlConverter`] (pass-through) |
//!
//! After conversion, `viz-*` code blocks are rendered with GraphViz. The
//! [`sanitize_html`] and [`normalize_more`] helpers prepare the result for
//! WordPress, and [`standalone_page`] wraps it for local preview.

mod default;
mod engine;
mod graphviz;
#[cfg(feature = "extended")]
mod markdown;
mod page;
mod process;
mod util;
mod wordpress;

pub use default::{DefaultConverter, rewrite_fenced_code};
pub use engine::Engine;
pub use graphviz::{ENGINES as GRAPHVIZ_ENGINES, GraphvizProcessor};
#[cfg(feature = "extended")]
pub use markdown::MarkdownConverter;
pub use page::standalone_page;
pub use process::{AsciidocConverter, PandocConverter};
pub use util::{escape_html, slugify, unescape_html};
pub use wordpress::{normalize_more, sanitize_html, split_more};

use mp_config::RenderConfig;
use mp_document::{DocFormat, Document};

/// Error type for conversion failures.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{program} not found on PATH")]
    NotFound { program: String },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exits with code {code}: {stderr}")]
    Process {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Converts source text to HTML.
pub trait Converter {
    /// Convert `text` (the document body) to an HTML fragment.
    fn convert(&self, text: &str) -> Result<String, ConvertError>;
}

/// Converter for documents that are already HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter;

impl Converter for HtmlConverter {
    fn convert(&self, text: &str) -> Result<String, ConvertError> {
        Ok(text.to_owned())
    }
}

/// Renders documents according to the site's render configuration.
pub struct Renderer<'a> {
    config: &'a RenderConfig,
    attributes: Vec<String>,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            attributes: Vec::new(),
        }
    }

    /// Extra `NAME[=VALUE]` attributes passed to `asciidoctor`.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Engine used for Markdown documents.
    #[must_use]
    pub fn engine(&self) -> Engine {
        Engine::from_name(&self.config.engine)
    }

    /// Converter for `doc`.
    #[must_use]
    pub fn converter_for(&self, doc: &Document) -> Box<dyn Converter> {
        match doc.format {
            DocFormat::Html => Box::new(HtmlConverter),
            DocFormat::AsciiDoc => Box::new(AsciidocConverter::new(
                doc.doctype.unwrap_or_default(),
                self.attributes.clone(),
            )),
            DocFormat::Markdown => match self.engine() {
                Engine::Default => Box::new(DefaultConverter::new(self.config.tabsize)),
                Engine::Pandoc => Box::new(PandocConverter),
                Engine::Markdown => self.markdown_converter(),
            },
        }
    }

    #[cfg(feature = "extended")]
    #[allow(clippy::unused_self)]
    fn markdown_converter(&self) -> Box<dyn Converter> {
        Box::new(MarkdownConverter)
    }

    #[cfg(not(feature = "extended"))]
    fn markdown_converter(&self) -> Box<dyn Converter> {
        tracing::warn!("markdown engine not compiled in, using default");
        Box::new(DefaultConverter::new(self.config.tabsize))
    }

    /// Convert the document body to HTML and render GraphViz blocks.
    pub fn render(&self, doc: &Document) -> Result<String, ConvertError> {
        tracing::info!(file = %doc.path.display(), "converting");
        let html = self.converter_for(doc).convert(&doc.body)?;
        Ok(GraphvizProcessor::new(self.config.graphviz.clone()).process(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn doc(name: &str, text: &str) -> Document {
        Document::parse(PathBuf::from("/blog").join(name), text).unwrap()
    }

    #[test]
    fn test_render_markdown_body_only() {
        let config = RenderConfig::default();
        let html = Renderer::new(&config)
            .render(&doc("p.md", "---\ntitle: T\n---\n```python\nprint(1)\n```\n"))
            .unwrap();
        assert_eq!(html, "<pre><code class=\"python\">print(1)</code></pre>\n");
    }

    #[test]
    fn test_html_passthrough() {
        let config = RenderConfig::default();
        let html = Renderer::new(&config)
            .render(&doc("p.html", "<div>\nraw\n</div>"))
            .unwrap();
        assert_eq!(html, "<div>\nraw\n</div>");
    }

    #[cfg(feature = "extended")]
    #[test]
    fn test_markdown_engine_selected() {
        let config = RenderConfig {
            engine: "markdown".to_owned(),
            ..RenderConfig::default()
        };
        let html = Renderer::new(&config).render(&doc("p.md", "## Hi\n")).unwrap();
        assert_eq!(html, "<h2 id=\"hi\">Hi</h2>\n");
    }

    #[test]
    fn test_engine_from_config() {
        let config = RenderConfig {
            engine: "pandoc".to_owned(),
            ..RenderConfig::default()
        };
        assert_eq!(Renderer::new(&config).engine(), Engine::Pandoc);
    }
}
