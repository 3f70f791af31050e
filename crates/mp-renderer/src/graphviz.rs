//! GraphViz diagram blocks.
//!
//! Code blocks tagged `viz-ENGINE` (for example ` ```viz-dot `) are replaced
//! by the SVG the GraphViz `ENGINE` program produces.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::ConvertError;
use crate::process::run_filter;
use crate::util::{escape_html, unescape_html};

/// Supported GraphViz layout programs.
pub const ENGINES: &[&str] = &["dot", "circo", "neato", "osage", "twopi"];

static VIZ_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<pre><code class="(?:language-)?viz-(dot|circo|neato|osage|twopi)">(.*?)</code></pre>"#,
    )
    .unwrap()
});

static SVG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<svg\b.*</svg>").unwrap());

/// Renders `viz-*` code blocks to inline SVG.
#[derive(Debug, Clone, Default)]
pub struct GraphvizProcessor {
    search_dir: Option<PathBuf>,
}

impl GraphvizProcessor {
    /// `search_dir` is tried before `PATH` when locating engines.
    #[must_use]
    pub fn new(search_dir: Option<PathBuf>) -> Self {
        Self { search_dir }
    }

    /// Replace every GraphViz block in `html`.
    ///
    /// A block that fails to render is replaced by a code block holding the
    /// error text so the rest of the document still publishes.
    #[must_use]
    pub fn process(&self, html: &str) -> String {
        if !html.contains("viz-") {
            return html.to_owned();
        }
        VIZ_BLOCK_RE
            .replace_all(html, |caps: &Captures<'_>| {
                let engine = &caps[1];
                let source = unescape_html(&caps[2]);
                match self.render(engine, &source) {
                    Ok(svg) => format!(r#"<pre style="background:none; border:0px;">{svg}</pre>"#),
                    Err(e) => {
                        tracing::warn!(engine, error = %e, "GraphViz rendering failed");
                        format!("<pre><code>{}</code></pre>", escape_html(&e.to_string()))
                    }
                }
            })
            .into_owned()
    }

    fn render(&self, engine: &str, source: &str) -> Result<String, ConvertError> {
        let program = self.locate(engine)?;
        let output = run_filter(&program, &["-Tsvg"], source.as_bytes())?;
        // Drop the XML prolog and DOCTYPE; only the <svg> element is embeddable.
        Ok(SVG_RE
            .find(&output)
            .map_or(output.as_str(), |m| m.as_str())
            .to_owned())
    }

    fn locate(&self, engine: &str) -> Result<PathBuf, ConvertError> {
        if let Some(dir) = self.search_dir.as_deref().filter(|d| d.is_dir())
            && let Ok(path) = which::which_in(engine, Some(dir), Path::new("."))
        {
            return Ok(path);
        }
        crate::process::locate(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_viz_blocks_untouched() {
        let html = r#"<pre><code class="python">print(1)</code></pre>"#;
        assert_eq!(GraphvizProcessor::default().process(html), html);
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_from_search_dir() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let fake = tmp.path().join("circo");
        std::fs::write(
            &fake,
            "#!/bin/sh\ncat >/dev/null\necho '<?xml version=\"1.0\"?>'\necho '<svg width=\"1\"><g/></svg>'\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let html = "<p>x</p>\n<pre><code class=\"viz-circo\">graph { a -- b }</code></pre>\n";
        let out = GraphvizProcessor::new(Some(tmp.path().to_path_buf())).process(html);

        assert_eq!(
            out,
            "<p>x</p>\n<pre style=\"background:none; border:0px;\"><svg width=\"1\"><g/></svg></pre>\n"
        );
    }

    #[test]
    fn test_failed_render_becomes_error_block() {
        if which::which("osage").is_ok() {
            return;
        }
        let processor = GraphvizProcessor::new(Some(PathBuf::from("/nonexistent")));
        let html = r#"<pre><code class="language-viz-osage">digraph { a -> b }</code></pre>"#;
        let out = processor.process(html);
        assert_eq!(out, "<pre><code>osage not found on PATH</code></pre>");
    }
}
