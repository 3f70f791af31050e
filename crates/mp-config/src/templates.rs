//! Page templates for standalone HTML output.

use std::path::Path;

/// Optional fragments inserted into compiled standalone pages.
///
/// Each fragment is read from the configuration directory; a missing or
/// unreadable file yields an empty fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTemplates {
    /// Contents of `style.css`.
    pub style: String,
    /// Contents of `header.html`.
    pub header: String,
    /// Contents of `footer.html`.
    pub footer: String,
}

impl PageTemplates {
    /// Load templates from `dir`.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        Self {
            style: read_fragment(dir, "style.css"),
            header: read_fragment(dir, "header.html"),
            footer: read_fragment(dir, "footer.html"),
        }
    }
}

fn read_fragment(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read page template");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_missing_dir() {
        let templates = PageTemplates::load(Path::new("/nonexistent/markpress"));
        assert_eq!(templates, PageTemplates::default());
    }

    #[test]
    fn test_load_partial() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("style.css"), "body { margin: 0 }").unwrap();
        std::fs::write(tmp.path().join("footer.html"), "<footer/>").unwrap();

        let templates = PageTemplates::load(tmp.path());
        assert_eq!(templates.style, "body { margin: 0 }");
        assert_eq!(templates.header, "");
        assert_eq!(templates.footer, "<footer/>");
    }
}
