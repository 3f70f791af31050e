//! Standalone HTML pages for local preview.

use std::fmt::Write;

use mp_config::PageTemplates;

use crate::util::escape_html;

/// Wrap rendered `html` in a complete page.
///
/// The body sits between `<!--markdown start-->` and `<!--markdown endup-->`
/// markers so tooling can extract it again.
#[must_use]
pub fn standalone_page(html: &str, title: Option<&str>, templates: &PageTemplates) -> String {
    let mut out = String::with_capacity(html.len() + 512);
    out.push_str("<html>\n<head>\n<meta charset=\"UTF-8\" />\n");
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    }
    if !templates.style.is_empty() {
        out.push_str("<style type=\"text/css\">\n");
        out.push_str(&templates.style);
        out.push_str("\n</style>\n");
    }
    if !templates.header.is_empty() {
        out.push_str(&templates.header);
        out.push('\n');
    }
    out.push_str("</head>\n\n<body>\n\n<!--markdown start-->\n");
    out.push_str(html);
    out.push_str("\n\n<!--markdown endup-->\n\n");
    if !templates.footer.is_empty() {
        out.push_str(&templates.footer);
        out.push('\n');
    }
    out.push_str("</body>\n\n</html>\n");
    out
}
