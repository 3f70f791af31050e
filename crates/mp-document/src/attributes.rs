//! `:blogpost-NAME: value` attribute lines in AsciiDoc sources.

use std::sync::LazyLock;

use regex::Regex;

static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:blogpost-(?P<name>[-\w]+):\s+(?P<value>.*)").unwrap());

/// Attribute names recognized in AsciiDoc sources.
pub const PARAMETER_NAMES: &[&str] = &["categories", "status", "title", "doctype", "posttype"];

/// A single `:blogpost-NAME: value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    /// 1-based source line.
    pub line: usize,
}

impl Attribute {
    /// Whether the name is one of [`PARAMETER_NAMES`].
    #[must_use]
    pub fn is_known(&self) -> bool {
        PARAMETER_NAMES.contains(&self.name.as_str())
    }
}

/// Collect every blogpost attribute line in `text`, in source order.
#[must_use]
pub fn scan_attributes(text: &str) -> Vec<Attribute> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = ATTRIBUTE_RE.captures(line)?;
            Some(Attribute {
                name: caps["name"].to_owned(),
                value: caps["value"].trim().to_owned(),
                line: idx + 1,
            })
        })
        .collect()
}

/// Title of an AsciiDoc document: the first line that is neither blank nor a
/// `//` comment, with a leading `= ` removed.
#[must_use]
pub fn asciidoc_title(text: &str) -> Option<String> {
    let line = text
        .lines()
        .find(|line| !line.trim().is_empty() && !line.starts_with("//"))?;
    let title = line.trim();
    let title = title.strip_prefix("= ").map_or(title, str::trim);
    if title.is_empty() {
        None
    } else {
        Some(title.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_attributes() {
        let text = "= Title\n:blogpost-status: published\n\ntext\n:blogpost-foo-bar:  x \n";
        let attrs = scan_attributes(text);
        assert_eq!(
            attrs,
            vec![
                Attribute {
                    name: "status".to_owned(),
                    value: "published".to_owned(),
                    line: 2,
                },
                Attribute {
                    name: "foo-bar".to_owned(),
                    value: "x".to_owned(),
                    line: 5,
                },
            ]
        );
        assert!(attrs[0].is_known());
        assert!(!attrs[1].is_known());
    }

    #[test]
    fn test_attribute_needs_value_separator() {
        assert!(scan_attributes(":blogpost-title:\n").is_empty());
        assert!(scan_attributes(" :blogpost-title: x\n").is_empty());
    }

    #[test]
    fn test_asciidoc_title() {
        assert_eq!(
            asciidoc_title("// comment\n\n= My Post\n"),
            Some("My Post".to_owned())
        );
        assert_eq!(asciidoc_title("Plain first line\n"), Some("Plain first line".to_owned()));
        assert_eq!(asciidoc_title("\n// only comments\n"), None);
    }
}
