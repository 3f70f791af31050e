//! Adjustments that make converter output play well with WordPress.

use std::sync::LazyLock;

use regex::Regex;

static H1_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<h1[^>]*>.*</h1>$").unwrap());
static MORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!--\s*more\s*-->").unwrap());

/// Remove line breaks that WordPress would turn into `<br />` tags.
///
/// Lines are trimmed and joined with single spaces, except inside
/// `<pre>` blocks and `src="data:` attribute runs, which are copied
/// verbatim. A leading `<h1>` line is dropped since WordPress renders the
/// post title itself.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut lines = html.split_inclusive('\n');
    let mut first = true;

    while let Some(line) = lines.next() {
        if first && H1_LINE_RE.is_match(line.trim()) {
            first = false;
            continue;
        }
        first = false;

        if line.starts_with("<pre") {
            result.push(' ');
            copy_until(&mut result, line, &mut lines, |l| l.contains("</pre>"));
        } else if line.starts_with("src=\"data:") {
            result.push(' ');
            copy_until(&mut result, line, &mut lines, |l| l.trim().ends_with("\">"));
        } else {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                result.push(' ');
                result.push_str(trimmed);
            }
        }
    }

    result.trim_start().to_owned()
}

/// Copy `line` and the following lines verbatim up to and including the first
/// line accepted by `is_last`.
fn copy_until<'a, I, F>(result: &mut String, line: &'a str, lines: &mut I, is_last: F)
where
    I: Iterator<Item = &'a str>,
    F: Fn(&str) -> bool,
{
    let mut current = Some(line);
    while let Some(line) = current {
        result.push_str(line);
        if is_last(line) {
            return;
        }
        current = lines.next();
    }
}

/// Split HTML at the first `<!--more-->` comment (whitespace inside the
/// comment is allowed). Returns the intro and, if present, the rest.
#[must_use]
pub fn split_more(html: &str) -> (&str, Option<&str>) {
    match MORE_RE.find(html) {
        Some(m) => (&html[..m.start()], Some(&html[m.end()..])),
        None => (html, None),
    }
}

/// Rewrite the first more-comment in its canonical `<!--more-->` form, which
/// is the only spelling WordPress recognizes.
#[must_use]
pub fn normalize_more(html: &str) -> String {
    match split_more(html) {
        (intro, Some(rest)) => format!("{intro}<!--more-->{rest}"),
        (intro, None) => intro.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_joins_lines() {
        let html = "<p>Hello\nworld</p>\n<ul>\n  <li>a</li>\n</ul>\n";
        assert_eq!(sanitize_html(html), "<p>Hello world</p> <ul> <li>a</li> </ul>");
    }

    #[test]
    fn test_sanitize_keeps_pre_blocks() {
        let html = "<p>x</p>\n<pre><code>a\n  b\n</code></pre>\n<p>y</p>\n";
        assert_eq!(
            sanitize_html(html),
            "<p>x</p> <pre><code>a\n  b\n</code></pre>\n <p>y</p>"
        );
    }

    #[test]
    fn test_sanitize_drops_leading_h1() {
        assert_eq!(sanitize_html("<h1>Title</h1>\n<p>x</p>\n"), "<p>x</p>");
        assert_eq!(
            sanitize_html("<p>x</p>\n<h1>Later</h1>\n"),
            "<p>x</p> <h1>Later</h1>"
        );
    }

    #[test]
    fn test_sanitize_keeps_data_uri_runs() {
        let html = "<img\nsrc=\"data:image/png;base64,AAAA\nBBBB\">\n<p>z</p>\n";
        assert_eq!(
            sanitize_html(html),
            "<img src=\"data:image/png;base64,AAAA\nBBBB\">\n <p>z</p>"
        );
    }

    #[test]
    fn test_sanitize_unterminated_pre() {
        assert_eq!(sanitize_html("<pre>a\nb"), "<pre>a\nb");
    }

    #[test]
    fn test_split_more() {
        assert_eq!(split_more("a<!-- more -->b"), ("a", Some("b")));
        assert_eq!(split_more("a<!--more-->b<!--more-->c"), ("a", Some("b<!--more-->c")));
        assert_eq!(split_more("plain"), ("plain", None));
    }

    #[test]
    fn test_normalize_more() {
        assert_eq!(normalize_more("<p>a</p>\n<!--  more  -->\n<p>b</p>"), "<p>a</p>\n<!--more-->\n<p>b</p>");
    }
}
