//! Built-in Markdown converter.
//!
//! Fenced code blocks are rewritten to raw `<pre><code>` HTML before the
//! text reaches the Markdown parser, so their content is never touched by
//! Markdown processing:
//!
//! ````text
//! ```python
//! print(1)
//! ```
//! ````
//!
//! becomes `<pre><code class="python">print(1)</code></pre>`.

use pulldown_cmark::{Options, Parser, html};

use crate::{ConvertError, Converter};

/// Default Markdown converter.
#[derive(Debug, Clone)]
pub struct DefaultConverter {
    tabsize: usize,
}

impl DefaultConverter {
    #[must_use]
    pub fn new(tabsize: usize) -> Self {
        Self {
            tabsize: tabsize.max(1),
        }
    }

    fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
    }
}

impl Converter for DefaultConverter {
    fn convert(&self, text: &str) -> Result<String, ConvertError> {
        let prepared = rewrite_fenced_code(text, self.tabsize);
        let mut output = String::with_capacity(prepared.len() * 3 / 2);
        html::push_html(&mut output, Parser::new_ext(&prepared, Self::parser_options()));
        Ok(output)
    }
}

/// Replace fenced code blocks with literal `<pre><code>` HTML.
///
/// A fence is a line starting with three or more backticks; the remainder of
/// the line is the language tag. The block ends at a line consisting of the
/// same backtick run. Tabs outside code blocks are expanded to `tabsize`
/// columns. An unterminated block is passed through unchanged.
#[must_use]
pub fn rewrite_fenced_code(text: &str, tabsize: usize) -> String {
    let mut output: Vec<String> = Vec::new();
    let mut source: Vec<&str> = Vec::new();
    let mut open: Option<(&str, &str, &str)> = None; // (fence line, mark, lang)

    for raw in text.split('\n') {
        let line = raw.trim_end();
        match open {
            None => {
                if !line.starts_with("```") {
                    output.push(expand_tabs(line, tabsize));
                    continue;
                }
                let rest = line.trim_start_matches('`');
                let mark = &line[..line.len() - rest.len()];
                open = Some((line, mark, rest.trim()));
                source.clear();
            }
            Some((_, mark, lang)) => {
                if line != mark {
                    source.push(line);
                    continue;
                }
                let src = source.join("\n");
                let src = src
                    .trim_matches('\n')
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;");
                let head = if lang.is_empty() {
                    "<pre><code>".to_owned()
                } else {
                    format!(r#"<pre><code class="{lang}">"#)
                };
                output.push(format!("{head}{src}</code></pre>"));
                open = None;
            }
        }
    }

    if let Some((fence, _, _)) = open {
        output.push(fence.to_owned());
        output.extend(source.iter().map(|line| (*line).to_owned()));
    }

    output.join("\n")
}

fn expand_tabs(line: &str, tabsize: usize) -> String {
    if !line.contains('\t') {
        return line.to_owned();
    }
    let mut out = String::with_capacity(line.len() + tabsize);
    let mut col = 0;
    for c in line.chars() {
        if c == '\t' {
            let n = tabsize - col % tabsize;
            out.extend(std::iter::repeat_n(' ', n));
            col += n;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fenced_block_with_language() {
        assert_eq!(
            rewrite_fenced_code("```python\nprint(1)\n```", 4),
            r#"<pre><code class="python">print(1)</code></pre>"#
        );
    }

    #[test]
    fn test_fenced_block_escapes_markup() {
        assert_eq!(
            rewrite_fenced_code("```\n\nif a < b && c > d {}\n\n```\n", 4),
            "<pre><code>if a &lt; b &amp;&amp; c &gt; d {}</code></pre>\n"
        );
    }

    #[test]
    fn test_longer_fence_contains_shorter() {
        let text = "`````text\n```cpp\nint x;\n```\n`````";
        assert_eq!(
            rewrite_fenced_code(text, 4),
            "<pre><code class=\"text\">```cpp\nint x;\n```</code></pre>"
        );
    }

    #[test]
    fn test_unterminated_fence_passes_through() {
        assert_eq!(rewrite_fenced_code("```sh\nls\n", 4), "```sh\nls\n");
    }

    #[test]
    fn test_tabs_expanded_outside_code() {
        assert_eq!(rewrite_fenced_code("a\tb", 4), "a   b");
        assert_eq!(rewrite_fenced_code("\tcode", 2), "  code");
    }

    #[test]
    fn test_convert_keeps_code_block_verbatim() {
        let html = DefaultConverter::new(4)
            .convert("# Title\n\n```python\nprint(1)\n```\n\nSome *text*.\n")
            .unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains(r#"<pre><code class="python">print(1)</code></pre>"#));
        assert!(html.contains("<p>Some <em>text</em>.</p>"));
    }

    #[test]
    fn test_convert_code_block_with_blank_lines() {
        let html = DefaultConverter::new(4)
            .convert("```\nline 1\n\n*line 3*\n```\n")
            .unwrap();
        assert!(html.contains("<pre><code>line 1\n\n*line 3*</code></pre>"));
    }

    #[test]
    fn test_convert_tables_and_strikethrough() {
        let html = DefaultConverter::new(4)
            .convert("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n")
            .unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }
}
