//! Native pulldown-cmark converter.
//!
//! Renders GitHub-flavored Markdown, adds `id` anchors to headings and keeps
//! fenced code as `<pre><code class="language-LANG">`.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::util::slugify;
use crate::{ConvertError, Converter};

/// Markdown converter for `engine = "markdown"`.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM
    }
}

impl Converter for MarkdownConverter {
    fn convert(&self, text: &str) -> Result<String, ConvertError> {
        let mut events: Vec<Event<'_>> = Parser::new_ext(text, Self::parser_options()).collect();
        assign_heading_ids(&mut events);

        let mut output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        Ok(output)
    }
}

/// Give every heading without an explicit `{#id}` a unique slug id.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut id_counts: HashMap<String, usize> = HashMap::new();
    let mut start = None;
    let mut text = String::new();

    for idx in 0..events.len() {
        if matches!(events[idx], Event::End(TagEnd::Heading(_))) {
            if let Some(open) = start.take() {
                let id = unique_id(&mut id_counts, &text);
                if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[open] {
                    *slot = Some(CowStr::from(id));
                }
            }
            continue;
        }
        match &events[idx] {
            Event::Start(Tag::Heading { id: None, .. }) => {
                start = Some(idx);
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if start.is_some() => text.push_str(t),
            _ => {}
        }
    }
}

fn unique_id(counts: &mut HashMap<String, usize>, text: &str) -> String {
    let mut base = slugify(text);
    if base.is_empty() {
        base.push_str("section");
    }
    let count = counts.entry(base.clone()).or_default();
    let id = match *count {
        0 => base,
        n => format!("{base}-{n}"),
    };
    *count += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(text: &str) -> String {
        MarkdownConverter.convert(text).unwrap()
    }

    #[test]
    fn test_heading_ids() {
        let html = convert("# Getting Started\n\n## Install `tool`\n");
        assert!(html.contains(r#"<h1 id="getting-started">Getting Started</h1>"#));
        assert!(html.contains(r#"<h2 id="install-tool">"#));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let html = convert("## Notes\n\n## Notes\n");
        assert!(html.contains(r#"id="notes""#));
        assert!(html.contains(r#"id="notes-1""#));
    }

    #[test]
    fn test_explicit_heading_id_kept() {
        let html = convert("## Setup {#custom}\n");
        assert!(html.contains(r#"id="custom""#));
    }

    #[test]
    fn test_fenced_code_language_class() {
        let html = convert("```rust\nfn main() {}\n```\n");
        assert!(html.contains(r#"<pre><code class="language-rust">fn main() {}"#));
    }

    #[test]
    fn test_task_list() {
        let html = convert("- [x] done\n- [ ] todo\n");
        assert!(html.contains("checkbox"));
    }
}
