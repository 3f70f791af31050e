//! Front matter extraction.
//!
//! A metadata block is a run of `key: value` lines fenced by lines made of
//! three or more dashes:
//!
//! ```text
//! ---
//! uuid: 42
//! title: Hello
//! ---
//! Body text
//! ```

use std::collections::HashMap;

/// Metadata block and the body that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Key/value pairs. Later duplicates overwrite earlier ones.
    pub metadata: HashMap<String, String>,
    /// 1-based line number where each key was last set.
    pub key_lines: HashMap<String, usize>,
    /// Text after the closing fence, leading newlines removed.
    pub body: String,
}

enum State {
    BeforeBlock,
    InBlock,
}

/// Split `text` into metadata and body.
///
/// Blank lines are skipped in every state, so blank lines ahead of the
/// opening fence are allowed. Any other line before the fence means the
/// document has no metadata and the whole text is body. A block without a
/// closing fence keeps its metadata and leaves the body empty.
#[must_use]
pub fn parse_front_matter(text: &str) -> FrontMatter {
    let mut state = State::BeforeBlock;
    let mut front = FrontMatter::default();
    let mut offset = 0;

    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        offset += raw.len();
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        let fence = is_fence(line);
        match state {
            State::BeforeBlock => {
                if !fence {
                    return FrontMatter {
                        body: text.to_owned(),
                        ..FrontMatter::default()
                    };
                }
                state = State::InBlock;
            }
            State::InBlock => {
                if fence {
                    front.body = text[offset..]
                        .trim_start_matches(['\n', '\r'])
                        .to_owned();
                    return front;
                }
                if let Some((key, value)) = line.split_once(':') {
                    let key = key.trim();
                    if !key.is_empty() {
                        front.metadata.insert(key.to_owned(), value.trim().to_owned());
                        front.key_lines.insert(key.to_owned(), idx + 1);
                    }
                }
            }
        }
    }

    match state {
        // Empty or all-blank text.
        State::BeforeBlock => FrontMatter {
            body: text.to_owned(),
            ..FrontMatter::default()
        },
        State::InBlock => front,
    }
}

fn is_fence(line: &str) -> bool {
    line.len() >= 3 && line.bytes().all(|b| b == b'-')
}

/// Blank the value of `key` in the metadata block of `text`.
///
/// Returns the rewritten text, or `None` when `key` is absent or already
/// empty. Every other line, including its line ending, is kept as is.
#[must_use]
pub fn clear_value(text: &str, key: &str) -> Option<String> {
    let front = parse_front_matter(text);
    if front.metadata.get(key).is_none_or(String::is_empty) {
        return None;
    }
    let target = front.key_lines[key];

    let mut result = String::with_capacity(text.len());
    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        if idx + 1 == target {
            let line = raw.trim_end_matches(['\n', '\r']);
            result.push_str(key);
            result.push(':');
            result.push_str(&raw[line.len()..]);
        } else {
            result.push_str(raw);
        }
    }
    Some(result)
}

/// Split a comma separated metadata value into trimmed items.
///
/// Full-width commas (U+FF0C) are treated as commas. Returns `None` when no
/// non-empty item remains.
#[must_use]
pub fn parse_list(value: &str) -> Option<Vec<String>> {
    let normalized = value.replace('\u{ff0c}', ",");
    let items: Vec<String> = normalized
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if items.is_empty() { None } else { Some(items) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_block() {
        let front =
            parse_front_matter("---\nuuid: 42\ntitle: Hello\ncategories: a, b\n---\nBody");
        assert_eq!(front.metadata.len(), 3);
        assert_eq!(front.metadata["uuid"], "42");
        assert_eq!(front.metadata["title"], "Hello");
        assert_eq!(front.metadata["categories"], "a, b");
        assert_eq!(front.body, "Body");
        assert_eq!(front.key_lines["title"], 3);
    }

    #[test]
    fn test_no_metadata() {
        let text = "# Heading\n\n---\nkey: value\n---\n";
        let front = parse_front_matter(text);
        assert!(front.metadata.is_empty());
        assert_eq!(front.body, text);
    }

    #[test]
    fn test_empty_text() {
        let front = parse_front_matter("");
        assert!(front.metadata.is_empty());
        assert_eq!(front.body, "");
    }

    #[test]
    fn test_leading_blank_lines_allowed() {
        let front = parse_front_matter("\n  \n---\ntitle: T\n---\n\n\nText\n");
        assert_eq!(front.metadata["title"], "T");
        assert_eq!(front.body, "Text\n");
    }

    #[test]
    fn test_unterminated_block_keeps_metadata() {
        let front = parse_front_matter("---\ntitle: T\nstatus: draft\n");
        assert_eq!(front.metadata["status"], "draft");
        assert_eq!(front.body, "");
    }

    #[test]
    fn test_longer_fences_and_crlf() {
        let front = parse_front_matter("-----\r\ntitle: T  \r\n-----\r\n\r\nBody\r\n");
        assert_eq!(front.metadata["title"], "T");
        assert_eq!(front.body, "Body\r\n");
    }

    #[test]
    fn test_duplicate_keys_overwrite() {
        let front = parse_front_matter("---\ntitle: A\ntitle: B\n---\n");
        assert_eq!(front.metadata["title"], "B");
        assert_eq!(front.key_lines["title"], 3);
    }

    #[test]
    fn test_value_with_colon_and_empty_key() {
        let front = parse_front_matter("---\nurl: http://x.org\n: orphan\nnoise\n---\n");
        assert_eq!(front.metadata.len(), 1);
        assert_eq!(front.metadata["url"], "http://x.org");
    }

    #[test]
    fn test_short_dash_line_is_not_fence() {
        let front = parse_front_matter("--\ntitle: T\n--\n");
        assert!(front.metadata.is_empty());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list("a, b ,,c"),
            Some(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])
        );
        assert_eq!(
            parse_list("随笔\u{ff0c}技术"),
            Some(vec!["随笔".to_owned(), "技术".to_owned()])
        );
        assert_eq!(parse_list(" , "), None);
        assert_eq!(parse_list(""), None);
    }

    #[test]
    fn test_clear_value() {
        let text = "---\r\nuuid: 42\r\ntitle: Hi\r\n---\r\nuuid: 42 in body\r\n";
        assert_eq!(
            clear_value(text, "uuid").as_deref(),
            Some("---\r\nuuid:\r\ntitle: Hi\r\n---\r\nuuid: 42 in body\r\n")
        );
        assert_eq!(clear_value("---\nuuid:\n---\n", "uuid"), None);
        assert_eq!(clear_value("---\ntitle: x\n---\n", "uuid"), None);
        assert_eq!(clear_value("uuid: 42\n", "uuid"), None);
    }
}
