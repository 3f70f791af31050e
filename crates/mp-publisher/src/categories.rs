//! Category assignment specs.

use mp_document::parse_list;

/// How a category spec changes the post's categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOp {
    /// `a,b`: assign exactly these.
    Replace,
    /// `+a,b`: add to the current set.
    Add,
    /// `-a,b`: remove from the current set.
    Remove,
}

/// Parsed `--categories` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub op: CategoryOp,
    pub names: Vec<String>,
}

impl CategorySpec {
    /// Parse `[+|-]name[,name...]`. Returns `None` for a blank spec.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (op, rest) = if let Some(rest) = spec.strip_prefix('+') {
            (CategoryOp::Add, rest)
        } else if let Some(rest) = spec.strip_prefix('-') {
            (CategoryOp::Remove, rest)
        } else {
            (CategoryOp::Replace, spec)
        };
        let names = parse_list(rest)?;
        Some(Self { op, names })
    }
}

/// Index of the first entry named `name`, ignoring case.
pub(crate) fn find_by_name<T>(items: &[T], name: &str, get: impl Fn(&T) -> &str) -> Option<usize> {
    let name = name.to_lowercase();
    items.iter().position(|item| get(item).to_lowercase() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_replace() {
        assert_eq!(
            CategorySpec::parse("News, Rust"),
            Some(CategorySpec {
                op: CategoryOp::Replace,
                names: vec!["News".to_owned(), "Rust".to_owned()],
            })
        );
    }

    #[test]
    fn test_parse_add_and_remove() {
        assert_eq!(CategorySpec::parse("+a").unwrap().op, CategoryOp::Add);
        let spec = CategorySpec::parse(" -a ,b").unwrap();
        assert_eq!(spec.op, CategoryOp::Remove);
        assert_eq!(spec.names, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(CategorySpec::parse("  "), None);
        assert_eq!(CategorySpec::parse("+"), None);
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let names = vec!["News".to_owned(), "Rust".to_owned()];
        assert_eq!(find_by_name(&names, "rust", |s| s.as_str()), Some(1));
        assert_eq!(find_by_name(&names, "go", |s| s.as_str()), None);
    }
}
