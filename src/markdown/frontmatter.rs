//! Leading `---` metadata block extraction.

use std::collections::BTreeMap;

use serde_yaml_ng::Value;

use crate::debug;

/// Flat key → string mapping parsed from a document's frontmatter block.
///
/// Keys recognized downstream: `title`, `date`, `slug`, `tags`, `page`.
/// Unknown keys are kept so callers can inspect them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: BTreeMap<String, String>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse the raw block (delimiters already stripped).
    ///
    /// Never fails: malformed YAML or a non-mapping document yields an
    /// empty mapping. Scalars become strings, sequences of scalars are
    /// joined with `", "`, nested mappings and nulls are dropped.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new();
        }

        let value: Value = match serde_yaml_ng::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                debug!("frontmatter"; "ignoring malformed block: {}", e);
                return Self::new();
            }
        };

        let Value::Mapping(mapping) = value else {
            debug!("frontmatter"; "ignoring non-mapping block");
            return Self::new();
        };

        let mut fm = Self::new();
        for (key, value) in mapping {
            let Some(key) = scalar_to_string(&key) else {
                continue;
            };
            match flatten_value(&value) {
                Some(value) => fm.insert(key, value),
                None => debug!("frontmatter"; "skipping non-scalar key `{}`", key),
            }
        }
        fm
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Frontmatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn flatten_value(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => {
            let parts: Option<Vec<String>> = items.iter().map(scalar_to_string).collect();
            parts.map(|parts| parts.join(", "))
        }
        other => scalar_to_string(other),
    }
}

/// Split a document into `(raw frontmatter block, body)`.
///
/// The block must open with a line consisting solely of `---` on the very
/// first line and close with another `---` line. Without both delimiters
/// the whole document is body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let content_start = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some((first, mut rest)) = split_line(content_start) else {
        return (None, content);
    };
    if first.trim_end() != "---" {
        return (None, content);
    }

    let block_start = rest;
    let mut block_len = 0;
    while let Some((line, next)) = split_line(rest) {
        if line.trim_end() == "---" {
            return (Some(&block_start[..block_len]), next);
        }
        block_len += rest.len() - next.len();
        rest = next;
    }

    (None, content)
}

/// Split off the first line (without its terminator). `None` on empty input.
fn split_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    match s.find('\n') {
        Some(pos) => Some((s[..pos].trim_end_matches('\r'), &s[pos + 1..])),
        None => Some((s.trim_end_matches('\r'), "")),
    }
}

/// Extract frontmatter and return `(metadata, body)`.
pub fn extract_frontmatter(content: &str) -> (Frontmatter, &str) {
    match split_frontmatter(content) {
        (Some(block), body) => (Frontmatter::parse(block), body),
        (None, body) => (Frontmatter::new(), body),
    }
}
