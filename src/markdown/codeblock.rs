//! Fenced code block extraction from rendered HTML.
//!
//! Each `<pre><code …>…</code></pre>` region is cut out of the HTML and
//! replaced by a placeholder comment carrying its index:
//!
//! ```text
//! <p>Intro</p>
//! <!--quire:code-block:0-->
//! <p>Outro</p>
//! ```
//!
//! The placeholder is an HTML comment, so a stray one that survives into a
//! page is invisible. Markdown passes raw HTML comments through, so a
//! document can spell the token itself; such comments are rewritten to an
//! inert form before extraction and never reach the emitter.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::utils::html::unescape;

const PLACEHOLDER_OPEN: &str = "<!--quire:code-block:";
const PLACEHOLDER_CLOSE: &str = "-->";
/// What a placeholder already present in the document becomes.
const INERT_OPEN: &str = "<!-- quire:code-block:";

/// Matches a rendered code block, with or without a `language-*` class.
static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre><code(?: class="language-([^"]*)")?>(.*?)</code></pre>"#).unwrap()
});

/// Matches a placeholder produced by [`placeholder`].
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--quire:code-block:([0-9]+)-->").unwrap());

/// One extracted code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockInfo {
    /// Zero-based, in order of appearance.
    pub index: usize,
    /// Declared language, empty when the fence had none.
    pub language: String,
    /// Literal source text (entities decoded, trailing newline dropped).
    pub code: String,
}

/// Placeholder token for the block at `index`.
pub fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_OPEN}{index}{PLACEHOLDER_CLOSE}")
}

/// Replace every code block in `html` with a placeholder.
///
/// Returns the rewritten HTML and the blocks in appearance order.
pub fn extract_code_blocks(html: &str) -> (String, Vec<CodeBlockInfo>) {
    let html = neutralize_placeholders(html);
    let mut blocks = Vec::new();

    let replaced = CODE_BLOCK.replace_all(&html, |caps: &Captures<'_>| {
        let index = blocks.len();
        let language = caps
            .get(1)
            .map(|m| unescape(m.as_str()).into_owned())
            .unwrap_or_default();
        let raw = caps.get(2).map_or("", |m| m.as_str());
        let code = unescape(raw);
        let code = code.strip_suffix('\n').unwrap_or(&code).to_string();

        blocks.push(CodeBlockInfo {
            index,
            language,
            code,
        });
        placeholder(index)
    });

    (replaced.into_owned(), blocks)
}

/// Rewrite placeholder-shaped comments written by the document author.
///
/// The result is still a comment, but [`PLACEHOLDER`] no longer matches it.
fn neutralize_placeholders(html: &str) -> Cow<'_, str> {
    if html.contains(PLACEHOLDER_OPEN) {
        Cow::Owned(html.replace(PLACEHOLDER_OPEN, INERT_OPEN))
    } else {
        Cow::Borrowed(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownRenderer;

    fn render(md: &str) -> String {
        MarkdownRenderer::default().render_html(md)
    }

    #[test]
    fn test_python_block_decoded() {
        let html = render("```python\nprint(\"hi\")\n```\n");
        let (out, blocks) = extract_code_blocks(&html);

        assert_eq!(
            blocks,
            vec![CodeBlockInfo {
                index: 0,
                language: "python".to_string(),
                code: "print(\"hi\")".to_string(),
            }]
        );
        assert_eq!(out.trim(), placeholder(0));
    }

    #[test]
    fn test_block_without_language() {
        let html = render("```\nplain <text>\n```\n");
        let (_, blocks) = extract_code_blocks(&html);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "");
        assert_eq!(blocks[0].code, "plain <text>");
    }

    #[test]
    fn test_multiline_and_ordering() {
        let md = "Intro\n\n```rust\nfn a() {\n    1\n}\n```\n\nMiddle\n\n```sh\necho hi\n```\n\n    indented\n";
        let (out, blocks) = extract_code_blocks(&render(md));

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].code, "fn a() {\n    1\n}");
        assert_eq!(blocks[0].language, "rust");
        assert_eq!(blocks[1].language, "sh");
        assert_eq!(blocks[2].language, "");
        assert_eq!(blocks[2].code, "indented");
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.index, i);
        }

        let first = out.find(&placeholder(0)).unwrap();
        let second = out.find(&placeholder(1)).unwrap();
        let third = out.find(&placeholder(2)).unwrap();
        assert!(first < second && second < third);
        assert!(out.contains("<p>Intro</p>"));
        assert!(!out.contains("<pre>"));
    }

    #[test]
    fn test_no_blocks() {
        let html = render("Just *text*.");
        let (out, blocks) = extract_code_blocks(&html);
        assert!(blocks.is_empty());
        assert_eq!(out, html);
    }

    #[test]
    fn test_literal_placeholder_comment_is_inert() {
        let md = "About the token:\n\n<!--quire:code-block:0-->\n\n```rust\nfn main() {}\n```\n";
        let (out, blocks) = extract_code_blocks(&render(md));

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "fn main() {}");
        assert_eq!(PLACEHOLDER.find_iter(&out).count(), 1);
        assert_eq!(out.matches(&placeholder(0)).count(), 1);
        assert!(out.contains("<!-- quire:code-block:0-->"));
        let inert = out.find(INERT_OPEN).unwrap();
        let real = out.find(&placeholder(0)).unwrap();
        assert!(inert < real);
    }

    #[test]
    fn test_placeholder_regex_roundtrip() {
        let token = placeholder(42);
        let caps = PLACEHOLDER.captures(&token).unwrap();
        assert_eq!(&caps[1], "42");
    }
}
