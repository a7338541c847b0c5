//! Routed page artifacts: metadata plus an ordered render sequence.
//!
//! The emitter turns placeholder-bearing HTML back into alternating markup
//! and code segments. It is strict: a placeholder that does not resolve to
//! exactly one extracted block, or a block that is never referenced, is a
//! generation defect reported as [`EmitError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::meta::PostMetadata;
use crate::markdown::CodeBlockInfo;
use crate::markdown::codeblock::PLACEHOLDER;
use crate::utils::date::DateTimeUtc;
use crate::utils::html::escape;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("placeholder refers to unknown code block {0}")]
    Unresolved(usize),

    #[error("code block {0} is referenced more than once")]
    Duplicate(usize),

    #[error("code block {found} appears before block {expected}")]
    OutOfOrder { expected: usize, found: usize },

    #[error("code block {0} is never referenced")]
    UnusedBlock(usize),
}

/// One entry of the render sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderSegment {
    /// Literal HTML, emitted untouched.
    Markup { html: String },
    /// A code snippet slot.
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        code: String,
    },
}

/// Generated output unit for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedPage {
    pub route: String,
    pub identifier: String,
    pub title: String,
    pub date: DateTimeUtc,
    pub tags: String,
    pub is_post: bool,
    pub segments: Vec<RenderSegment>,
}

impl RoutedPage {
    /// Build the artifact from resolved metadata and extracted HTML.
    pub fn emit(
        meta: &PostMetadata,
        html: &str,
        blocks: &[CodeBlockInfo],
    ) -> Result<Self, EmitError> {
        Ok(Self {
            route: meta.route.clone(),
            identifier: meta.identifier.clone(),
            title: meta.title.clone(),
            date: meta.date,
            tags: meta.tags.clone(),
            is_post: meta.is_post,
            segments: split_segments(html, blocks)?,
        })
    }

    /// HTML output adapter: markup verbatim, code escaped into `<pre><code>`.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                RenderSegment::Markup { html } => out.push_str(html),
                RenderSegment::Code { language, code } => {
                    match language {
                        Some(lang) => {
                            out.push_str("<pre><code class=\"language-");
                            out.push_str(&escape(lang));
                            out.push_str("\">");
                        }
                        None => out.push_str("<pre><code>"),
                    }
                    out.push_str(&escape(code));
                    out.push_str("\n</code></pre>\n");
                }
            }
        }
        out
    }
}

/// Split `html` at placeholders into markup and code segments.
///
/// Placeholders must reference blocks `0..n` exactly once each, in order.
fn split_segments(html: &str, blocks: &[CodeBlockInfo]) -> Result<Vec<RenderSegment>, EmitError> {
    let mut segments = Vec::with_capacity(blocks.len() * 2 + 1);
    let mut expected = 0usize;
    let mut last = 0usize;

    for caps in PLACEHOLDER.captures_iter(html) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        // Digits that overflow usize cannot name a block either.
        let index = caps[1].parse::<usize>().unwrap_or(usize::MAX);

        let block = blocks
            .iter()
            .find(|b| b.index == index)
            .ok_or(EmitError::Unresolved(index))?;
        if index < expected {
            return Err(EmitError::Duplicate(index));
        }
        if index > expected {
            return Err(EmitError::OutOfOrder { expected, found: index });
        }

        push_markup(&mut segments, &html[last..whole.start]);
        segments.push(RenderSegment::Code {
            language: (!block.language.is_empty()).then(|| block.language.clone()),
            code: block.code.clone(),
        });

        expected += 1;
        last = whole.end;
    }
    push_markup(&mut segments, &html[last..]);

    if let Some(unused) = blocks.iter().map(|b| b.index).find(|&i| i >= expected) {
        return Err(EmitError::UnusedBlock(unused));
    }
    Ok(segments)
}

fn push_markup(segments: &mut Vec<RenderSegment>, html: &str) {
    if !html.trim().is_empty() {
        segments.push(RenderSegment::Markup { html: html.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{Frontmatter, MarkdownRenderer, extract_code_blocks, placeholder};

    fn block(index: usize, language: &str, code: &str) -> CodeBlockInfo {
        CodeBlockInfo {
            index,
            language: language.to_string(),
            code: code.to_string(),
        }
    }

    fn meta() -> PostMetadata {
        PostMetadata::resolve("2024-03-15-my-first-post", &Frontmatter::new())
    }

    #[test]
    fn test_no_placeholders_yields_whole_html() {
        let page = RoutedPage::emit(&meta(), "<p>Hello</p>\n", &[]).unwrap();
        assert_eq!(
            page.segments,
            vec![RenderSegment::Markup { html: "<p>Hello</p>\n".to_string() }]
        );
        assert_eq!(page.route, "/posts/my-first-post");
        assert_eq!(page.identifier, "_2024_03_15_myfirstpost");
        assert!(page.is_post);
    }

    #[test]
    fn test_alternating_segments() {
        let html = format!("<p>a</p>\n{}\n<p>b</p>\n{}", placeholder(0), placeholder(1));
        let blocks = [block(0, "rust", "fn main() {}"), block(1, "", "plain")];
        let page = RoutedPage::emit(&meta(), &html, &blocks).unwrap();

        assert_eq!(
            page.segments,
            vec![
                RenderSegment::Markup { html: "<p>a</p>\n".to_string() },
                RenderSegment::Code {
                    language: Some("rust".to_string()),
                    code: "fn main() {}".to_string(),
                },
                RenderSegment::Markup { html: "\n<p>b</p>\n".to_string() },
                RenderSegment::Code { language: None, code: "plain".to_string() },
            ]
        );
    }

    #[test]
    fn test_round_trip_through_markdown() {
        let md = "Intro\n\n```python\nprint(\"hi\")\n```\n\nMid\n\n```\na < b\n```\n\nEnd\n";
        let html = MarkdownRenderer::default().render_html(md);
        let (replaced, blocks) = extract_code_blocks(&html);
        let page = RoutedPage::emit(&meta(), &replaced, &blocks).unwrap();

        let codes: Vec<_> = page
            .segments
            .iter()
            .filter_map(|s| match s {
                RenderSegment::Code { code, .. } => Some(code.as_str()),
                RenderSegment::Markup { .. } => None,
            })
            .collect();
        assert_eq!(codes, vec!["print(\"hi\")", "a < b"]);

        let out = page.to_html();
        assert!(!PLACEHOLDER.is_match(&out));
        assert!(out.contains("<pre><code class=\"language-python\">print(&quot;hi&quot;)"));
        assert!(out.contains("<pre><code>a &lt; b"));
        assert!(out.contains("<p>End</p>"));
    }

    #[test]
    fn test_unresolved_placeholder() {
        let html = placeholder(3);
        let err = RoutedPage::emit(&meta(), &html, &[]).unwrap_err();
        assert_eq!(err, EmitError::Unresolved(3));
    }

    #[test]
    fn test_duplicate_placeholder() {
        let html = format!("{}{}", placeholder(0), placeholder(0));
        let err = RoutedPage::emit(&meta(), &html, &[block(0, "", "x")]).unwrap_err();
        assert_eq!(err, EmitError::Duplicate(0));
    }

    #[test]
    fn test_out_of_order_placeholder() {
        let html = format!("{}{}", placeholder(1), placeholder(0));
        let blocks = [block(0, "", "a"), block(1, "", "b")];
        let err = RoutedPage::emit(&meta(), &html, &blocks).unwrap_err();
        assert_eq!(err, EmitError::OutOfOrder { expected: 0, found: 1 });
    }

    #[test]
    fn test_unused_block() {
        let err = RoutedPage::emit(&meta(), "<p>x</p>", &[block(0, "", "a")]).unwrap_err();
        assert_eq!(err, EmitError::UnusedBlock(0));
    }

    #[test]
    fn test_serialized_shape() {
        let html = format!("<p>a</p>{}", placeholder(0));
        let page = RoutedPage::emit(&meta(), &html, &[block(0, "sh", "ls")]).unwrap();
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["segments"][0]["kind"], "markup");
        assert_eq!(json["segments"][1]["kind"], "code");
        assert_eq!(json["segments"][1]["language"], "sh");
        assert_eq!(json["date"], "2024-03-15T00:00:00Z");

        let back: RoutedPage = serde_json::from_value(json).unwrap();
        assert_eq!(back, page);
    }
}
