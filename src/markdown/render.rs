//! Markdown → HTML rendering using pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};
use serde::{Deserialize, Serialize};

use super::frontmatter::{Frontmatter, extract_frontmatter};

/// Markdown dialect extensions, configured under `[markdown]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
    /// Convert straight quotes and dashes to typographic ones
    pub smart_punctuation: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
            smart_punctuation: false,
        }
    }
}

impl MarkdownOptions {
    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(self) -> Options {
        let mut opts = Options::empty();
        opts.set(Options::ENABLE_TABLES, self.tables);
        opts.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        opts.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        opts.set(Options::ENABLE_TASKLISTS, self.task_lists);
        opts.set(Options::ENABLE_HEADING_ATTRIBUTES, self.heading_attributes);
        opts.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        opts
    }
}

/// Immutable renderer shared by reference across worker threads.
///
/// All one-time setup happens in [`MarkdownRenderer::new`]; rendering
/// itself holds no state, so identical input always yields identical HTML.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

/// Result of parsing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    pub html: String,
}

impl MarkdownRenderer {
    pub fn new(options: MarkdownOptions) -> Self {
        Self {
            options: options.to_pulldown_options(),
        }
    }

    /// Render markdown (no frontmatter handling) to HTML.
    pub fn render_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    /// Split frontmatter from body and render the body.
    pub fn parse(&self, content: &str) -> ParsedDocument {
        let (frontmatter, body) = extract_frontmatter(content);
        ParsedDocument {
            frontmatter,
            html: self.render_html(body),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(MarkdownOptions::default())
    }
}
