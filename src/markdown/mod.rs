//! Markdown front end: frontmatter, HTML rendering, code block extraction.
//!
//! - [`frontmatter`] - leading `---` block → flat key/value mapping
//! - [`render`] - body → HTML via `pulldown-cmark`
//! - [`codeblock`] - code regions → placeholders + [`CodeBlockInfo`]

pub mod codeblock;
pub mod frontmatter;
pub mod render;

pub use codeblock::{CodeBlockInfo, extract_code_blocks, placeholder};
pub use frontmatter::{Frontmatter, extract_frontmatter};
pub use render::{MarkdownOptions, MarkdownRenderer, ParsedDocument};
