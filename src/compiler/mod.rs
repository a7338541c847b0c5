//! Per-document compilation: markdown source → routed page artifact.
//!
//! ```text
//! read ─► frontmatter + HTML ─► code block extraction ─► metadata ─► emit
//! ```
//!
//! Each document compiles independently against a shared, immutable
//! [`MarkdownRenderer`], so callers may run documents in parallel.

use jwalk::WalkDir;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::BuildSectionConfig;
use crate::config::section::build::is_markdown;
use crate::markdown::{MarkdownRenderer, extract_code_blocks};
use crate::page::{EmitError, PostMetadata, RoutedPage};
use crate::utils::path::file_stem;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}` has no usable file name")]
    InvalidName(PathBuf),

    #[error("failed to emit `{0}`")]
    Emit(PathBuf, #[source] EmitError),
}

/// One compiled document.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    pub source: PathBuf,
    pub meta: PostMetadata,
    pub page: RoutedPage,
}

/// Collect all files under `dir` recursively, sorted by path.
///
/// A missing or unreadable directory yields no files.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

/// Eligible markdown documents under the content root, sorted by path.
pub fn collect_documents(build: &BuildSectionConfig) -> Vec<PathBuf> {
    collect_all_files(&build.content)
        .into_iter()
        .filter(|path| build.is_eligible(path) && is_markdown(path))
        .filter(|path| !is_private(build, path))
        .collect()
}

pub(crate) fn is_private(build: &BuildSectionConfig, path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| build.is_private(name))
}

/// Read and compile one document.
pub fn compile_document(
    renderer: &MarkdownRenderer,
    path: &Path,
) -> Result<CompiledDocument, CompileError> {
    let stem = file_stem(path).ok_or_else(|| CompileError::InvalidName(path.to_path_buf()))?;
    let content =
        fs::read_to_string(path).map_err(|e| CompileError::Io(path.to_path_buf(), e))?;

    let (meta, page) = compile_source(renderer, stem, &content)
        .map_err(|e| CompileError::Emit(path.to_path_buf(), e))?;

    Ok(CompiledDocument {
        source: path.to_path_buf(),
        meta,
        page,
    })
}

/// Compile in-memory document text named `stem`.
pub fn compile_source(
    renderer: &MarkdownRenderer,
    stem: &str,
    content: &str,
) -> Result<(PostMetadata, RoutedPage), EmitError> {
    let parsed = renderer.parse(content);
    let (html, blocks) = extract_code_blocks(&parsed.html);
    let meta = PostMetadata::resolve(stem, &parsed.frontmatter);
    let page = RoutedPage::emit(&meta, &html, &blocks)?;
    Ok((meta, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::RenderSegment;
    use crate::utils::date::DateTimeUtc;
    use tempfile::TempDir;

    fn build_in(dir: &Path) -> BuildSectionConfig {
        BuildSectionConfig {
            content: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_collect_documents_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts/nested")).unwrap();
        fs::write(root.join("posts/b.md"), "").unwrap();
        fs::write(root.join("posts/a.markdown"), "").unwrap();
        fs::write(root.join("posts/nested/c.md"), "").unwrap();
        fs::write(root.join("posts/_draft.md"), "").unwrap();
        fs::write(root.join("posts/image.png"), "").unwrap();

        let docs = collect_documents(&build_in(root));
        assert_eq!(
            docs,
            vec![
                root.join("posts/a.markdown"),
                root.join("posts/b.md"),
                root.join("posts/nested/c.md"),
            ]
        );
    }

    #[test]
    fn test_collect_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(collect_documents(&build_in(&dir.path().join("missing"))).is_empty());
    }

    #[test]
    fn test_compile_source_end_to_end() {
        let renderer = MarkdownRenderer::default();
        let doc = "---\ntitle: Hello\ntags: [rust, web]\n---\nIntro\n\n```rust\nlet x = 1 < 2;\n```\n";
        let (meta, page) = compile_source(&renderer, "2024-03-15-hello-world", doc).unwrap();

        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.tags, "rust, web");
        assert_eq!(meta.date, DateTimeUtc::from_ymd(2024, 3, 15));
        assert_eq!(page.route, "/posts/hello-world");
        assert_eq!(
            page.segments[1],
            RenderSegment::Code {
                language: Some("rust".into()),
                code: "let x = 1 < 2;".into(),
            }
        );
    }

    #[test]
    fn test_literal_placeholder_next_to_fence() {
        let renderer = MarkdownRenderer::default();
        let doc = "Writing about quire.\n\n<!--quire:code-block:0-->\n\n```rust\nfn main() {}\n```\n";
        let (_, page) = compile_source(&renderer, "2024-01-01-x", doc).unwrap();

        let code: Vec<_> = page
            .segments
            .iter()
            .filter(|s| matches!(s, RenderSegment::Code { .. }))
            .collect();
        assert_eq!(
            code,
            vec![&RenderSegment::Code {
                language: Some("rust".into()),
                code: "fn main() {}".into(),
            }]
        );
    }

    #[test]
    fn test_malformed_frontmatter_still_compiles() {
        let renderer = MarkdownRenderer::default();
        let doc = "---\ntitle: [unclosed\n---\nBody\n";
        let (meta, page) = compile_source(&renderer, "about", doc).unwrap();
        assert_eq!(meta.title, "about");
        assert_eq!(page.segments.len(), 1);
    }

    #[test]
    fn test_compile_document_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2024-03-15-my-first-post.md");
        fs::write(&path, "Hello\n").unwrap();

        let doc = compile_document(&MarkdownRenderer::default(), &path).unwrap();
        assert_eq!(doc.source, path);
        assert_eq!(doc.meta.identifier, "_2024_03_15_myfirstpost");

        let missing = compile_document(&MarkdownRenderer::default(), &dir.path().join("x.md"));
        assert!(matches!(missing, Err(CompileError::Io(..))));
    }
}
