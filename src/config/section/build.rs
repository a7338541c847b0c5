//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"               # markdown source root
//! output = "generated"              # page artifacts + manifest.json
//! extensions = ["md", "markdown"]   # eligible document extensions
//! private_prefix = "_"              # names starting with this are skipped
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Markdown extensions handled by the generator itself.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Content directory (relative to the project root).
    pub content: PathBuf,

    /// Artifact output directory (relative to the project root).
    pub output: PathBuf,

    /// File extensions scanned during generation and route discovery.
    ///
    /// Markdown extensions are compiled; any other listed extension is
    /// only scanned for an `@page "/route"` directive.
    pub extensions: Vec<String>,

    /// File names starting with this prefix are private fragments.
    pub private_prefix: String,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            content: "content".into(),
            output: "generated".into(),
            extensions: MARKDOWN_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            private_prefix: "_".into(),
        }
    }
}

impl BuildSectionConfig {
    pub const EXTENSIONS: FieldPath = FieldPath::new("build.extensions");
    pub const OUTPUT: FieldPath = FieldPath::new("build.output");

    /// Directory holding one artifact pair per page.
    pub fn pages_dir(&self) -> PathBuf {
        self.output.join("pages")
    }

    /// Whether `path` has one of the configured extensions.
    pub fn is_eligible(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Whether a file name marks a private fragment.
    pub fn is_private(&self, name: &str) -> bool {
        !self.private_prefix.is_empty() && name.starts_with(&self.private_prefix)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error_with_hint(
                Self::EXTENSIONS,
                "no document extensions configured",
                "e.g.: extensions = [\"md\"]",
            );
        }
        if self.extensions.iter().any(|e| e.starts_with('.')) {
            diag.error_with_hint(
                Self::EXTENSIONS,
                "extensions must not start with '.'",
                "write \"md\" instead of \".md\"",
            );
        }
        if self.content == self.output {
            diag.error(Self::OUTPUT, "output directory must differ from content directory");
        }
    }
}

/// Whether `path` is a markdown document.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.build.output, PathBuf::from("generated"));
        assert_eq!(config.build.extensions, vec!["md", "markdown"]);
        assert_eq!(config.build.private_prefix, "_");
    }

    #[test]
    fn test_eligible_and_private() {
        let build = BuildSectionConfig {
            extensions: vec!["md".into(), "razor".into()],
            ..Default::default()
        };
        assert!(build.is_eligible(Path::new("a/b.md")));
        assert!(build.is_eligible(Path::new("Index.RAZOR")));
        assert!(!build.is_eligible(Path::new("notes.txt")));
        assert!(!build.is_eligible(Path::new("README")));

        assert!(build.is_private("_Layout.razor"));
        assert!(!build.is_private("Layout.razor"));

        let open = BuildSectionConfig {
            private_prefix: String::new(),
            ..Default::default()
        };
        assert!(!open.is_private("_x.md"));
    }

    #[test]
    fn test_build_validation() {
        let mut diag = ConfigDiagnostics::new();
        BuildSectionConfig {
            extensions: vec![],
            ..Default::default()
        }
        .validate(&mut diag);
        assert_eq!(diag.len(), 1);

        let mut diag = ConfigDiagnostics::new();
        BuildSectionConfig {
            extensions: vec![".md".into()],
            output: "content".into(),
            ..Default::default()
        }
        .validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("post.md")));
        assert!(is_markdown(Path::new("post.Markdown")));
        assert!(!is_markdown(Path::new("Page.razor")));
    }
}
