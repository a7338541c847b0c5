//! Validated site route (`/`, `/posts`, `/posts/<slug>`).

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::Serialize;

/// An absolute URL path without query, fragment, or trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Route(String);

impl Route {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Normalize and validate a route string.
    ///
    /// Rejects relative paths, `..` segments, queries and fragments.
    /// Segments are checked after percent-decoding too, so `%2e%2e` and
    /// `%2F` cannot smuggle a traversal into [`Route::snapshot_path`].
    /// Repeated and trailing slashes are collapsed.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if !s.starts_with('/') || s.contains(['?', '#', '\\']) {
            return None;
        }

        let segments: Vec<&str> = s.split('/').filter(|seg| !seg.is_empty()).collect();
        if segments.iter().any(|seg| !is_plain_segment(&decode_segment(seg))) {
            return None;
        }

        Some(Self(format!("/{}", segments.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Location of this route's snapshot under `root`.
    ///
    /// `/` → `root/index.html`, `/a/b` → `root/a/b/index.html`.
    /// Segments are percent-decoded, matching what a static host looks up.
    pub fn snapshot_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.0.split('/').filter(|s| !s.is_empty()) {
            path.push(decode_segment(segment).as_ref());
        }
        path.push("index.html");
        path
    }
}

fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

fn is_plain_segment(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains(['/', '\\', '\0'])
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(Route::parse("/").unwrap().as_str(), "/");
        assert_eq!(Route::parse("/posts/").unwrap().as_str(), "/posts");
        assert_eq!(Route::parse("//posts//a").unwrap().as_str(), "/posts/a");
        assert_eq!(Route::parse(" /about ").unwrap().as_str(), "/about");
    }

    #[test]
    fn test_parse_rejects() {
        assert!(Route::parse("").is_none());
        assert!(Route::parse("posts/a").is_none());
        assert!(Route::parse("/posts/../etc").is_none());
        assert!(Route::parse("/a?b=1").is_none());
        assert!(Route::parse("/a#top").is_none());
        assert!(Route::parse("/posts/%2e%2e/etc").is_none());
        assert!(Route::parse("/posts/a%2Fb").is_none());
        assert!(Route::parse("/posts/a%5Cb").is_none());
    }

    #[test]
    fn test_snapshot_path() {
        let root = Path::new("/out");
        assert_eq!(Route::root().snapshot_path(root), Path::new("/out/index.html"));
        assert_eq!(
            Route::parse("/posts/my-first-post").unwrap().snapshot_path(root),
            Path::new("/out/posts/my-first-post/index.html")
        );
    }

    #[test]
    fn test_snapshot_path_decodes_segments() {
        let dir = tempfile::TempDir::new().unwrap();
        let route = Route::parse("/posts/caf%C3%A9").unwrap();
        assert_eq!(route.as_str(), "/posts/caf%C3%A9");

        let path = route.snapshot_path(dir.path());
        assert_eq!(path, dir.path().join("posts").join("café").join("index.html"));

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "<html></html>").unwrap();
        assert!(dir.path().join("posts/café/index.html").is_file());
        assert!(!dir.path().join("posts/caf%C3%A9").exists());
    }
}
