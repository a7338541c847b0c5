//! URL to filesystem path resolution for the static server.
//!
//! Lookup order for a request path `p` under the served root:
//!
//! 1. `p.gz` (gzip), then `p.br` (brotli), then `p` itself
//! 2. when `p` is a directory, the same lookup for `p/index.html`
//! 3. nothing matched: the root `index.html` (SPA fallback)
//!
//! Every candidate must stay inside the root after symlinks are resolved.

use std::path::{Path, PathBuf};

/// Pre-compressed variant served as-is with a `Content-Encoding` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Brotli,
}

impl Encoding {
    const ALL: [Self; 2] = [Self::Gzip, Self::Brotli];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Brotli => "br",
        }
    }

    pub fn header_value(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Brotli => "br",
        }
    }
}

/// A file chosen to answer a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub encoding: Option<Encoding>,
}

/// Resolve `url`, falling back to the root index for unmatched paths.
pub fn resolve_or_fallback(url: &str, root: &Path) -> Option<Resolved> {
    resolve_path(url, root).or_else(|| resolve_path("/", root))
}

/// Resolve `url` to a file under `root`, without fallback.
pub fn resolve_path(url: &str, root: &Path) -> Option<Resolved> {
    let clean = normalize_url(url);
    if clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let root = root.canonicalize().ok()?;
    let local = if clean.is_empty() {
        root.join("index.html")
    } else {
        root.join(&clean)
    };

    if local.is_dir() {
        return find_variant(&local.join("index.html"), &root);
    }
    find_variant(&local, &root)
}

/// Prefer pre-compressed siblings of `file`, then `file` itself.
fn find_variant(file: &Path, root: &Path) -> Option<Resolved> {
    for encoding in Encoding::ALL {
        let mut name = file.as_os_str().to_owned();
        name.push(".");
        name.push(encoding.extension());
        if let Some(path) = contained_file(Path::new(&name), root) {
            return Some(Resolved {
                path,
                encoding: Some(encoding),
            });
        }
    }

    contained_file(file, root).map(|path| Resolved {
        path,
        encoding: None,
    })
}

/// `path` canonicalized, if it is a file inside `root`.
fn contained_file(path: &Path, root: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().ok()?;
    (canonical.starts_with(root) && canonical.is_file()).then_some(canonical)
}

/// Normalize URL: decode, strip query string and fragment, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "<div id=\"app\">Loading...</div>").unwrap();
        fs::create_dir_all(root.join("_framework")).unwrap();
        fs::write(root.join("_framework/app.js"), "js").unwrap();
        fs::write(root.join("_framework/app.js.br"), "br").unwrap();
        fs::write(root.join("_framework/app.wasm"), "wasm").unwrap();
        fs::write(root.join("_framework/app.wasm.gz"), "gz").unwrap();
        fs::write(root.join("_framework/app.wasm.br"), "br").unwrap();
        fs::create_dir_all(root.join("posts/hello")).unwrap();
        fs::write(root.join("posts/hello/index.html"), "hello").unwrap();
        dir
    }

    fn name(resolved: &Resolved) -> String {
        resolved.path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_root_and_exact_files() {
        let dir = site();
        let root = resolve_path("/", dir.path()).unwrap();
        assert_eq!(name(&root), "index.html");
        assert_eq!(root.encoding, None);

        let hello = resolve_path("/posts/hello/", dir.path()).unwrap();
        assert!(hello.path.ends_with("posts/hello/index.html"));
    }

    #[test]
    fn test_compressed_variants_preferred() {
        let dir = site();
        let wasm = resolve_path("/_framework/app.wasm", dir.path()).unwrap();
        assert_eq!(name(&wasm), "app.wasm.gz");
        assert_eq!(wasm.encoding, Some(Encoding::Gzip));

        let js = resolve_path("/_framework/app.js?v=3", dir.path()).unwrap();
        assert_eq!(name(&js), "app.js.br");
        assert_eq!(js.encoding, Some(Encoding::Brotli));
    }

    #[test]
    fn test_spa_fallback() {
        let dir = site();
        assert!(resolve_path("/posts/unknown", dir.path()).is_none());
        let fallback = resolve_or_fallback("/posts/unknown", dir.path()).unwrap();
        assert_eq!(fallback.path, dir.path().canonicalize().unwrap().join("index.html"));
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        let outside = dir.path().parent().unwrap();
        assert!(resolve_path("/../etc/passwd", dir.path()).is_none());
        assert!(resolve_path("/%2e%2e/%2e%2e/etc/passwd", dir.path()).is_none());
        let fallback = resolve_or_fallback("/../x", dir.path()).unwrap();
        assert!(!fallback.path.starts_with(outside.join("x")));
        assert_eq!(name(&fallback), "index.html");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let dir = site();
        let secret = TempDir::new().unwrap();
        fs::write(secret.path().join("secret.txt"), "s").unwrap();
        std::os::unix::fs::symlink(secret.path(), dir.path().join("link")).unwrap();
        assert!(resolve_path("/link/secret.txt", dir.path()).is_none());
    }

    #[test]
    fn test_missing_root_index() {
        let dir = TempDir::new().unwrap();
        assert!(resolve_or_fallback("/anything", dir.path()).is_none());
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/a%20b/?q=1#frag"), "a b");
        assert_eq!(normalize_url("/"), "");
    }
}
