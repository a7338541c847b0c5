//! `sitemap.xml` for captured routes.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/posts/hello</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```
//!
//! `<lastmod>` comes from the generated manifest when the route has a date.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use super::SnapshotError;
use crate::page::{PostManifest, Route};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const SITEMAP_FILE: &str = "sitemap.xml";

pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
}

impl Sitemap {
    pub fn build<'a>(
        base_url: &str,
        routes: impl IntoIterator<Item = &'a Route>,
        manifest: Option<&PostManifest>,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/');

        let urls = routes
            .into_iter()
            .map(|route| {
                let lastmod = manifest
                    .and_then(|m| m.get(route.as_str()))
                    .filter(|meta| !meta.date.is_unset())
                    .map(|meta| meta.date.to_date_string());
                UrlEntry {
                    loc: format!("{base_url}{route}"),
                    lastmod,
                }
            })
            .collect();

        Self { urls }
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 96);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&lastmod);
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write `sitemap.xml` into `root`.
    pub fn write(self, root: &Path) -> Result<PathBuf, SnapshotError> {
        let path = root.join(SITEMAP_FILE);
        fs::write(&path, self.into_xml()).map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
