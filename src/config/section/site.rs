//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://example.github.io"   # enables sitemap.xml
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Public site settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Deployed site URL (e.g., "https://example.com/blog").
    pub url: Option<String>,
}

impl SiteSectionConfig {
    pub const URL: FieldPath = FieldPath::new("site.url");

    /// `url` must be an absolute http(s) URL with a host.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let Some(url_str) = &self.url else {
            return;
        };

        match url::Url::parse(url_str) {
            Ok(parsed) => {
                if !matches!(parsed.scheme(), "http" | "https") {
                    diag.error_with_hint(
                        Self::URL,
                        format!(
                            "scheme '{}' not supported, must be http or https",
                            parsed.scheme()
                        ),
                        "use format like https://example.com",
                    );
                }
                if parsed.host_str().is_none() {
                    diag.error_with_hint(
                        Self::URL,
                        "URL must have a valid host",
                        "use format like https://example.com",
                    );
                }
            }
            Err(e) => {
                diag.error_with_hint(
                    Self::URL,
                    format!("invalid URL: {e}"),
                    "use format like https://example.com",
                );
            }
        }
    }
}
