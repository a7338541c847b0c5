//! `[prerender]` section configuration.
//!
//! Controls the local static server and the headless-browser capture.
//!
//! # Example
//!
//! ```toml
//! [prerender]
//! dist = "dist"                       # built app served during capture
//! output = ""                         # snapshot root; empty = same as dist
//! interface = "127.0.0.1"
//! port = 5000
//! seed_routes = ["/", "/posts", "/about"]
//! mount_selector = "#app"
//! loading_text = "Loading..."
//! navigation_timeout_ms = 30000
//! ready_timeout_ms = 15000
//! poll_interval_ms = 100
//! concurrency = 1
//! strict_navigation = false
//! viewport = { width = 1280, height = 720 }
//! browser = ""                        # explicit Chrome/Chromium path
//! sitemap = true
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Browser window size used for every captured page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrerenderConfig {
    /// Built single-page app (relative to the project root).
    pub dist: PathBuf,

    /// Snapshot root. Empty means snapshots are written into `dist`.
    pub output: PathBuf,

    /// Network interface for the local server.
    pub interface: IpAddr,

    /// First port tried for the local server.
    pub port: u16,

    /// Routes captured even when no document declares them.
    pub seed_routes: Vec<String>,

    /// CSS selector of the application mount node.
    pub mount_selector: String,

    /// Text the mount node shows until the app has rendered.
    pub loading_text: String,

    pub navigation_timeout_ms: u64,
    pub ready_timeout_ms: u64,
    pub poll_interval_ms: u64,

    /// Routes captured at the same time, each on its own page.
    pub concurrency: usize,

    /// Treat navigation timeouts as fatal instead of capturing anyway.
    pub strict_navigation: bool,

    pub viewport: Viewport,

    /// Chrome/Chromium executable. Empty means auto-detect.
    pub browser: PathBuf,

    /// Write `sitemap.xml` when `site.url` is set.
    pub sitemap: bool,
}

impl Default for PrerenderConfig {
    fn default() -> Self {
        Self {
            dist: "dist".into(),
            output: PathBuf::new(),
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            seed_routes: ["/", "/posts", "/about"].map(String::from).to_vec(),
            mount_selector: "#app".into(),
            loading_text: "Loading...".into(),
            navigation_timeout_ms: 30_000,
            ready_timeout_ms: 15_000,
            poll_interval_ms: 100,
            concurrency: 1,
            strict_navigation: false,
            viewport: Viewport::default(),
            browser: PathBuf::new(),
            sitemap: true,
        }
    }
}

impl PrerenderConfig {
    pub const PORT: FieldPath = FieldPath::new("prerender.port");
    pub const CONCURRENCY: FieldPath = FieldPath::new("prerender.concurrency");
    pub const SEED_ROUTES: FieldPath = FieldPath::new("prerender.seed_routes");
    pub const MOUNT_SELECTOR: FieldPath = FieldPath::new("prerender.mount_selector");
    pub const POLL_INTERVAL: FieldPath = FieldPath::new("prerender.poll_interval_ms");
    pub const VIEWPORT: FieldPath = FieldPath::new("prerender.viewport");

    /// Where snapshots are written.
    pub fn snapshot_root(&self) -> &Path {
        if self.output.as_os_str().is_empty() {
            &self.dist
        } else {
            &self.output
        }
    }

    pub fn browser_path(&self) -> Option<&Path> {
        (!self.browser.as_os_str().is_empty()).then_some(self.browser.as_path())
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port must be between 1 and 65535");
        }
        if self.concurrency == 0 {
            diag.error_with_hint(
                Self::CONCURRENCY,
                "concurrency must be at least 1",
                "use 1 to capture routes one at a time",
            );
        }
        if self.poll_interval_ms == 0 {
            diag.error(Self::POLL_INTERVAL, "poll interval must be at least 1 ms");
        }
        if self.mount_selector.trim().is_empty() {
            diag.error(Self::MOUNT_SELECTOR, "mount selector must not be empty");
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            diag.error(Self::VIEWPORT, "viewport width and height must be non-zero");
        }
        for route in &self.seed_routes {
            if !route.starts_with('/') {
                diag.error_with_hint(
                    Self::SEED_ROUTES,
                    format!("route '{route}' must start with '/'"),
                    format!("use \"/{}\"", route.trim_start_matches('/')),
                );
            }
        }
    }
}
