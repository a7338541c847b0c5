//! Headless-browser snapshot pipeline.
//!
//! Each route is loaded from the local static server, given time to finish
//! client-side rendering, and its DOM written out as static HTML:
//!
//! ```text
//! Pending -> Navigating -> WaitingForReady -> Captured | TimedOut
//! ```
//!
//! The browser sits behind the [`Browser`]/[`BrowserPage`] traits so the
//! driver runs the same against Chromium and an in-memory fake.

mod browser;
mod chromium;
mod driver;
mod output;
mod sitemap;
mod state;

pub use browser::{Browser, BrowserPage};
pub use chromium::ChromiumBrowser;
pub use driver::{DriverOptions, RouteOutcome, SnapshotReport, run};
pub use sitemap::Sitemap;
pub use state::RouteState;

use std::path::PathBuf;

use thiserror::Error;

use crate::page::Route;
use crate::serve::ServeError;

/// Failures that abort a snapshot run.
///
/// Readiness timeouts are not errors: the route is captured as-is and
/// reported as [`RouteState::TimedOut`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("failed to start local server")]
    ServerBind(#[from] ServeError),

    #[error("browser page error: {0}")]
    Page(String),

    #[error("{route}: navigation failed: {message}")]
    Navigation { route: Route, message: String },

    #[error("{route}: navigation timed out after {timeout_ms}ms")]
    NavigationTimeout { route: Route, timeout_ms: u64 },

    #[error("{route}: failed to capture DOM: {message}")]
    Capture { route: Route, message: String },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
