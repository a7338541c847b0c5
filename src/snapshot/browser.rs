//! Seam between the snapshot driver and a concrete browser.

use super::SnapshotError;

/// A running browser that can open pages.
#[allow(async_fn_in_trait)]
pub trait Browser {
    type Page: BrowserPage;

    async fn new_page(&self) -> Result<Self::Page, SnapshotError>;

    /// Shut the browser down. Called once, after every page is closed.
    async fn close(self) -> Result<(), SnapshotError>;
}

/// One browser tab.
#[allow(async_fn_in_trait)]
pub trait BrowserPage {
    /// Navigate to `url` and wait for the load to settle.
    async fn goto(&mut self, url: &str) -> Result<(), SnapshotError>;

    /// Evaluate `script` and read the result as a boolean.
    async fn evaluate_bool(&mut self, script: &str) -> Result<bool, SnapshotError>;

    /// Serialized DOM of the current document.
    async fn content(&mut self) -> Result<String, SnapshotError>;

    async fn close(self) -> Result<(), SnapshotError>;
}
