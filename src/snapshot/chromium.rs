//! Headless Chromium over the DevTools protocol.

use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{Browser, BrowserPage, SnapshotError};
use crate::config::section::PrerenderConfig;
use crate::debug;

pub struct ChromiumBrowser {
    browser: chromiumoxide::Browser,
    /// Drives the CDP connection; ends once the browser is gone.
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch headless Chromium sized to the configured viewport.
    pub async fn launch(config: &PrerenderConfig) -> Result<Self, SnapshotError> {
        let viewport = Viewport {
            width: config.viewport.width,
            height: config.viewport.height,
            ..Default::default()
        };
        let mut builder = BrowserConfig::builder()
            .window_size(viewport.width, viewport.height)
            .viewport(viewport);
        if let Some(path) = config.browser_path() {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(SnapshotError::BrowserLaunch)?;

        let (browser, mut handler) = chromiumoxide::Browser::launch(browser_config)
            .await
            .map_err(|e| SnapshotError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("snapshot"; "browser event: {}", e);
                }
            }
        });

        Ok(Self { browser, handler })
    }
}

impl Browser for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<ChromiumPage, SnapshotError> {
        let page = self.browser.new_page("about:blank").await.map_err(page_error)?;
        Ok(ChromiumPage { page })
    }

    async fn close(mut self) -> Result<(), SnapshotError> {
        let closed = self.browser.close().await.map_err(page_error);
        let _ = self.browser.wait().await;
        let _ = self.handler.await;
        closed.map(drop)
    }
}

pub struct ChromiumPage {
    page: Page,
}

impl BrowserPage for ChromiumPage {
    async fn goto(&mut self, url: &str) -> Result<(), SnapshotError> {
        self.page.goto(url).await.map_err(page_error)?;
        self.page.wait_for_navigation().await.map_err(page_error)?;
        Ok(())
    }

    async fn evaluate_bool(&mut self, script: &str) -> Result<bool, SnapshotError> {
        self.page
            .evaluate(script)
            .await
            .map_err(page_error)?
            .into_value::<bool>()
            .map_err(|e| SnapshotError::Page(e.to_string()))
    }

    async fn content(&mut self) -> Result<String, SnapshotError> {
        self.page.content().await.map_err(page_error)
    }

    async fn close(self) -> Result<(), SnapshotError> {
        self.page.close().await.map_err(page_error)
    }
}

fn page_error(e: chromiumoxide::error::CdpError) -> SnapshotError {
    SnapshotError::Page(e.to_string())
}
