//! Per-route capture driven over a bounded pool of browser pages.
//!
//! Workers share one route queue; each owns a single page and takes the
//! next route once its current capture is written. The root snapshot is
//! written after every worker is done: the server answers unknown paths
//! with the root `index.html`, so replacing it early would hand the
//! prerendered home page to routes still being captured.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, timeout};

use super::output::{write_not_found, write_snapshot};
use super::{Browser, BrowserPage, RouteState, SnapshotError};
use crate::config::section::PrerenderConfig;
use crate::logger::ProgressLine;
use crate::page::Route;
use crate::utils::plural_count;
use crate::{debug, log};

/// Everything the driver needs, resolved from `[prerender]`.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Where the local server answers, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    pub output: PathBuf,
    pub mount_selector: String,
    pub loading_text: String,
    pub navigation_timeout: Duration,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    pub concurrency: usize,
    pub strict_navigation: bool,
}

impl DriverOptions {
    pub fn from_config(config: &PrerenderConfig, output: PathBuf, base_url: String) -> Self {
        Self {
            base_url,
            output,
            mount_selector: config.mount_selector.clone(),
            loading_text: config.loading_text.clone(),
            navigation_timeout: config.navigation_timeout(),
            ready_timeout: config.ready_timeout(),
            poll_interval: config.poll_interval(),
            concurrency: config.concurrency,
            strict_navigation: config.strict_navigation,
        }
    }

    fn url(&self, route: &Route) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), route)
    }

    /// `true` once the mount node exists and no longer shows the
    /// loading text. Empty loading text only checks for the node.
    fn readiness_script(&self) -> String {
        let selector = serde_json::Value::from(self.mount_selector.as_str());
        let loading = serde_json::Value::from(self.loading_text.as_str());
        format!(
            "(() => {{ const el = document.querySelector({selector}); \
             if (!el) return false; const text = {loading}; \
             return text === '' || !el.textContent.includes(text); }})()"
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub route: Route,
    /// [`RouteState::Captured`] or [`RouteState::TimedOut`].
    pub state: RouteState,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct SnapshotReport {
    /// In route order.
    pub outcomes: Vec<RouteOutcome>,
    pub not_found: Option<PathBuf>,
}

impl SnapshotReport {
    pub fn timed_out(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == RouteState::TimedOut)
            .count()
    }

    pub fn captured_routes(&self) -> impl Iterator<Item = &Route> {
        self.outcomes.iter().map(|o| &o.route)
    }

    pub fn summary(&self) -> String {
        format!(
            "captured {}, {}",
            plural_count(self.outcomes.len(), "route"),
            plural_count(self.timed_out(), "readiness timeout")
        )
    }
}

/// Captured page waiting to be written.
struct Capture {
    outcome: RouteOutcome,
    html: String,
}

/// Shared between workers. Guards are never held across an await.
struct Shared {
    queue: Mutex<VecDeque<(usize, Route)>>,
    done: Mutex<Vec<(usize, RouteOutcome)>>,
    root_html: Mutex<Option<String>>,
}

/// Capture every route, then write `404.html`.
///
/// The browser is left open; closing it is up to the caller so it happens
/// on error paths too.
pub async fn run<B: Browser>(
    browser: &B,
    routes: &[Route],
    options: &DriverOptions,
) -> Result<SnapshotReport, SnapshotError> {
    let progress = ProgressLine::new("snapshot", &[("routes", routes.len())]);
    let shared = Shared {
        queue: Mutex::new(routes.iter().cloned().enumerate().collect()),
        done: Mutex::new(Vec::with_capacity(routes.len())),
        root_html: Mutex::new(None),
    };
    let script = options.readiness_script();

    let workers = options.concurrency.max(1).min(routes.len());
    debug!("snapshot"; "{} over {}", plural_count(routes.len(), "route"), plural_count(workers, "page"));

    let jobs = (0..workers).map(|_| worker(browser, &shared, &progress, options, &script));
    futures::future::try_join_all(jobs).await?;
    progress.finish();

    let mut outcomes = shared.done.into_inner();
    outcomes.sort_by_key(|(index, _)| *index);
    let outcomes = outcomes.into_iter().map(|(_, outcome)| outcome).collect();

    let root_html = shared.root_html.into_inner();
    if let Some(html) = &root_html {
        write_snapshot(&options.output, &Route::root(), html)?;
    }
    let not_found = write_not_found(&options.output, root_html.as_deref())?;

    Ok(SnapshotReport {
        outcomes,
        not_found,
    })
}

async fn worker<B: Browser>(
    browser: &B,
    shared: &Shared,
    progress: &ProgressLine,
    options: &DriverOptions,
    script: &str,
) -> Result<(), SnapshotError> {
    let mut page = browser.new_page().await?;
    let result = drain_queue(&mut page, shared, progress, options, script).await;
    let closed = page.close().await;
    result.and(closed)
}

async fn drain_queue<P: BrowserPage>(
    page: &mut P,
    shared: &Shared,
    progress: &ProgressLine,
    options: &DriverOptions,
    script: &str,
) -> Result<(), SnapshotError> {
    loop {
        let next = shared.queue.lock().pop_front();
        let Some((index, route)) = next else {
            return Ok(());
        };

        let capture = capture_route(page, route, options, script).await?;
        if capture.outcome.route.is_root() {
            *shared.root_html.lock() = Some(capture.html);
        } else {
            write_snapshot(&options.output, &capture.outcome.route, &capture.html)?;
        }

        progress.inc("routes");
        shared.done.lock().push((index, capture.outcome));
    }
}

/// `Pending -> Navigating -> WaitingForReady -> Captured | TimedOut`
async fn capture_route<P: BrowserPage>(
    page: &mut P,
    route: Route,
    options: &DriverOptions,
    script: &str,
) -> Result<Capture, SnapshotError> {
    let mut state = RouteState::Pending;
    debug!("snapshot"; "{}: {}", route, state);

    state = RouteState::Navigating;
    debug!("snapshot"; "{}: {}", route, state);
    match timeout(options.navigation_timeout, page.goto(&options.url(&route))).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(SnapshotError::Navigation {
                route,
                message: e.to_string(),
            });
        }
        Err(_) => {
            let timeout_ms = millis(options.navigation_timeout);
            if options.strict_navigation {
                return Err(SnapshotError::NavigationTimeout { route, timeout_ms });
            }
            log!("snapshot"; "{}: navigation timed out after {}ms, capturing anyway", route, timeout_ms);
        }
    }

    state = RouteState::WaitingForReady;
    debug!("snapshot"; "{}: {}", route, state);
    state = match timeout(options.ready_timeout, wait_until_ready(page, script, options.poll_interval)).await {
        Ok(()) => RouteState::Captured,
        Err(_) => {
            log!("snapshot"; "{}: not ready after {}ms, capturing current DOM", route, millis(options.ready_timeout));
            RouteState::TimedOut
        }
    };

    let html = match page.content().await {
        Ok(html) => html,
        Err(e) => {
            return Err(SnapshotError::Capture {
                route,
                message: e.to_string(),
            });
        }
    };
    debug!("snapshot"; "{}: {}", route, state);

    let path = route.snapshot_path(&options.output);
    Ok(Capture {
        outcome: RouteOutcome { route, state, path },
        html,
    })
}

/// Poll the readiness predicate. Evaluation errors count as not ready.
async fn wait_until_ready<P: BrowserPage>(page: &mut P, script: &str, interval: Duration) {
    loop {
        if let Ok(true) = page.evaluate_bool(script).await {
            return;
        }
        sleep(interval).await;
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
