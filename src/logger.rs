//! Terminal logging with colored module prefixes.
//!
//! Everything here writes to stderr so stdout stays clean for command
//! output such as `quire routes --json`.
//!
//! - `log!("module"; ...)` - always printed
//! - `debug!("module"; ...)` - printed with `--verbose`
//! - [`ProgressLine`] - in-place counters while a pass runs
//!
//! ```ignore
//! log!("snapshot"; "{}: not ready after {}ms", route, ms);
//!
//! let progress = ProgressLine::new("generate", &[("markdown", 10)]);
//! progress.inc("markdown");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::io::{IsTerminal, Write, stderr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Progress lines currently drawn; a log line must clear them first.
static ACTIVE_PROGRESS: AtomicUsize = AtomicUsize::new(0);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Print `[module] message`, clearing any progress line underneath.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut err = stderr().lock();

    if ACTIVE_PROGRESS.load(Ordering::SeqCst) > 0 && err.is_terminal() {
        execute!(err, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }
    writeln!(err, "{prefix} {message}").ok();
    err.flush().ok();
}

fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold().to_string(),
        "snapshot" => prefix.bright_cyan().bold().to_string(),
        "generate" | "done" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "warning" => prefix.yellow().bold().to_string(),
        _ => prefix.bright_magenta().bold().to_string(),
    }
}

/// Counters redrawn in place on one line: `[generate] markdown(5/10)`.
///
/// Shared by rayon workers and snapshot workers alike. Updates use
/// `try_lock`, so a busy display skips a redraw instead of blocking. When
/// stderr is not a terminal only the final line is printed.
pub struct ProgressLine {
    module: &'static str,
    counters: Vec<Counter>,
    redraw: Mutex<()>,
    interactive: bool,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Counters with a zero total are left out.
    pub fn new(module: &'static str, items: &[(&'static str, usize)]) -> Self {
        let counters = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|&(name, total)| Counter {
                name,
                total,
                current: AtomicUsize::new(0),
            })
            .collect();

        let progress = Self {
            module,
            counters,
            redraw: Mutex::new(()),
            interactive: stderr().is_terminal(),
        };
        if progress.interactive {
            ACTIVE_PROGRESS.fetch_add(1, Ordering::SeqCst);
            progress.draw(false);
        }
        progress
    }

    pub fn inc(&self, name: &str) {
        let Some(counter) = self.counters.iter().find(|c| c.name == name) else {
            return;
        };
        counter.current.fetch_add(1, Ordering::Relaxed);
        if self.interactive && self.redraw.try_lock().is_some() {
            self.draw(false);
        }
    }

    fn line(&self) -> String {
        self.counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.current.load(Ordering::Relaxed), c.total))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn draw(&self, newline: bool) {
        let prefix = colorize_prefix(self.module);
        let mut err = stderr().lock();
        if self.interactive {
            execute!(err, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        }
        if newline {
            writeln!(err, "{} {}", prefix, self.line()).ok();
        } else {
            write!(err, "{} {}", prefix, self.line()).ok();
        }
        err.flush().ok();
    }

    /// Leave the final counts on their own line.
    pub fn finish(self) {
        if !self.counters.is_empty() {
            let _guard = self.redraw.lock();
            self.draw(true);
        }
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        if !self.interactive {
            return;
        }
        ACTIVE_PROGRESS.fetch_sub(1, Ordering::SeqCst);
        // Unfinished counters are wiped; after `finish` the line is empty
        let mut err = stderr().lock();
        execute!(err, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        err.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line_skips_empty_counters() {
        let progress = ProgressLine::new("generate", &[("markdown", 3), ("assets", 0)]);
        assert_eq!(progress.counters.len(), 1);
        progress.inc("markdown");
        progress.inc("unknown");
        assert_eq!(progress.line(), "markdown(1/3)");
    }

    #[test]
    fn test_progress_line_counts_all_counters() {
        let progress = ProgressLine::new("snapshot", &[("routes", 2), ("sitemap", 1)]);
        progress.inc("routes");
        progress.inc("routes");
        assert_eq!(progress.line(), "routes(2/2) sitemap(0/1)");
    }

    #[test]
    fn test_verbose_flag_roundtrip() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
