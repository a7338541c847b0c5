//! Small shared helpers: dates, HTML entities, MIME types, paths.

pub mod date;
pub mod html;
pub mod mime;
pub mod path;

/// Format count with noun, handling pluralization.
///
/// - `plural_count(0, "route")` -> `"0 routes"`
/// - `plural_count(1, "route")` -> `"1 route"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
