//! Post metadata resolved from the file name and frontmatter.
//!
//! # Resolution
//!
//! | Field        | Filename default                          | Frontmatter override |
//! |--------------|-------------------------------------------|----------------------|
//! | `title`      | slug with `-` → space                     | `title`              |
//! | `slug`       | name after the `YYYY-MM-DD-` prefix       | `slug`               |
//! | `date`       | prefix date, else [`DateTimeUtc::UNSET`]  | `date` (if parsable) |
//! | `tags`       | empty                                     | `tags`               |
//! | `route`      | `/posts/<slug>`                           | `page`               |
//! | `identifier` | `_YYYY_MM_DD_<slug without ->`            | -                    |
//!
//! Resolution is pure: the same inputs always produce the same record.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::markdown::Frontmatter;
use crate::utils::date::DateTimeUtc;

/// Prefix of routes that denote blog posts.
pub const POSTS_PREFIX: &str = "/posts/";

/// `YYYY-MM-DD-rest`
static DATED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})-(.+)$").unwrap());

/// Canonical metadata of one generated page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostMetadata {
    pub title: String,
    pub slug: String,
    /// Stable identifier derived from the file name (artifact file name).
    pub identifier: String,
    pub route: String,
    pub date: DateTimeUtc,
    /// Raw `tags` value, comma separated.
    #[serde(default)]
    pub tags: String,
    /// Whether listings should treat this page as a blog post.
    pub is_post: bool,
}

impl PostMetadata {
    /// Resolve metadata for a document named `stem` (no extension).
    pub fn resolve(stem: &str, frontmatter: &Frontmatter) -> Self {
        let mut meta = Self::from_file_name(stem);

        if let Some(title) = frontmatter.get("title") {
            meta.title = title.to_string();
        }
        if let Some(date) = frontmatter.get("date").and_then(DateTimeUtc::parse) {
            meta.date = date;
        }
        if let Some(slug) = frontmatter.get("slug") {
            meta.slug = slug.to_string();
        }
        if let Some(tags) = frontmatter.get("tags") {
            meta.tags = tags.to_string();
        }

        meta.route = match frontmatter.get("page") {
            Some(page) => page.to_string(),
            None => format!("{POSTS_PREFIX}{}", meta.slug),
        };
        meta.is_post = meta.route.starts_with(POSTS_PREFIX);
        meta
    }

    /// Defaults derived from the file name alone.
    fn from_file_name(stem: &str) -> Self {
        let (date, slug, identifier) = match DATED_NAME.captures(stem) {
            Some(caps) => {
                let (y, m, d, rest) = (&caps[1], &caps[2], &caps[3], &caps[4]);
                let date = parse_ymd(y, m, d).unwrap_or(DateTimeUtc::UNSET);
                let identifier = sanitize_identifier(&format!("_{y}_{m}_{d}_{}", rest.replace('-', "")));
                (date, rest.to_string(), identifier)
            }
            None => (
                DateTimeUtc::UNSET,
                stem.to_string(),
                sanitize_identifier(&stem.replace('-', "")),
            ),
        };

        Self {
            title: slug.replace('-', " "),
            route: format!("{POSTS_PREFIX}{slug}"),
            slug,
            identifier,
            date,
            tags: String::new(),
            is_post: true,
        }
    }
}

fn parse_ymd(y: &str, m: &str, d: &str) -> Option<DateTimeUtc> {
    DateTimeUtc::checked_ymd(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// Reduce a name to `[A-Za-z0-9_]`, transliterating non-ASCII first.
///
/// A leading digit gets a `_` prefix so the result is a valid identifier.
fn sanitize_identifier(name: &str) -> String {
    let ascii = deunicode::deunicode(name);
    let mut out: String = ascii
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
