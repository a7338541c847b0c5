//! Build-time page registry (`manifest.json`).
//!
//! Listing and navigation read this file instead of inspecting compiled
//! pages: `pages` maps every route to its metadata, `posts` is the ordered
//! blog index derived from the entries flagged `is_post`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::meta::PostMetadata;
use crate::utils::date::DateTimeUtc;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Listing entry for one blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub url: String,
    pub timestamp: DateTimeUtc,
}

impl From<&PostMetadata> for BlogPost {
    fn from(meta: &PostMetadata) -> Self {
        Self {
            title: meta.title.clone(),
            url: meta.route.clone(),
            timestamp: meta.date,
        }
    }
}

/// Route → metadata registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostManifest {
    pages: BTreeMap<String, PostMetadata>,
    #[serde(default)]
    posts: Vec<BlogPost>,
}

impl PostManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page. The first registration of a route wins.
    ///
    /// Returns the metadata already holding the route when rejected.
    pub fn insert(&mut self, meta: PostMetadata) -> Result<(), &PostMetadata> {
        use std::collections::btree_map::Entry;

        match self.pages.entry(meta.route.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(meta);
                self.posts.clear();
                Ok(())
            }
            Entry::Occupied(slot) => Err(slot.into_mut()),
        }
    }

    pub fn get(&self, route: &str) -> Option<&PostMetadata> {
        self.pages.get(route)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> impl Iterator<Item = &PostMetadata> {
        self.pages.values()
    }

    /// Blog posts, newest first, ties broken by route.
    pub fn posts(&self) -> Vec<BlogPost> {
        let mut posts: Vec<_> = self.pages.values().filter(|m| m.is_post).collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.route.cmp(&b.route)));
        posts.into_iter().map(BlogPost::from).collect()
    }

    /// Write `manifest.json` into `dir`, refreshing the post index.
    pub fn write(&mut self, dir: &Path) -> Result<()> {
        self.posts = self.posts();
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).context("failed to serialize manifest")?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Read `manifest.json` from `dir`, if it exists.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest = serde_json::from_str(&json)
            .with_context(|| format!("invalid manifest {}", path.display()))?;
        Ok(Some(manifest))
    }
}
