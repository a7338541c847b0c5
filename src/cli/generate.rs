//! `quire generate`: compile every document and write the manifest.
//!
//! Phases:
//! - **Collect** - eligible markdown files under the content root
//! - **Compile** - parallel per-document compilation (rayon)
//! - **Register** - manifest insertion in file order, duplicates reported
//! - **Write** - `pages/<identifier>.{json,html}` and `manifest.json`
//!
//! Per-document failures become warning diagnostics; only failures of the
//! pass itself (missing content root, unwritable output) return `Err`.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::{CompiledDocument, collect_documents, compile_document};
use crate::config::SiteConfig;
use crate::logger::ProgressLine;
use crate::markdown::MarkdownRenderer;
use crate::page::{PostManifest, Route, RoutedPage};
use crate::utils::plural_count;
use crate::{debug, log};

/// A per-document problem that did not stop the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub documents: usize,
    pub written: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the generation pass.
pub fn generate(config: &SiteConfig, clean: bool) -> Result<GenerateReport> {
    let content = &config.build.content;
    if !content.is_dir() {
        bail!("content directory `{}` does not exist", content.display());
    }

    let pages_dir = config.build.pages_dir();
    if clean && pages_dir.exists() {
        fs::remove_dir_all(&pages_dir)
            .with_context(|| format!("failed to clean {}", pages_dir.display()))?;
    }
    fs::create_dir_all(&pages_dir)
        .with_context(|| format!("failed to create {}", pages_dir.display()))?;

    let files = collect_documents(&config.build);
    let renderer = MarkdownRenderer::new(config.markdown);
    let mut report = GenerateReport {
        documents: files.len(),
        ..Default::default()
    };

    let progress = ProgressLine::new("generate", &[("markdown", files.len())]);
    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let result = compile_document(&renderer, path);
            progress.inc("markdown");
            result
        })
        .collect();
    progress.finish();

    let mut manifest = PostManifest::new();
    let mut identifiers = FxHashSet::default();
    let mut accepted: Vec<CompiledDocument> = Vec::with_capacity(results.len());

    for (path, result) in files.iter().zip(results) {
        let mut doc = match result {
            Ok(doc) => doc,
            Err(e) => {
                report.warn(config, path, format!("{e:#}"));
                continue;
            }
        };

        // Same rule as route discovery
        let Some(route) = Route::parse(&doc.meta.route) else {
            let message = format!("invalid route `{}`, skipped", doc.meta.route);
            report.warn(config, path, message);
            continue;
        };
        doc.meta.route = route.as_str().to_string();
        doc.page.route = doc.meta.route.clone();

        if !identifiers.insert(doc.meta.identifier.clone()) {
            let message = format!("identifier `{}` already generated, skipped", doc.meta.identifier);
            report.warn(config, path, message);
            continue;
        }
        if let Err(existing) = manifest.insert(doc.meta.clone()) {
            let message = format!(
                "route `{}` already claimed by `{}`, skipped",
                doc.meta.route, existing.identifier
            );
            report.warn(config, path, message);
            continue;
        }
        accepted.push(doc);
    }

    accepted
        .par_iter()
        .try_for_each(|doc| write_artifact(&pages_dir, &doc.page))?;
    report.written = accepted.len();

    manifest.write(&config.build.output)?;
    debug!("generate"; "manifest: {}", plural_count(manifest.len(), "route"));

    Ok(report)
}

impl GenerateReport {
    fn warn(&mut self, config: &SiteConfig, file: &Path, message: String) {
        log!("warning"; "{}: {}", config.root_relative(file).display(), message);
        self.diagnostics.push(Diagnostic {
            file: file.to_path_buf(),
            message,
        });
    }

    /// One-line outcome, e.g. `generated 3 pages, 1 warning`.
    pub fn summary(&self) -> String {
        let mut line = format!("generated {}", plural_count(self.written, "page"));
        if !self.diagnostics.is_empty() {
            line.push_str(", ");
            line.push_str(&plural_count(self.diagnostics.len(), "warning"));
        }
        line
    }
}

/// Write `<identifier>.json` and `<identifier>.html`.
fn write_artifact(dir: &Path, page: &RoutedPage) -> Result<()> {
    let json_path = dir.join(format!("{}.json", page.identifier));
    let json = serde_json::to_string_pretty(page)
        .with_context(|| format!("failed to serialize {}", page.route))?;
    fs::write(&json_path, json)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let html_path = dir.join(format!("{}.html", page.identifier));
    fs::write(&html_path, page.to_html())
        .with_context(|| format!("failed to write {}", html_path.display()))
}
