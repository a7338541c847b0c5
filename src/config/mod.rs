//! Site configuration management for `quire.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [site], [build], [prerender]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file discovery
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `[site]`       | Public URL (sitemap)                           |
//! | `[build]`      | Content/output roots, extensions, private names |
//! | `[markdown]`   | Markdown dialect extensions                    |
//! | `[prerender]`  | Local server, browser, readiness and timeouts  |
//!
//! A missing config file is not an error: defaults apply and the current
//! directory becomes the project root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildSectionConfig, PrerenderConfig, SiteSectionConfig, Viewport};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands, PrerenderArgs},
    debug, log,
    markdown::MarkdownOptions,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing quire.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub markdown: MarkdownOptions,

    #[serde(default)]
    pub prerender: PrerenderConfig,
}

impl SiteConfig {
    /// Load configuration for the parsed command line.
    ///
    /// Searches upward from cwd for the config file; the project root is
    /// the directory containing it.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.config_path = config_path;
        config.finalize(cli, &root);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Resolve paths against `root` and apply command-line overrides.
    fn finalize(&mut self, cli: &Cli, root: &Path) {
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.apply_command_options(cli);
        self.normalize_paths(root);
    }

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Prerender { args } => self.apply_prerender_args(args),
            Commands::Serve {
                dist,
                interface,
                port,
            } => {
                Self::update_option(&mut self.prerender.dist, dist.as_ref());
                Self::update_option(&mut self.prerender.interface, interface.as_ref());
                Self::update_option(&mut self.prerender.port, port.as_ref());
            }
            Commands::Generate { .. } | Commands::Routes { .. } => {}
        }
    }

    fn apply_prerender_args(&mut self, args: &PrerenderArgs) {
        let p = &mut self.prerender;
        Self::update_option(&mut p.dist, args.dist.as_ref());
        Self::update_option(&mut p.port, args.port.as_ref());
        Self::update_option(&mut p.concurrency, args.concurrency.as_ref());
        Self::update_option(&mut p.navigation_timeout_ms, args.nav_timeout.as_ref());
        Self::update_option(&mut p.ready_timeout_ms, args.ready_timeout.as_ref());
        Self::update_option(&mut p.strict_navigation, args.strict.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Make every configured path absolute, relative to `root`.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);

        self.build.content = normalize_path(&root.join(&self.build.content));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.prerender.dist = normalize_path(&root.join(&self.prerender.dist));
        if !self.prerender.output.as_os_str().is_empty() {
            self.prerender.output = normalize_path(&root.join(&self.prerender.output));
        }
        if self.prerender.browser.is_relative() && !self.prerender.browser.as_os_str().is_empty()
        {
            self.prerender.browser = root.join(&self.prerender.browser);
        }

        self.root = root;
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.site.validate(&mut diag);
        self.build.validate(&mut diag);
        self.prerender.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

/// Parse a config snippet. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parse a config snippet and resolve its paths against `root`.
#[cfg(test)]
pub fn test_config_in(root: &Path, content: &str) -> SiteConfig {
    let mut config = test_parse_config(content);
    config.config_path = root.join("quire.toml");
    config.normalize_paths(root);
    config
}
