//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Quire markdown blog generator and prerenderer
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory for generated artifacts (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Markdown content directory (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Config file path (default: quire.toml)
    #[arg(short = 'C', long, global = true, default_value = "quire.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile markdown documents into page artifacts and the manifest
    #[command(visible_alias = "g")]
    Generate {
        /// Remove previously generated pages first
        #[arg(long)]
        clean: bool,
    },

    /// List the routes the prerenderer would capture
    #[command(visible_alias = "r")]
    Routes {
        /// Print the route list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Capture static HTML snapshots of the built app with a headless browser
    #[command(visible_alias = "p")]
    Prerender {
        #[command(flatten)]
        args: PrerenderArgs,
    },

    /// Serve the built app locally until Ctrl+C
    #[command(visible_alias = "s")]
    Serve {
        /// Built app directory (overrides `prerender.dist`)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        dist: Option<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Prerender command arguments. Each one overrides `[prerender]`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PrerenderArgs {
    /// Built app directory to serve and snapshot
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dist: Option<PathBuf>,

    /// Port for the local static server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of routes captured at the same time
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Navigation timeout in milliseconds
    #[arg(long = "nav-timeout", value_name = "MS")]
    pub nav_timeout: Option<u64>,

    /// Readiness timeout in milliseconds
    #[arg(long = "ready-timeout", value_name = "MS")]
    pub ready_timeout: Option<u64>,

    /// Abort the run when a navigation times out
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub strict: Option<bool>,
}
