//! Quire - markdown page generator and headless prerenderer for single-page blogs.

mod cli;
mod compiler;
mod config;
mod discover;
mod logger;
mod markdown;
mod page;
mod serve;
mod snapshot;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Generate { clean } => {
            let report = cli::generate::generate(&config, *clean)?;
            log!("done"; "{}", report.summary());
            Ok(())
        }
        Commands::Routes { json } => cli::routes::list_routes(&config, *json),
        Commands::Prerender { .. } => {
            let report = cli::prerender::prerender(&config)?;
            log!("done"; "{}", report.summary());
            Ok(())
        }
        Commands::Serve { .. } => cli::serve::serve_dist(&config),
    }
}
