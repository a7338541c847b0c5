//! `quire routes`: print the prerender route list.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::debug;
use crate::discover::{RouteSet, discover_routes};
use crate::utils::plural_count;

pub fn list_routes(config: &SiteConfig, json: bool) -> Result<()> {
    let routes = discover_routes(config);
    debug!("routes"; "discovered {}", plural_count(routes.len(), "route"));
    println!("{}", render(routes, json)?);
    Ok(())
}

/// One route per line, or a JSON array.
fn render(routes: RouteSet, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(&routes.into_vec())?);
    }
    let lines: Vec<String> = routes.iter().map(ToString::to_string).collect();
    Ok(lines.join("\n"))
}
