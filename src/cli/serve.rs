//! `quire serve`: serve the built app until Ctrl+C.

use anyhow::{Result, anyhow, bail};

use crate::config::SiteConfig;
use crate::{log, serve};

pub fn serve_dist(config: &SiteConfig) -> Result<()> {
    let p = &config.prerender;
    if !p.dist.is_dir() {
        bail!("dist directory `{}` does not exist", config.root_relative(&p.dist).display());
    }

    let handle = serve::start(&p.dist, p.interface, p.port)?;
    let server = handle.server();
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server.unblock();
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))?;

    log!("serve"; "{} (Ctrl+C to stop)", handle.base_url());
    handle.wait();
    Ok(())
}
