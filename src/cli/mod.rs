//! Command-line interface module.

mod args;
pub mod generate;
pub mod prerender;
pub mod routes;
pub mod serve;

pub use args::{Cli, Commands, PrerenderArgs};
