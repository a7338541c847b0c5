//! Configuration section definitions.
//!
//! Each module corresponds to a section in `quire.toml`:
//!
//! | Module      | TOML Section   | Purpose                              |
//! |-------------|----------------|--------------------------------------|
//! | `build`     | `[build]`      | Content/output paths, document types |
//! | `prerender` | `[prerender]`  | Local server and snapshot capture    |
//! | `site`      | `[site]`       | Public site URL                      |
//!
//! `[markdown]` reuses [`crate::markdown::MarkdownOptions`] directly.

pub mod build;
mod prerender;
mod site;

pub use build::BuildSectionConfig;
pub use prerender::{PrerenderConfig, Viewport};
pub use site::SiteSectionConfig;
