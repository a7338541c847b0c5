//! Page types: metadata, routing, artifacts, and the manifest.

mod artifact;
mod manifest;
mod meta;
mod route;

pub use artifact::{EmitError, RenderSegment, RoutedPage};
pub use manifest::{BlogPost, MANIFEST_FILE, PostManifest};
pub use meta::{POSTS_PREFIX, PostMetadata};
pub use route::Route;
