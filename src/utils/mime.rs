//! MIME type detection for the local static server.

use std::path::Path;

/// Common MIME type constants.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const WASM: &str = "application/wasm";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const EOT: &str = "application/vnd.ms-fontobject";
}

/// Guess MIME type from a file path.
///
/// A trailing `.gz` / `.br` compression suffix is ignored, so
/// `app.wasm.br` is reported as `application/wasm`.
pub fn from_path(path: &Path) -> &'static str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let name = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".br"))
        .unwrap_or(name);
    from_extension(Path::new(name).extension().and_then(|e| e.to_str()))
}

/// Guess MIME type from file extension string.
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs" | "cjs") => types::JAVASCRIPT,
        Some("json") => types::JSON,
        Some("xml") => types::XML,
        Some("txt") => types::PLAIN,
        Some("wasm") => types::WASM,
        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("ico") => types::ICO,
        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        Some("ttf") => types::TTF,
        Some("eot") => types::EOT,
        _ => types::OCTET_STREAM,
    }
}
