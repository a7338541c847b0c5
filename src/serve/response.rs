//! HTTP response handlers.

use anyhow::{Context, Result};
use std::fs;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::path::Resolved;
use crate::utils::mime::{self, types::PLAIN};

/// Respond with a resolved static file.
pub fn respond_file(request: Request, file: &Resolved) -> Result<()> {
    // `app.wasm.gz` is served as `application/wasm` with gzip encoding
    let content_type = mime::from_path(&file.path);
    let encoding = file.encoding.map(|e| e.header_value());

    if is_head_request(&request) {
        return send(request, 200, content_type, encoding, Vec::new());
    }

    let body = fs::read(&file.path)
        .with_context(|| format!("Failed to read {}", file.path.display()))?;
    send(request, 200, content_type, encoding, body)
}

/// Respond with a plain 404 (no root index to fall back to).
pub fn respond_not_found(request: Request) -> Result<()> {
    send(request, 404, PLAIN, None, b"404 Not Found".to_vec())
}

/// Respond with 405 for anything but GET/HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send(request, 405, PLAIN, None, b"405 Method Not Allowed".to_vec())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send(
    request: Request,
    status: u16,
    content_type: &'static str,
    encoding: Option<&'static str>,
    body: Vec<u8>,
) -> Result<()> {
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-cache"));
    if let Some(encoding) = encoding {
        response = response.with_header(make_header("Content-Encoding", encoding));
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    // Static ASCII names and values always form a valid header
    Header::from_bytes(key, value).unwrap()
}
