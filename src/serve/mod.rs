//! Local static server for a built single-page app.
//!
//! Serves the dist directory on a background thread so the snapshot driver
//! can navigate a headless browser to it. The server lives exactly as long
//! as its [`ServerHandle`]: dropping the handle unblocks the accept loop and
//! joins the thread, on success and on error paths alike.

mod path;
mod response;

use path::resolve_or_fallback;

use crate::{debug, log};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tiny_http::{Method, Request, Server};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Worker threads answering requests.
const REQUEST_THREADS: usize = 4;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind after {attempts} attempts (ports {first}-{last}): {message}")]
    Bind {
        attempts: u16,
        first: u16,
        last: u16,
        message: String,
    },

    #[error("failed to create request thread pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn server thread")]
    Spawn(#[source] std::io::Error),
}

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr), ServeError> {
    let mut last_error = String::new();
    let mut last_port = base_port;

    for offset in 0..MAX_PORT_RETRIES {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::new(interface, port);
        last_port = port;

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                // Port 0 asks the OS for a free port
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(ServeError::Bind {
        attempts: last_port - base_port + 1,
        first: base_port,
        last: last_port,
        message: last_error,
    })
}

/// Running server. Dropping it stops the server.
pub struct ServerHandle {
    server: Arc<Server>,
    addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// The bound address (port may differ from the requested one).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL a local client should use, e.g. `http://127.0.0.1:5000`.
    ///
    /// Wildcard binds are reached through loopback.
    pub fn base_url(&self) -> String {
        let ip = match self.addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        format!("http://{}", SocketAddr::new(ip, self.addr.port()))
    }

    /// Shared server, for unblocking it from a signal handler.
    pub fn server(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Block until the server is unblocked elsewhere (e.g. Ctrl+C).
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        debug!("serve"; "stopped http://{}", self.addr);
    }
}

/// Bind and start serving `root` on a background thread.
pub fn start(root: &Path, interface: IpAddr, port: u16) -> Result<ServerHandle, ServeError> {
    let (server, addr) = bind_with_retry(interface, port)?;
    let server = Arc::new(server);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("quire-serve-{i}"))
        .build()?;

    log!("serve"; "http://{} serving {}", addr, root.display());

    let root = Arc::new(root.to_path_buf());
    let loop_server = Arc::clone(&server);
    let thread = thread::Builder::new()
        .name("quire-serve".into())
        .spawn(move || run_request_loop(&loop_server, &pool, &root))
        .map_err(ServeError::Spawn)?;

    Ok(ServerHandle {
        server,
        addr,
        thread: Some(thread),
    })
}

fn run_request_loop(server: &Server, pool: &rayon::ThreadPool, root: &Arc<PathBuf>) {
    for request in server.incoming_requests() {
        let root = Arc::clone(root);
        pool.spawn(move || {
            let url = request.url().to_string();
            if let Err(e) = handle_request(request, &root) {
                log!("serve"; "{}: request error: {:#}", url, e);
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path) -> anyhow::Result<()> {
    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    match resolve_or_fallback(request.url(), root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use tempfile::TempDir;

    fn get(addr: SocketAddr, method: &str, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
        let head = response.split("\r\n\r\n").next()?;
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").map_or("", |(_, b)| b)
    }

    fn dist() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<div id=\"app\">Loading...</div>").unwrap();
        fs::write(dir.path().join("app.css"), "body{}").unwrap();
        fs::write(dir.path().join("app.wasm"), "raw").unwrap();
        fs::write(dir.path().join("app.wasm.gz"), "gzipped").unwrap();
        dir
    }

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn test_serves_root_and_files() {
        let dir = dist();
        let server = start(dir.path(), localhost(), 0).unwrap();

        let root = get(server.addr(), "GET", "/");
        assert!(root.starts_with("HTTP/1.1 200"));
        assert_eq!(header(&root, "content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(body(&root), "<div id=\"app\">Loading...</div>");

        let css = get(server.addr(), "GET", "/app.css");
        assert_eq!(header(&css, "content-type"), Some("text/css; charset=utf-8"));
        assert_eq!(body(&css), "body{}");
    }

    #[test]
    fn test_prefers_precompressed_variant() {
        let dir = dist();
        let server = start(dir.path(), localhost(), 0).unwrap();

        let wasm = get(server.addr(), "GET", "/app.wasm");
        assert_eq!(header(&wasm, "content-encoding"), Some("gzip"));
        assert_eq!(header(&wasm, "content-type"), Some("application/wasm"));
        assert_eq!(body(&wasm), "gzipped");
    }

    #[test]
    fn test_spa_fallback_and_not_found() {
        let dir = dist();
        let server = start(dir.path(), localhost(), 0).unwrap();
        let routed = get(server.addr(), "GET", "/posts/my-first-post");
        assert!(routed.starts_with("HTTP/1.1 200"));
        assert!(body(&routed).contains("Loading..."));

        let empty = TempDir::new().unwrap();
        let server = start(empty.path(), localhost(), 0).unwrap();
        let missing = get(server.addr(), "GET", "/anything");
        assert!(missing.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_rejects_other_methods() {
        let dir = dist();
        let server = start(dir.path(), localhost(), 0).unwrap();
        let post = get(server.addr(), "POST", "/");
        assert!(post.starts_with("HTTP/1.1 405"));
    }

    #[test]
    fn test_bind_retries_next_port() {
        let (first, addr) = bind_with_retry(localhost(), 0).unwrap();
        let (_second, next) = bind_with_retry(localhost(), addr.port()).unwrap();
        assert_ne!(next.port(), addr.port());
        drop(first);
    }

    #[test]
    fn test_wait_returns_after_unblock() {
        let dir = dist();
        let server = start(dir.path(), localhost(), 0).unwrap();
        server.server().unblock();
        server.wait();
    }

    #[test]
    fn test_base_url_uses_loopback_for_wildcard() {
        let dir = dist();
        let server = start(dir.path(), IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0).unwrap();
        assert_eq!(
            server.base_url(),
            format!("http://127.0.0.1:{}", server.addr().port())
        );
    }
}
