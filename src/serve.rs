//! HTTP server.
//!
//! A small blocking server built on `tiny_http`:
//!
//! - `GET /`: landing page
//! - `GET /blog`: blog index
//! - `GET /blog/{slug}`: post, or the not-found page for an unknown slug
//! - anything else: a file from `public_dir`, or the not-found page
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────┐
//!   requests ───▶ │ Arc<tiny_http::Server>│
//!                 └──────────┬───────────┘
//!          ┌─────────────────┼─────────────────┐
//!          ▼                 ▼                 ▼
//!      worker 0          worker 1   …      worker N-1
//!          └──────── route(&Site, …) ─────────┘
//! ```
//!
//! Workers share one immutable [`Site`]. Ctrl+C sets the shutdown flag and
//! unblocks every worker, which then exit; `serve_site` returns once all of
//! them have.
//!
//! [`route`] is a pure function of the site and the request line, so the
//! routing table is tested without opening a socket.

use crate::seo::resolve_origin;
use crate::site::Site;
use maud::Markup;
use percent_encoding::percent_decode_str;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("invalid server.interface '{0}'")]
    Interface(String),
    #[error("failed to bind after {attempts} attempts (ports {first}-{last}): {message}")]
    Bind {
        attempts: u16,
        first: u16,
        last: u16,
        message: String,
    },
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("failed to start worker thread: {0}")]
    Io(#[from] std::io::Error),
}

/// A routed response, before it is written to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(status: u16, page: Markup) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: page.into_string().into_bytes(),
        }
    }

    fn text(status: u16, text: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: text.as_bytes().to_vec(),
        }
    }
}

// ============================================================================
// Server Entry Point
// ============================================================================

/// Serve `site` until Ctrl+C.
pub fn serve_site(site: Arc<Site>) -> Result<(), ServeError> {
    let config = &site.config().server;
    let interface: IpAddr = config
        .interface
        .parse()
        .map_err(|_| ServeError::Interface(config.interface.clone()))?;
    let workers = crate::config::effective_threads(config);

    let (server, addr) = try_bind_port(interface, config.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);
    let shutdown = Arc::new(AtomicBool::new(false));

    {
        let server = Arc::clone(&server);
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            log::info!("shutting down...");
            shutdown.store(true, Ordering::SeqCst);
            for _ in 0..workers {
                server.unblock();
            }
        })?;
    }

    log::info!("serving on http://{addr} with {workers} workers");

    let mut handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let server = Arc::clone(&server);
        let shutdown = Arc::clone(&shutdown);
        let site = Arc::clone(&site);
        let handle = std::thread::Builder::new()
            .name(format!("folio-worker-{i}"))
            .spawn(move || worker_loop(&server, &site, &shutdown))?;
        handles.push(handle);
    }
    for handle in handles {
        if handle.join().is_err() {
            log::error!("a worker thread panicked");
        }
    }
    if let Some(stats) = site.compiler().cache_stats() {
        log::info!("compile cache: {stats}");
    }
    Ok(())
}

fn worker_loop(server: &Server, site: &Site, shutdown: &AtomicBool) {
    loop {
        match server.recv() {
            Ok(request) => {
                if let Err(e) = handle_request(site, request) {
                    log::warn!("failed to send response: {e}");
                }
            }
            Err(_) if shutdown.load(Ordering::SeqCst) => break,
            Err(e) => log::warn!("failed to receive request: {e}"),
        }
    }
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr), ServeError> {
    let mut last_error = String::new();
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log::warn!("port {base_port} in use, using {port} instead");
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(ServeError::Bind {
        attempts: max_retries,
        first: base_port,
        last: base_port.saturating_add(max_retries.saturating_sub(1)),
        message: last_error,
    })
}

// ============================================================================
// Request Handling
// ============================================================================

fn handle_request(site: &Site, request: Request) -> std::io::Result<()> {
    let forwarded = header_value(&request, "X-Forwarded-Host");
    let host = header_value(&request, "Host");
    let origin = resolve_origin(
        forwarded.as_deref(),
        host.as_deref(),
        &site.config().site.origin,
    );

    let reply = route(site, request.method(), request.url(), &origin);
    log::info!("{} {} {}", request.method(), request.url(), reply.status);

    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes("Content-Type", reply.content_type) {
        response = response.with_header(header);
    }
    request.respond(response)
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

/// Map a request line to a reply.
///
/// Query strings are ignored and a trailing slash matches the same route.
pub fn route(site: &Site, method: &Method, url: &str, origin: &str) -> Reply {
    if !matches!(method, Method::Get | Method::Head) {
        return Reply::text(405, "405 Method Not Allowed");
    }

    let raw_path = url.split(['?', '#']).next().unwrap_or_default();
    let Ok(path) = percent_decode_str(raw_path).decode_utf8() else {
        return Reply::html(404, site.not_found_page());
    };
    let trimmed = path.trim_end_matches('/');

    match trimmed {
        "" => Reply::html(200, site.home_page(origin)),
        "/blog" => Reply::html(200, site.blog_index(origin)),
        _ => match trimmed.strip_prefix("/blog/") {
            Some(slug) if !slug.contains('/') => post_reply(site, slug, origin),
            _ => static_reply(site, &path),
        },
    }
}

fn post_reply(site: &Site, slug: &str, origin: &str) -> Reply {
    match site.post_page(slug, origin) {
        Ok(page) => Reply::html(200, page),
        Err(e) if e.is_not_found() => Reply::html(404, site.not_found_page()),
        Err(e) => {
            log::error!("{e}");
            Reply::html(500, site.error_page(&e.to_string()))
        }
    }
}

fn static_reply(site: &Site, path: &str) -> Reply {
    let Some(file) = public_file(&site.config().public_dir, path) else {
        return Reply::html(404, site.not_found_page());
    };
    match fs::read(&file) {
        Ok(body) => Reply {
            status: 200,
            content_type: guess_content_type(&file),
            body,
        },
        Err(e) => {
            log::error!("failed to read {}: {e}", file.display());
            Reply::html(500, site.error_page("Failed to read file"))
        }
    }
}

/// Resolve a request path to a file under `public_dir`.
///
/// Only plain path segments are accepted, so `..` can never escape the
/// directory.
fn public_file(public_dir: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative.as_os_str().is_empty()
        || !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    let file = public_dir.join(relative);
    file.is_file().then_some(file)
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json" | "webmanifest") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("pdf") => "application/pdf",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::registry::PostRegistry;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    const ORIGIN: &str = "http://localhost:3000";

    fn test_site(public: &TempDir) -> Site {
        let fake = FakeCompiler::new()
            .with_post("src-a", raw("Alpha", "2024-01-01"))
            .with_post("src-b", raw("Beta", "2024-02-01"))
            .failing("src-broken");
        let registry =
            PostRegistry::from_sources([("a", "src-a"), ("b", "src-b"), ("broken", "src-broken")])
                .unwrap();
        let config = SiteConfig {
            public_dir: public.path().to_path_buf(),
            ..SiteConfig::default()
        };
        Site::with_compiler(config, registry, Arc::new(fake))
    }

    fn get(site: &Site, url: &str) -> Reply {
        route(site, &Method::Get, url, ORIGIN)
    }

    fn body(reply: &Reply) -> String {
        String::from_utf8_lossy(&reply.body).into_owned()
    }

    // =========================================================================
    // Pages
    // =========================================================================

    #[test]
    fn home_page() {
        let tmp = TempDir::new().unwrap();
        let reply = get(&test_site(&tmp), "/");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "text/html; charset=utf-8");
        assert!(body(&reply).contains("Beta"));
    }

    #[test]
    fn blog_index_ignores_trailing_slash_and_query() {
        let tmp = TempDir::new().unwrap();
        let site = test_site(&tmp);
        for url in ["/blog", "/blog/", "/blog?ref=twitter"] {
            let reply = get(&site, url);
            assert_eq!(reply.status, 200, "{url}");
            let html = body(&reply);
            assert!(html.contains("Alpha"));
            assert!(!html.contains("/blog/broken"));
        }
    }

    #[test]
    fn post_page_has_canonical_url_from_origin() {
        let tmp = TempDir::new().unwrap();
        let reply = get(&test_site(&tmp), "/blog/a/");
        assert_eq!(reply.status, 200);
        let html = body(&reply);
        assert!(html.contains("<h1>Alpha</h1>"));
        assert!(html.contains(r#"<link rel="canonical" href="http://localhost:3000/blog/a">"#));
    }

    #[test]
    fn unknown_slug_is_404_page() {
        let tmp = TempDir::new().unwrap();
        let reply = get(&test_site(&tmp), "/blog/nonexistent-slug");
        assert_eq!(reply.status, 404);
        assert!(body(&reply).contains("<title>Not found</title>"));
    }

    #[test]
    fn broken_post_is_500() {
        let tmp = TempDir::new().unwrap();
        let reply = get(&test_site(&tmp), "/blog/broken");
        assert_eq!(reply.status, 500);
        assert!(body(&reply).contains("broken"));
    }

    #[test]
    fn post_with_method_is_405() {
        let tmp = TempDir::new().unwrap();
        let reply = route(&test_site(&tmp), &Method::Post, "/blog", ORIGIN);
        assert_eq!(reply.status, 405);
    }

    #[test]
    fn head_is_routed_like_get() {
        let tmp = TempDir::new().unwrap();
        let reply = route(&test_site(&tmp), &Method::Head, "/blog", ORIGIN);
        assert_eq!(reply.status, 200);
    }

    // =========================================================================
    // Static files
    // =========================================================================

    #[test]
    fn serves_public_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("images")).unwrap();
        fs::write(tmp.path().join("robots.txt"), "User-agent: *").unwrap();
        fs::write(tmp.path().join("images/a b.svg"), "<svg/>").unwrap();
        let site = test_site(&tmp);

        let reply = get(&site, "/robots.txt");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "text/plain; charset=utf-8");
        assert_eq!(body(&reply), "User-agent: *");

        let reply = get(&site, "/images/a%20b.svg");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "image/svg+xml");
    }

    #[test]
    fn unknown_path_is_404() {
        let tmp = TempDir::new().unwrap();
        let reply = get(&test_site(&tmp), "/about");
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn path_traversal_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let public = tmp.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(tmp.path().join("secret.txt"), "nope").unwrap();
        let site = Site::with_compiler(
            SiteConfig {
                public_dir: public.clone(),
                ..SiteConfig::default()
            },
            PostRegistry::default(),
            Arc::new(FakeCompiler::new()),
        );

        assert_eq!(get(&site, "/../secret.txt").status, 404);
        assert_eq!(get(&site, "/%2e%2e/secret.txt").status, 404);
        assert!(public_file(&public, "/../secret.txt").is_none());
    }

    #[test]
    fn content_types() {
        assert_eq!(guess_content_type(Path::new("a.CSS")), "text/css; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("a.woff2")), "font/woff2");
        assert_eq!(
            guess_content_type(Path::new("a.bin")),
            "application/octet-stream"
        );
    }
}
