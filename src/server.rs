//!
//! filedrop HTTP server
//! --------------------
//! Axum-based HTTP surface for the file drop.
//!
//! Responsibilities:
//! - Serve the embedded upload page at `/`.
//! - Accept multipart uploads on `POST /`, decoding the raw body and
//!   sanitizing every filename before it touches the filesystem.
//! - Serve stored files for download and the JSON listing at `/list`.
//! - Gate every route behind Basic authentication when credentials are
//!   configured.
//!
//! Each connection runs on its own tokio task. The only shared-state
//! mutation is the final file write; two concurrent uploads to the same
//! sanitized name race at the filesystem and the last writer wins, which is
//! accepted behavior for a small trusted-network drop.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{body::Bytes, Json, Router};
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::security::Credentials;
use crate::{html, listing, multipart, sanitize, security};

/// Maximum buffered upload body, matching the original server's 32MB cap.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Immutable server configuration, fixed at startup and shared by reference
/// across all request tasks.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory served for download and targeted by uploads.
    pub serve_dir: PathBuf,
    /// When set, every route requires Basic authentication against this pair.
    pub credentials: Option<Credentials>,
}

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

/// Start the filedrop HTTP server bound to the given port.
pub async fn run_with_ports(http_port: u16, config: ServerConfig) -> anyhow::Result<()> {
    info!("Serving directory: {}", config.serve_dir.display());
    if config.credentials.is_some() {
        info!("Authentication enabled");
    }

    let app = router(config);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router. Split out from [`run_with_ports`] so tests
/// can mount it on an ephemeral listener.
pub fn router(config: ServerConfig) -> Router {
    let state = AppState { config: Arc::new(config) };
    Router::new()
        .route("/", get(upload_page).post(upload))
        .route("/list", get(list_files))
        .route("/{*path}", get(download))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

/// Response hardening and request logging applied to every route.
async fn security_headers(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let mut res = next.run(req).await;
    let h = res.headers_mut();
    h.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    h.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    h.insert("Referrer-Policy", HeaderValue::from_static("strict-origin-when-cross-origin"));
    info!("{} {} {}", method, res.status().as_u16(), path);
    res
}

/// Check Basic auth when enabled. On failure the caller returns the 401
/// immediately; the response never says whether the header was absent or
/// merely wrong.
fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = &state.config.credentials else {
        return Ok(());
    };
    let header_value = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    if security::authenticate(header_value, expected) {
        Ok(())
    } else {
        let mut res = (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
        res.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"Restricted Access\""),
        );
        Err(res)
    }
}

fn error_response(err: &AppError) -> Response {
    (
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({"status":"error","code": err.code_str(), "message": err.message()})),
    )
        .into_response()
}

async fn upload_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    Html(html::UPLOAD_PAGE).into_response()
}

async fn list_files(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    Json(listing::list(&state.config.serve_dir)).into_response()
}

/// Pull the `boundary=` parameter out of a multipart Content-Type header,
/// stripping surrounding quotes.
fn extract_boundary(content_type: &str) -> Option<String> {
    let idx = content_type.find("boundary=")?;
    let rest = &content_type[idx + "boundary=".len()..];
    let token = rest.split(';').next().unwrap_or(rest).trim();
    let token = token.trim_matches('"');
    if token.is_empty() { None } else { Some(token.to_string()) }
}

async fn upload(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }

    let Some(boundary) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_boundary)
    else {
        return error_response(&AppError::user("bad_content_type", "expected multipart/form-data with a boundary"));
    };

    // The body is fully buffered here (bounded by the router's body limit),
    // so the decoder works over a complete byte sequence.
    let parts = multipart::decode(&body, &boundary);
    if parts.is_empty() {
        return error_response(&AppError::user("no_files", "no files uploaded"));
    }

    let mut saved: Vec<String> = Vec::new();
    let mut failed = 0usize;
    for part in parts {
        let name = match sanitize::sanitize(&part.filename) {
            Ok(n) => n,
            Err(e) => {
                // Unreachable via the decoder (it never emits empty names),
                // but a skipped part must not abort the batch.
                warn!("skipping part with unusable filename: {}", e.code_str());
                failed += 1;
                continue;
            }
        };
        let dest = state.config.serve_dir.join(&name);
        match tokio::fs::write(&dest, &part.content).await {
            Ok(()) => {
                info!("Received: {} ({} bytes)", name, part.content.len());
                saved.push(name);
            }
            Err(e) => {
                error!("failed to save {}: {}", name, e);
                failed += 1;
            }
        }
    }

    // Per-file failures do not roll back files already written; the status
    // reflects whether anything went wrong.
    let status = if failed > 0 { StatusCode::INTERNAL_SERVER_ERROR } else { StatusCode::OK };
    (status, Json(json!({
        "status": if failed > 0 { "error" } else { "ok" },
        "saved": saved,
        "failed": failed,
    })))
        .into_response()
}

/// True when a decoded download path is a plain visible filename that is
/// safe to join with the serve directory.
fn is_safe_download_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.starts_with('.')
}

async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }

    let name = match urlencoding::decode(&path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path,
    };
    if !is_safe_download_name(&name) {
        return error_response(&AppError::not_found("not_found", "file not found"));
    }

    let full = state.config.serve_dir.join(&name);
    let is_file = tokio::fs::metadata(&full).await.map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return error_response(&AppError::not_found("not_found", "file not found"));
    }
    match tokio::fs::read(&full).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&name).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            error!("failed to read {}: {}", name, e);
            error_response(&AppError::io("io", "failed to read file"))
        }
    }
}
