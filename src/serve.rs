//! Static asset server for the built console bundle.
//!
//! Serves the single-page application with the three behaviors the console
//! deployment relies on:
//! * content types from a fixed extension table
//! * aggressive immutable caching for fingerprinted assets, with the entry
//!   document explicitly excluded so client updates are picked up
//! * SPA fallback: any path that is not a real file under the bundle root
//!   answers with the entry document, so client-side routes survive full
//!   page loads
//!
//! Requests share nothing but the immutable [`AssetConfig`]; each one is an
//! independent existence check plus read.

use std::{
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::config::Config;

/// Cache directive for fingerprinted assets. One year, immutable.
const IMMUTABLE_CACHE: HeaderValue =
    HeaderValue::from_static("public, max-age=31536000, immutable");

/// Configuration for the asset server.
#[derive(Clone, Debug)]
pub struct AssetConfig {
    /// Root of the built bundle.
    pub dist_dir: PathBuf,

    /// Entry document, relative to `dist_dir`.
    pub index_file: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dist_dir: Config::default().dist_dir,
            index_file: String::from("index.html"),
        }
    }
}

impl From<&Config> for AssetConfig {
    fn from(config: &Config) -> Self {
        Self {
            dist_dir: config.dist_dir.clone(),
            ..Self::default()
        }
    }
}

/// Builds the asset router.
///
/// A single fallback route: every `GET` goes through [`serve_asset`], which
/// decides between a real file, the SPA fallback and a 404.
pub fn router(config: AssetConfig) -> Router {
    Router::new()
        .fallback(get(serve_asset))
        .with_state(Arc::new(config))
}

async fn serve_asset(State(config): State<Arc<AssetConfig>>, uri: Uri) -> Response {
    let path = uri.path();
    let requested = match path.strip_prefix('/') {
        Some("") | None => config.index_file.as_str(),
        Some(stripped) => stripped,
    };

    if let Some(relative) = sanitize(requested) {
        match tokio::fs::read(config.dist_dir.join(&relative)).await {
            Ok(bytes) => {
                let is_entry = relative == Path::new(&config.index_file);
                return asset_response(bytes, content_type(&relative), !is_entry);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            // Directories and unreadable files get the SPA fallback too;
            // anything under the bundle root that is not a regular file is
            // a client-side route as far as the console is concerned.
            Err(e) => debug!("asset {} unreadable: {e}", relative.display()),
        }
    }

    match tokio::fs::read(config.dist_dir.join(&config.index_file)).await {
        Ok(bytes) => asset_response(bytes, "text/html", false),
        Err(e) => {
            error!("entry document missing from {}: {e}", config.dist_dir.display());
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

/// Builds a `200` with the given content type, marking everything but the
/// entry document as immutable.
fn asset_response(bytes: Vec<u8>, content_type: &'static str, immutable: bool) -> Response {
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        bytes,
    )
        .into_response();

    if immutable {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, IMMUTABLE_CACHE);
    }

    response
}

/// Normalizes a request path into a relative path under the bundle root.
///
/// Rejects anything that could escape the root: parent components, absolute
/// paths, drive prefixes. Rejection is not an error; the request simply
/// falls through to the SPA fallback.
fn sanitize(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (!relative.as_os_str().is_empty()).then_some(relative)
}

/// Content type by file extension.
///
/// The console bundle only ever contains this fixed set; everything else is
/// served as opaque bytes.
fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default();

    match extension {
        "html" => "text/html",
        "js" => "application/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}
