//! End-to-end tests for the asset server: a real listener, a real bundle
//! directory, plain HTTP requests.

use std::{fs, net::SocketAddr, path::Path};

use reqwest::{header, StatusCode};
use tempfile::TempDir;

use ponix_console::serve::{self, AssetConfig};

const INDEX_HTML: &str = "<!doctype html><html><body>ponix console</body></html>";
const APP_JS: &str = "console.log(\"ponix\");";

/// Writes a minimal console bundle into a fresh temporary directory.
fn bundle() -> TempDir {
    let dir = TempDir::new().expect("temp dir should be creatable");
    fs::write(dir.path().join("index.html"), INDEX_HTML).expect("write index.html");
    fs::write(dir.path().join("app.js"), APP_JS).expect("write app.js");

    let assets = dir.path().join("assets");
    fs::create_dir(&assets).expect("create assets dir");
    fs::write(assets.join("logo.svg"), "<svg/>").expect("write logo.svg");
    fs::write(assets.join("telemetry.bin"), [0u8, 1, 2]).expect("write telemetry.bin");

    dir
}

async fn spawn_server(dist_dir: &Path) -> SocketAddr {
    let config = AssetConfig {
        dist_dir: dist_dir.to_path_buf(),
        ..AssetConfig::default()
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("listener has an address");

    tokio::spawn(async move {
        axum::serve(listener, serve::router(config))
            .await
            .expect("server should not die");
    });

    addr
}

fn cache_control(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

fn content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

#[tokio::test]
async fn static_files_are_served_with_immutable_cache() {
    let dist = bundle();
    let addr = spawn_server(dist.path()).await;

    let response = reqwest::get(format!("http://{addr}/app.js"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/javascript");
    assert_eq!(
        cache_control(&response).as_deref(),
        Some("public, max-age=31536000, immutable")
    );
    assert_eq!(response.text().await.expect("body"), APP_JS);
}

#[tokio::test]
async fn nested_assets_resolve_with_their_content_type() {
    let dist = bundle();
    let addr = spawn_server(dist.path()).await;

    let response = reqwest::get(format!("http://{addr}/assets/logo.svg"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/svg+xml");
    assert!(cache_control(&response).is_some());
}

#[tokio::test]
async fn unknown_extensions_fall_back_to_octet_stream() {
    let dist = bundle();
    let addr = spawn_server(dist.path()).await;

    let response = reqwest::get(format!("http://{addr}/assets/telemetry.bin"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/octet-stream");
}

#[tokio::test]
async fn root_serves_the_entry_document_without_immutable_cache() {
    let dist = bundle();
    let addr = spawn_server(dist.path()).await;

    let response = reqwest::get(format!("http://{addr}/"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
    assert_eq!(cache_control(&response), None);
    assert_eq!(response.text().await.expect("body"), INDEX_HTML);
}

#[tokio::test]
async fn entry_document_is_never_immutable_even_by_direct_path() {
    let dist = bundle();
    let addr = spawn_server(dist.path()).await;

    let response = reqwest::get(format!("http://{addr}/index.html"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
    assert_eq!(cache_control(&response), None);
}

#[tokio::test]
async fn client_routes_fall_back_to_the_entry_document() {
    let dist = bundle();
    let addr = spawn_server(dist.path()).await;

    for route in ["/organizations/42", "/organizations/42/gateways", "/login"] {
        let response = reqwest::get(format!("http://{addr}{route}"))
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK, "route {route}");
        assert_eq!(content_type(&response), "text/html", "route {route}");
        assert_eq!(cache_control(&response), None, "route {route}");
        assert_eq!(response.text().await.expect("body"), INDEX_HTML);
    }
}

#[tokio::test]
async fn empty_bundle_answers_not_found() {
    let dist = TempDir::new().expect("temp dir should be creatable");
    let addr = spawn_server(dist.path()).await;

    let response = reqwest::get(format!("http://{addr}/"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&response).starts_with("text/plain"));
    assert_eq!(response.text().await.expect("body"), "Not Found");
}

#[tokio::test]
async fn escape_attempts_get_the_fallback_not_the_file() {
    let root = TempDir::new().expect("temp dir should be creatable");
    let dist = root.path().join("dist");
    fs::create_dir(&dist).expect("create dist");
    fs::write(dist.join("index.html"), INDEX_HTML).expect("write index.html");
    fs::write(root.path().join("secrets.toml"), "api_key = \"secret\"").expect("write secret");

    let addr = spawn_server(&dist).await;

    let response = reqwest::get(format!("http://{addr}/%2e%2e/secrets.toml"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), INDEX_HTML);
}
