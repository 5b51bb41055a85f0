//! Runtime configuration for the console host and its backend transport.
//!
//! Values are collected from the command line and environment by the binary
//! (`PORT`, `DIST_DIR`, `API_URL`) and handed to the library components as a
//! single [`Config`]. Library code never reads the environment itself.

use std::path::PathBuf;

use url::Url;

/// Default listen port for the asset server.
pub const DEFAULT_PORT: u16 = 3000;

/// Default root of the built console bundle.
pub const DEFAULT_DIST_DIR: &str = "./dist";

/// Default base URL of the Ponix backend.
pub const DEFAULT_API_URL: &str = "http://localhost:50051";

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,

    /// Listen port of the asset server.
    pub port: u16,

    /// Root directory of the built console bundle.
    pub dist_dir: PathBuf,

    /// Base URL of the Ponix backend all RPC calls are sent to.
    pub api_url: Url,

    /// `User-Agent` presented on every backend request.
    pub user_agent: String,
}

impl Default for Config {
    /// Builds a configuration with compiled-in defaults.
    ///
    /// # Panics
    ///
    /// Panics if [`DEFAULT_API_URL`] does not parse, which would be a
    /// compile-time defect.
    fn default() -> Self {
        let app_name = env!("CARGO_PKG_NAME").to_owned();
        let app_version = env!("CARGO_PKG_VERSION").to_owned();

        // Served like the console bundle would identify itself, plus the
        // host OS for support triage.
        let user_agent = format!(
            "{app_name}/{app_version} (Rust; {})",
            std::env::consts::OS
        );

        Self {
            app_name,
            app_version,

            port: DEFAULT_PORT,
            dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            user_agent,
        }
    }
}
