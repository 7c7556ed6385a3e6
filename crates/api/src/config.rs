use std::path::PathBuf;

use segcull_core::deletion::TagPolicy;

/// Server configuration loaded from environment variables.
///
/// Invalid values panic at startup: misconfiguration fails fast and never
/// silently defaults (the tag policy in particular).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8888`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base directory holding one subdirectory per sequence.
    pub base_dir: PathBuf,
    /// Base URL of the external segmentation service.
    pub resolver_url: String,
    /// Name under which deletion payloads persist (`<tag_name>.json`).
    pub tag_name: String,
    /// Active toggle policy for every session.
    pub policy: TagPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8888`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `BASE_DIR`             | (required)                 |
    /// | `RESOLVER_URL`         | `http://127.0.0.1:8890`    |
    /// | `TAG_NAME`             | `bloom-time`               |
    /// | `TAG_TYPE`             | `per-frame`                |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8888".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let base_dir = PathBuf::from(std::env::var("BASE_DIR").expect("BASE_DIR must be set"));

        let resolver_url =
            std::env::var("RESOLVER_URL").unwrap_or_else(|_| "http://127.0.0.1:8890".into());

        let tag_name = std::env::var("TAG_NAME").unwrap_or_else(|_| "bloom-time".into());

        let policy = TagPolicy::from_str(
            &std::env::var("TAG_TYPE").unwrap_or_else(|_| "per-frame".into()),
        )
        .unwrap_or_else(|e| panic!("TAG_TYPE: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            base_dir,
            resolver_url,
            tag_name,
            policy,
        }
    }
}
