use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Explicit Chrome executable path. Unset means `google-chrome` on PATH.
    pub chrome_path: Option<PathBuf>,
    /// Persistent Chrome profile directory; keeps the portal login
    /// across restarts.
    pub chrome_user_data_dir: PathBuf,
    /// Chrome remote-debugging port.
    pub chrome_debug_port: u16,
    /// Portal entry URL the login flow navigates to.
    pub portal_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `3000`                           |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `CHROME_PATH`          | (unset; `google-chrome` on PATH) |
    /// | `CHROME_USER_DATA_DIR` | `./chrome-profile`               |
    /// | `CHROME_DEBUG_PORT`    | `9222`                           |
    /// | `PORTAL_URL`           | `https://petadasar.atrbpn.go.id/`|
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
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

        let chrome_path = std::env::var("CHROME_PATH").ok().map(PathBuf::from);

        let chrome_user_data_dir: PathBuf = std::env::var("CHROME_USER_DATA_DIR")
            .unwrap_or_else(|_| "./chrome-profile".into())
            .into();

        let chrome_debug_port: u16 = std::env::var("CHROME_DEBUG_PORT")
            .unwrap_or_else(|_| "9222".into())
            .parse()
            .expect("CHROME_DEBUG_PORT must be a valid u16");

        let portal_url = std::env::var("PORTAL_URL")
            .unwrap_or_else(|_| "https://petadasar.atrbpn.go.id/".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            chrome_path,
            chrome_user_data_dir,
            chrome_debug_port,
            portal_url,
        }
    }
}
