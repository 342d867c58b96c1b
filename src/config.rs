use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Vitalink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend base URL when `VITALINK_API_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Transport-level timeouts. No per-request timeout beyond these.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Backend base URL, overridable via the `VITALINK_API_URL` env var.
pub fn api_base_url() -> String {
    std::env::var("VITALINK_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

/// Get the application data directory
/// ~/Vitalink/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Vitalink")
}

/// Session token file. The session store owns everything under this path.
pub fn session_file() -> PathBuf {
    app_data_dir().join("session.json")
}
