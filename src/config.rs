use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "VaxTrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database file name inside the data directory
pub const DB_FILE_NAME: &str = "vaxtrack.db";

/// Default API port, bound on loopback only
pub const DEFAULT_PORT: u16 = 8787;

/// Timeout for clinic provider HTTP calls
pub const CLINIC_SEARCH_TIMEOUT_SECS: u64 = 10;

pub const ENV_DATA_DIR: &str = "VAXTRACK_DATA_DIR";
pub const ENV_BIND: &str = "VAXTRACK_BIND";
pub const ENV_AMAP_KEY: &str = "VAXTRACK_AMAP_KEY";

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get the application data directory.
/// `VAXTRACK_DATA_DIR` if set, else `<platform data dir>/VaxTrack`,
/// else `./VaxTrack` when the platform has none.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = env_non_empty(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the database file path
pub fn db_path() -> PathBuf {
    app_data_dir().join(DB_FILE_NAME)
}

/// API listen address from `VAXTRACK_BIND`, falling back to the default.
pub fn bind_addr() -> SocketAddr {
    let default = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));
    match env_non_empty(ENV_BIND) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, fallback = %default, "Invalid {ENV_BIND}");
            default
        }),
        None => default,
    }
}

/// AMap web service key. Without one, clinic search uses bundled data.
pub fn amap_key() -> Option<String> {
    env_non_empty(ENV_AMAP_KEY)
}

/// Log filter used when `RUST_LOG` is not set
pub fn default_log_filter() -> &'static str {
    "vaxtrack=info,tower_http=warn"
}
