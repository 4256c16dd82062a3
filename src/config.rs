use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "RIDA";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL of the agent backend, overridable via `RIDA_AGENT_URL`.
pub const DEFAULT_AGENT_URL: &str = "http://localhost:8000";
pub const AGENT_URL_ENV: &str = "RIDA_AGENT_URL";

/// Per-request timeout for agent calls. Ingestion runs OCR + classification
/// remotely, so this is generous.
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 120;

pub fn default_log_filter() -> &'static str {
    "info,rida=debug"
}

/// Initialize tracing once; safe to call repeatedly (later calls are no-ops).
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .try_init();
}

/// Agent backend base URL (env override, localhost default).
pub fn agent_base_url() -> String {
    std::env::var(AGENT_URL_ENV).unwrap_or_else(|_| DEFAULT_AGENT_URL.to_string())
}

/// Get the application data directory
/// ~/RIDA/ on all platforms (user-visible by design)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("RIDA")
}

/// Directory where export artifacts are saved.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}
