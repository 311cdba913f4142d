use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "auto-extract-time";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file name looked up under [`config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "auto_extract_time=info,extract_time=info"
}

/// Get the per-user configuration directory.
/// Falls back to the working directory when the platform reports none.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the default extractor config path
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}
