//! Logging initialization for Pantry clients.
//!
//! Thin wrapper over the observability crate so every binary configures
//! tracing the same way.

use crate::Paths;
use observability::LogConfig;

/// Initialize the logging system.
///
/// Log level comes from `RUST_LOG` when set, otherwise from `level`.
/// In dev builds, set `PANTRY_LOG_STDERR=0` to keep logs in the JSONL file only.
///
/// # Example
///
/// ```ignore
/// init_logging("pantry-cli", "info");
/// tracing::info!("CLI started");
/// ```
pub fn init_logging(service_name: &str, level: &str) {
    let also_stderr = stderr_enabled(std::env::var("PANTRY_LOG_STDERR").ok().as_deref());

    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path: Paths::new().ok().map(|paths| paths.dev_log_file()),
        also_stderr,
    });
}

fn stderr_enabled(setting: Option<&str>) -> bool {
    !matches!(
        setting.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}
