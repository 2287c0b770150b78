//! Dev-mode subscriber.
//!
//! Appends JSONL records to a central file that several Pantry processes
//! can share, optionally mirroring a compact view to stderr.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// `~/.pantry/logs/dev.jsonl`, or a relative `.pantry/logs/dev.jsonl`
/// when no home directory is known.
fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".pantry")
        .join("logs")
        .join("dev.jsonl")
}

/// Append-only handle on the shared log file.
#[derive(Clone)]
pub struct JsonlFile {
    file: Arc<Mutex<File>>,
}

impl JsonlFile {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl io::Write for JsonlFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Unbuffered: O_APPEND keeps each record write whole across processes
        self.file.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for JsonlFile {
    type Writer = JsonlFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the dev subscriber. Falls back to stderr-only output when the
/// log file cannot be opened.
pub fn init_dev_subscriber(config: &LogConfig) {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);

    let (file_layer, open_error) = match JsonlFile::open(&log_path) {
        Ok(file) => (
            Some(JsonLayer::new(config.service_name.clone(), file)
                .with_filter(env_filter(&config.default_level))),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    let stderr_layer = (config.also_stderr || open_error.is_some()).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    match open_error {
        None => tracing::debug!(log_path = %log_path.display(), "dev log stream attached"),
        Some(err) => tracing::warn!(
            log_path = %log_path.display(),
            error = %err,
            "dev log file unavailable, logging to stderr only"
        ),
    }
}
