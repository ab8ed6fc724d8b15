// src/internal/logger/logger.rs

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{
    fmt::{self},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::internal::config::LoggingConfig;

/// Initialize the global logger with the given configuration.
///
/// Console output goes to stderr: in stdio mode stdout carries the
/// JSON-RPC stream and must stay clean.
pub fn init_logger(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.level.clone()));

    if cfg.format == "json" {
        eprintln!("Warning: JSON log format is not enabled in this build. Using default format.");
    }

    match (&cfg.output_path, cfg.disable_console) {
        // Both console and file
        (Some(output_path), false) => {
            let file_writer = SharedFileWriter::new(create_log_file(output_path, cfg.append_to_file)?);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(cfg.color)
                        .with_target(true),
                )
                .with(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()?;
        }
        // Only file
        (Some(output_path), true) => {
            let file_writer = SharedFileWriter::new(create_log_file(output_path, cfg.append_to_file)?);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()?;
        }
        // Only console
        (None, false) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(cfg.color)
                        .with_target(true),
                )
                .try_init()?;
        }
        (None, true) => {
            tracing_subscriber::registry().with(filter).try_init()?;
        }
    }

    Ok(())
}

/// Create or open log file based on configuration
fn create_log_file(path: &str, append: bool) -> anyhow::Result<fs::File> {
    let path = Path::new(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(file)
}

/// File writer shared between the subscriber's writer handles
#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<fs::File>>,
}

impl SharedFileWriter {
    fn new(file: fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

impl io::Write for SharedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.flush()
    }
}

impl<'a> fmt::MakeWriter<'a> for SharedFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
