// REFLEX Viz - Logging & Panic Hook
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Both are process-wide and installed once from `main` before any work.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. Rerun's own crates are noisy at info.
fn default_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("{},re_sdk=warn,re_log_encoding=warn,re_chunk=warn", level)
}

/// Log to stdout and append to `log_file`.
///
/// If the log file cannot be opened, logging continues on stdout only.
pub fn init(debug: bool, log_file: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let file = OpenOptions::new().create(true).append(true).open(log_file);

    match file {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .with_ansi(false)
                .try_init();
        }
        Err(e) => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
            tracing::warn!("[LOG] Could not open log file {:?}: {}", log_file, e);
        }
    }
}

/// Route panics through tracing instead of crashing silently.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        tracing::error!("[PANIC] at {}: {}", location, message);
        eprintln!("[REFLEX PANIC] at {}: {}", location, message);
    }));
}
