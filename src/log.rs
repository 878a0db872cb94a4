// src/log.rs
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::{self, time::Uptime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "pedigree_scrape=info",
        1 => "pedigree_scrape=debug",
        _ => "pedigree_scrape=trace",
    }
}

fn open_log(path: &Path) -> Option<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Install the global subscriber: stderr, plus an appending log file at
/// `log_path` when it can be opened. Calling twice is a no-op.
pub fn init(log_path: &Path, verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(Uptime::default());

    let file = open_log(log_path).map(|f| {
        fmt::layer()
            .with_writer(Mutex::new(f))
            .with_ansi(false)
            .with_timer(Uptime::default())
    });
    if file.is_none() {
        eprintln!("warning: cannot open log file {}", log_path.display());
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_widens_filter() {
        assert_eq!(default_directive(0), "pedigree_scrape=info");
        assert_eq!(default_directive(1), "pedigree_scrape=debug");
        assert_eq!(default_directive(5), "pedigree_scrape=trace");
    }

    #[test]
    fn log_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("debug.log");
        assert!(open_log(&path).is_some());
        assert!(path.exists());
    }
}
