use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::settings::{config_dir, log_path};

/// Log to a file so the terminal screen is never written over. Level comes
/// from `RECEIVABLES_LOG` (default `warn`). If the file cannot be opened,
/// logging stays off.
pub fn init() {
    let filter =
        EnvFilter::try_from_env("RECEIVABLES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    if std::fs::create_dir_all(config_dir()).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(log_path()) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
