use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants;

/// Initializes logging with console output on stderr and a JSON log file.
///
/// The report itself goes to disk and the run summary to stdout, so console
/// logging stays on stderr. The returned guard flushes the file writer when
/// dropped and must be held for the lifetime of the process.
pub fn init_logging(verbose: bool) -> Option<WorkerGuard> {
    let default_directive = if verbose {
        "receipt_report=debug"
    } else {
        "receipt_report=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // File logging is best effort; a read-only working directory still gets console output
    let (file_layer, guard) = match fs::create_dir_all(constants::LOG_DIR) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(constants::LOG_DIR, constants::LOG_FILE_PREFIX);
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().json().with_writer(non_blocking_writer)), Some(guard))
        }
        Err(_) => (None, None),
    };

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
