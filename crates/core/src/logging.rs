use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::log_dir;

/// Install the global subscriber for `component`.
///
/// Writes daily files named `descache-<component>.<date>` under
/// [`log_dir`]; `to_stderr` mirrors events to the terminal. Keep the
/// returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("descache: cannot create log directory {}: {}", dir.display(), e);
    }

    let file_appender =
        tracing_appender::rolling::daily(&dir, format!("descache-{}", component));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .compact();
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    guard
}
