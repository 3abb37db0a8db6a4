use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wikitrail_infrastructure::TrailPaths;

const DEFAULT_LEVEL: &str = "info";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Installs the global subscriber: stderr always, plus a daily rolling file
/// under `paths`' logs directory when `to_file` is set.
///
/// The returned guard flushes the file writer on drop and must live until
/// the process exits.
pub fn init(paths: &TrailPaths, to_file: bool) -> Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !to_file {
        tracing_subscriber::registry()
            .with(log_filter())
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    let log_dir = paths
        .logs_dir()
        .context("Failed to resolve logs directory")?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create logs directory '{}'", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "wikitrail.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(log_filter())
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    tracing::debug!(dir = %log_dir.display(), "File logging enabled");
    Ok(Some(guard))
}
