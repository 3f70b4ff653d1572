use std::{fs, path::Path};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::error::KnockoutError;

pub const LOG_FILE_PREFIX: &str = "knockout.log";

/// Install a global subscriber writing to a daily rolling file in `logs_dir`.
///
/// `RUST_LOG` overrides the default `info` filter. Keep the returned guard
/// alive for as long as logs should be flushed. If the host already set a
/// subscriber, that one stays in place.
pub fn init_tracing(logs_dir: &Path) -> Result<WorkerGuard, KnockoutError> {
  fs::create_dir_all(logs_dir).map_err(|source| KnockoutError::LogDir {
    path: logs_dir.to_path_buf(),
    source,
  })?;
  let file_appender = RollingFileAppender::builder()
    .rotation(Rotation::DAILY)
    .filename_prefix(LOG_FILE_PREFIX)
    .build(logs_dir)
    .map_err(|source| KnockoutError::LogAppender {
      path: logs_dir.to_path_buf(),
      source,
    })?;
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
  let installed = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(non_blocking)
    .with_ansi(false)
    .try_init();
  if installed.is_ok() {
    tracing::info!(logs_dir = %logs_dir.display(), "knockout scheduler logging started");
  }
  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_writes_to_rolling_file() {
    let dir = tempfile::tempdir().unwrap();
    let logs_dir = dir.path().join("logs");
    let guard = init_tracing(&logs_dir).unwrap();
    tracing::info!("hello from the test");
    drop(guard);

    let files = fs::read_dir(&logs_dir)
      .unwrap()
      .filter_map(Result::ok)
      .filter(|entry| entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX))
      .collect::<Vec<_>>();
    assert_eq!(files.len(), 1);
  }

  #[test]
  fn test_unusable_log_dir_is_an_error() {
    // A regular file cannot hold a directory, whoever runs the test.
    let file = tempfile::NamedTempFile::new().unwrap();
    let logs_dir = file.path().join("logs");
    let err = init_tracing(&logs_dir).unwrap_err();
    assert!(matches!(err, KnockoutError::LogDir { .. }));
    assert!(err.to_string().contains(&logs_dir.display().to_string()));
  }
}
