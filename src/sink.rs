//! Output files. Every write goes to a sibling temp file that is renamed
//! over the destination, so readers never see a partial snapshot.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::market::PriceRow;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to serialize CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SinkError + '_ {
    move |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `value` as pretty-printed JSON.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SinkError> {
    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');
    atomic_write(path, &content)
}

/// Writes price rows as CSV with a header row, even when `rows` is empty.
pub fn write_csv_atomic(path: &Path, rows: &[PriceRow]) -> Result<(), SinkError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record([
        "date", "symbol", "open", "high", "low", "close", "adjClose", "volume",
    ])?;
    for row in rows {
        writer.serialize(row)?;
    }
    let content = writer
        .into_inner()
        .map_err(|e| io_error(path)(e.into_error()))?;
    atomic_write(path, &content)
}

fn atomic_write(dst: &Path, content: &[u8]) -> Result<(), SinkError> {
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    // Unpredictable suffix; create_new refuses a pre-existing path
    use std::time::{SystemTime, UNIX_EPOCH};
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", suffix));

    let result = write_and_sync(&temp_path, content).and_then(|()| {
        #[cfg(windows)]
        if dst.exists() {
            std::fs::remove_file(dst).map_err(io_error(dst))?;
        }
        std::fs::rename(&temp_path, dst).map_err(io_error(dst))
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

fn write_and_sync(temp_path: &Path, content: &[u8]) -> Result<(), SinkError> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(io_error(temp_path))?;
    file.write_all(content).map_err(io_error(temp_path))?;
    file.sync_all().map_err(io_error(temp_path))
}
