//! Plain-text export of a session's buffer

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::pipeline::timestamp::TIMESTAMP_FORMAT;
use crate::session::Session;

/// Extension enforced on export files
pub const EXPORT_FILE_EXTENSION: &str = "txt";

/// Errors raised while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination exists and overwriting was not requested
    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Writing the file failed
    #[error("Failed to write {path}: {source}")]
    WriteError {
        /// Destination
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Header and content of an export document.
///
/// The raw buffer is used when it has content, otherwise the rendered view.
#[must_use]
pub fn render_export(
    host: &str,
    path: &str,
    raw_buffer: &str,
    rendered_view: &str,
    exported_at: DateTime<Local>,
) -> String {
    let body = if raw_buffer.is_empty() {
        rendered_view
    } else {
        raw_buffer
    };
    let mut out = String::with_capacity(body.len() + 160);
    out.push_str("Log Export from logtail\n");
    out.push_str(&format!(
        "Exported on: {}\n",
        exported_at.format(TIMESTAMP_FORMAT)
    ));
    out.push_str(&format!("Host: {host}\n"));
    out.push_str(&format!("Log File: {path}\n"));
    out.push_str("\n=== Log Content ===\n\n");
    out.push_str(body);
    out
}

/// Export document for a session as it stands now
#[must_use]
pub fn render_session(session: &Session, exported_at: DateTime<Local>) -> String {
    let target = session.target();
    let (raw, view) = session.with_state(|s| (s.raw_buffer().to_string(), s.rendered_view().to_string()));
    render_export(&target.host, &target.path, &raw, &view, exported_at)
}

/// `log_export_YYYYMMDD_HHMMSS.txt`
#[must_use]
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!(
        "log_export_{}.{EXPORT_FILE_EXTENSION}",
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Appends `.txt` unless the name already ends with it (case-insensitive)
#[must_use]
pub fn with_txt_extension(dest: &Path) -> PathBuf {
    let has_txt = dest
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXPORT_FILE_EXTENSION));
    if has_txt {
        dest.to_path_buf()
    } else {
        let mut name = dest.as_os_str().to_os_string();
        name.push(".");
        name.push(EXPORT_FILE_EXTENSION);
        PathBuf::from(name)
    }
}

/// Writes `contents` to `dest` (with `.txt` enforced) and returns the final path.
///
/// # Errors
///
/// Returns [`ExportError::AlreadyExists`] when the file exists and
/// `overwrite` is false, or [`ExportError::WriteError`] on I/O failure.
pub fn write_export(dest: &Path, contents: &str, overwrite: bool) -> ExportResult<PathBuf> {
    let path = with_txt_extension(dest);
    let mut options = fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::AlreadyExists {
            ExportError::AlreadyExists(path.clone())
        } else {
            ExportError::WriteError {
                path: path.clone(),
                source,
            }
        }
    })?;
    file.write_all(contents.as_bytes())
        .map_err(|source| ExportError::WriteError {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), bytes = contents.len(), "Log exported");
    Ok(path)
}
