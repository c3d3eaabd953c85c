//! Incremental retrieval of a remote file
//!
//! A poll is three sequential round-trips: an existence check, a size probe
//! and a base64-encoded read of the unread span. The caller's offset is only
//! advanced from a fully successful [`FetchOutcome`].

mod commands;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{TailError, TailResult};
use crate::executor::RemoteExecutor;

pub use commands::{EXISTS_SENTINEL, NOT_FOUND_SENTINEL, RemoteCommand, quote_path, unquote_path};

/// What a successful poll found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// New bytes were transferred
    Updated,
    /// The file size equals the consumed offset
    NoChanges,
    /// The file shrank below the consumed offset and was read from the start
    Rotated,
}

/// Result of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Decoded new bytes (empty unless `Updated` or `Rotated`)
    pub bytes: Vec<u8>,
    /// Offset to store once the bytes are applied
    pub new_offset: u64,
    /// Poll classification
    pub status: FetchStatus,
}

/// Stateless delta fetcher over a [`RemoteExecutor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaFetcher;

impl DeltaFetcher {
    /// Creates a fetcher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Fetches the bytes appended to `path` since `offset`.
    ///
    /// When the file is shorter than `offset` it is treated as rotated and
    /// read in full.
    ///
    /// # Errors
    ///
    /// - [`TailError::FileNotFound`] when the existence check fails
    /// - [`TailError::TargetUnreachable`] / [`TailError::CommandFailed`] from
    ///   the executor
    /// - [`TailError::InvalidSize`] when the size probe is not a number
    /// - [`TailError::DecodeFailure`] when the read is malformed or short
    pub async fn fetch<E>(&self, executor: &E, path: &str, offset: u64) -> TailResult<FetchOutcome>
    where
        E: RemoteExecutor + ?Sized,
    {
        let exists = executor
            .execute(&RemoteCommand::Exists(path.to_string()).render())
            .await?;
        if first_line(&exists) != EXISTS_SENTINEL {
            tracing::debug!(path, "Remote file not found");
            return Err(TailError::FileNotFound(path.to_string()));
        }

        let size_output = executor
            .execute(&RemoteCommand::Size(path.to_string()).render())
            .await?;
        let size = parse_size(&size_output)?;

        if size == offset {
            tracing::trace!(path, size, "No changes");
            return Ok(FetchOutcome {
                bytes: Vec::new(),
                new_offset: offset,
                status: FetchStatus::NoChanges,
            });
        }

        let rotated = size < offset;
        if rotated {
            tracing::warn!(
                path,
                size,
                offset,
                "Remote file shrank below consumed offset, reading from start"
            );
        }

        let (command, expected) = if offset == 0 || rotated {
            (RemoteCommand::ReadAll(path.to_string()), size)
        } else {
            // tail -c counts from the end: if the file grows after the size
            // probe, the window shifts past [offset, offset + growth) and
            // the overlap is read again on the next poll
            let bytes = size - offset;
            (
                RemoteCommand::ReadTail {
                    path: path.to_string(),
                    bytes,
                },
                bytes,
            )
        };

        let encoded = executor.execute(&command.render()).await?;
        let mut bytes = decode_base64(&encoded)?;

        let expected_len = usize::try_from(expected)
            .map_err(|_| TailError::DecodeFailure(format!("span of {expected} bytes too large")))?;
        if bytes.len() < expected_len {
            return Err(TailError::DecodeFailure(format!(
                "expected {expected} bytes, received {}",
                bytes.len()
            )));
        }
        // a full read may include bytes appended after the size probe; they
        // belong to the next poll
        bytes.truncate(expected_len);

        tracing::debug!(path, offset, size, bytes = bytes.len(), "Fetched delta");

        Ok(FetchOutcome {
            bytes,
            new_offset: size,
            status: if rotated {
                FetchStatus::Rotated
            } else {
                FetchStatus::Updated
            },
        })
    }
}

fn first_line(output: &[u8]) -> &str {
    std::str::from_utf8(output)
        .unwrap_or_default()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
}

fn parse_size(output: &[u8]) -> TailResult<u64> {
    let text = first_line(output);
    text.parse::<u64>()
        .map_err(|_| TailError::InvalidSize(format!("'{}'", text.escape_default())))
}

/// Decodes base64 output, ignoring the line wrapping added by the remote tool
///
/// # Errors
///
/// Returns [`TailError::DecodeFailure`] for anything that is not valid base64.
pub fn decode_base64(encoded: &[u8]) -> TailResult<Vec<u8>> {
    let compact: Vec<u8> = encoded
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(&compact)
        .map_err(|e| TailError::DecodeFailure(e.to_string()))
}
