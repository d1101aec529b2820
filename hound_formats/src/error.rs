use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::header::HEADER_LEN;

/// Error conditions raised while reading a build record.
///
/// Blocks whose source offset lies past the end of the payload are not
/// errors; they decode as transparent black.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("build header needs {HEADER_LEN} bytes but only {actual} were available")]
    TruncatedHeader { actual: usize },
    #[error(
        "build timestamp {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} is not a valid date/time"
    )]
    InvalidTimestamp {
        year: u16,
        month: u16,
        day: u16,
        hour: u16,
        minute: u16,
        second: u16,
    },
    #[error("thumbnail payload read returned {actual} bytes, expected {expected}")]
    TruncatedPayload { expected: usize, actual: usize },
    #[error("build record {} is unavailable: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ThumbnailError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ThumbnailError::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}
