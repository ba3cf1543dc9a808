//! Error types
//!
//! [`DecodeError`] covers the header parser. It never touches the
//! filesystem, so it is `Clone + Eq` and cheap to compare in tests.
//! [`Error`] is what the file-facing API returns.

use lofty::error::LoftyError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while decoding the embedded encoder header
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended before a field completed
    #[error("truncated header: needed {needed} bits at bit {bit_offset}, {available} left")]
    Truncated {
        bit_offset: usize,
        needed: usize,
        available: usize,
    },

    /// A seek targeted a position past the end of the buffer
    #[error("offset {offset} is out of range for a {len}-byte buffer")]
    OutOfRange { offset: usize, len: usize },

    /// Integer reads are limited to 1-32 bits
    #[error("cannot read {0} bits as an unsigned integer")]
    InvalidWidth(u32),

    /// The ID3v2 size field points past the end of the file
    #[error("ID3v2 tag at byte {tag_offset} ends at {declared}, past the {len}-byte file")]
    MalformedId3Size {
        tag_offset: usize,
        declared: usize,
        len: usize,
    },

    /// The file ends inside the 10-byte ID3v2 header
    #[error("ID3v2 header at byte {tag_offset} is cut off by the end of the {len}-byte file")]
    TruncatedId3Header { tag_offset: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("I/O error for {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Lofty(#[from] LoftyError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid stream info: {0}")]
    InvalidStreamInfo(&'static str),

    #[error("invalid track: {0}")]
    InvalidTrack(&'static str),

    #[error("unsupported file type: {0}")]
    Unsupported(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
