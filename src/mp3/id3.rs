//! ID3v2 tag skipping
//!
//! Only the tag's size matters here: the encoder header lives in the first
//! audio frame, which starts right after the tag. ID3v2 header layout:
//!
//! ```text
//! "ID3" | major | revision | flags | size (4 bytes, syncsafe)
//!   3       1        1        1        4                      = 10 bytes
//! ```
//!
//! The tag body follows the header, so the first frame begins at
//! `tag_offset + 10 + size`.

use super::cursor::BitCursor;
use crate::error::DecodeError;
use serde::Serialize;
use tracing::{debug, warn};

pub const ID3_SIGNATURE: &[u8; 3] = b"ID3";
pub const ID3_HEADER_LEN: usize = 10;

/// Bounds for the header search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanLimits {
    /// How far into the file to look for a leading "ID3" signature
    pub id3_scan_limit: usize,
    /// How many bytes after the ID3v2 tag to search for encoder headers
    pub post_tag_window: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            id3_scan_limit: 10_000,
            post_tag_window: 10_000,
        }
    }
}

/// What the resolver did about a leading ID3v2 tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Id3Skip {
    Absent,
    Skipped { tag_offset: usize, tag_size: usize },
    /// Header found but unusable; the whole file is searched instead
    Malformed { tag_offset: usize },
}

/// Byte range `[start, end)` to search for encoder signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchWindow {
    pub start: usize,
    pub end: usize,
    pub id3: Id3Skip,
}

impl SearchWindow {
    pub fn full(len: usize) -> Self {
        Self {
            start: 0,
            end: len,
            id3: Id3Skip::Absent,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a syncsafe integer (7 significant bits per byte, MSB first)
pub fn decode_syncsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Id3Tag {
    offset: usize,
    size: usize,
}

impl Id3Tag {
    fn end(&self) -> usize {
        self.offset + ID3_HEADER_LEN + self.size
    }
}

/// Locate a leading ID3v2 tag within the first `scan_limit` bytes
fn locate_tag(data: &[u8], scan_limit: usize) -> Result<Option<Id3Tag>, DecodeError> {
    let mut cursor = BitCursor::new(data);
    let Some(offset) = cursor.find_aligned(ID3_SIGNATURE, 0, scan_limit) else {
        return Ok(None);
    };

    if offset + ID3_HEADER_LEN > data.len() {
        return Err(DecodeError::TruncatedId3Header {
            tag_offset: offset,
            len: data.len(),
        });
    }

    // major + revision + flags are not needed to find the end of the tag
    cursor.seek_bytes(offset + ID3_SIGNATURE.len())?;
    cursor.skip_bytes(3)?;
    let size = cursor.read_uint(32)?.to_be_bytes();
    let tag = Id3Tag {
        offset,
        size: decode_syncsafe(size) as usize,
    };

    if tag.end() > data.len() {
        return Err(DecodeError::MalformedId3Size {
            tag_offset: offset,
            declared: tag.end(),
            len: data.len(),
        });
    }

    Ok(Some(tag))
}

/// Compute the window the encoder-header search runs over.
///
/// A tag whose declared size runs past the end of the file is not trusted;
/// the window then widens to the whole file rather than failing.
pub fn resolve_search_window(data: &[u8], limits: &ScanLimits) -> SearchWindow {
    let len = data.len();

    match locate_tag(data, limits.id3_scan_limit) {
        Ok(None) => SearchWindow::full(len),
        Ok(Some(tag)) => {
            let start = tag.end();
            let end = start.saturating_add(limits.post_tag_window).min(len);
            debug!(tag_offset = tag.offset, tag_size = tag.size, start, end, "skipping ID3v2 tag");
            SearchWindow {
                start,
                end,
                id3: Id3Skip::Skipped {
                    tag_offset: tag.offset,
                    tag_size: tag.size,
                },
            }
        }
        Err(e) => {
            warn!(error = %e, "unusable ID3v2 header, searching the whole file");
            let tag_offset = match e {
                DecodeError::MalformedId3Size { tag_offset, .. }
                | DecodeError::TruncatedId3Header { tag_offset, .. } => tag_offset,
                _ => 0,
            };
            SearchWindow {
                id3: Id3Skip::Malformed { tag_offset },
                ..SearchWindow::full(len)
            }
        }
    }
}
