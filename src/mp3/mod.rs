//! MP3 encoder header parsing
//!
//! - [`cursor`]: bit-granular reads and byte-aligned signature search
//! - [`id3`]: skipping a leading ID3v2 tag to bound the search
//! - [`xing`]: decoding Xing/LAME headers and classifying files without one

pub mod cursor;
pub mod id3;
pub mod xing;

pub use cursor::BitCursor;
pub use id3::{resolve_search_window, Id3Skip, ScanLimits, SearchWindow};
pub use xing::{
    read_xing, read_xing_file, read_xing_with, EncodingMethod, HeaderKind, LameTag, VbrQuality,
    XingHeader,
};
