//! tagscope - Audio tags and MP3 encoder settings
//!
//! tagscope reads and writes descriptive tags (artists, titles, track and
//! disc numbers, genres, comments) on MP3, FLAC and MP4 files, and tells
//! you how an MP3 was encoded: "V0", "CBR", "APS", "ABR" and so on.
//!
//! # Overview
//!
//! Tag containers are handled by [lofty](https://docs.rs/lofty). The encoder
//! description comes from the Xing/LAME header that VBR-capable encoders
//! write into the first audio frame. That header is decoded here, bit by
//! bit, after skipping any leading ID3v2 tag.
//!
//! # Quick Start
//!
//! ```no_run
//! use tagscope::{read_tags, Prober};
//!
//! let track = read_tags("01 - Xtal.mp3")?;
//! println!("{}", track);
//! println!("Encoded as: {:?}", track.codec_setting(false));
//! println!("Rename to:  {:?}", track.filename(false));
//!
//! let result = Prober::new().probe("01 - Xtal.mp3");
//! println!("{} {:?}", result.file_name, result.codec);
//! # Ok::<(), tagscope::Error>(())
//! ```
//!
//! # MP3 Classification
//!
//! | Header | LAME method | Setting |
//! |--------|-------------|---------|
//! | LAME | 1 | CBR |
//! | LAME | 8 | CBR (VBR before LAME 3.94) |
//! | LAME | 3 | APE / APS / APM, or vbr-old V*n* |
//! | LAME | 4, 5 | V*n* |
//! | LAME | 2, 9 | ABR |
//! | Xing, Info, VBRI, none | - | bitrate mode: CBR / VBR / ABR |
//!
//! # Modules
//!
//! - [`mp3`]: bit cursor, ID3v2 skipping, Xing/LAME header decoding
//! - [`codec`]: `(format, setting)` descriptions
//! - [`stream`]: stream facts snapshot
//! - [`track`]: tag fields, validation and filenames
//! - [`tags`]: reading and writing through lofty
//! - [`probe`]: per-file driver for listings
//! - [`report`]: output formatters (JSON, CSV)

pub mod codec;
pub mod error;
pub mod mp3;
pub mod probe;
pub mod report;
pub mod stream;
pub mod tags;
pub mod track;

pub use codec::CodecDescriptor;
pub use error::{DecodeError, Error, Result};
pub use mp3::{
    read_xing, read_xing_file, read_xing_with, EncodingMethod, HeaderKind, ScanLimits,
    XingHeader,
};
pub use probe::{ProbeResult, Prober};
pub use report::Summary;
pub use stream::{StreamInfo, TagType};
pub use tags::{read_tags, read_tags_with, write_tags};
pub use track::{normalize_path_chars, Track};
