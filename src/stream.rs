//! Audio stream facts
//!
//! A [`StreamInfo`] is a snapshot taken once per file read. Length, bitrate
//! and bit depth come from the tag library; the MP3 encoder header comes
//! from [`crate::mp3::xing`].

use crate::codec::{self, CodecDescriptor};
use crate::error::{Error, Result};
use crate::mp3::{EncodingMethod, XingHeader};
use serde::Serialize;
use std::fmt;

/// Tag container family, which also identifies the audio format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagType {
    Unknown,
    Id3,
    Flac,
    Mp4,
}

impl TagType {
    /// File extension used when suggesting a filename
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            TagType::Id3 => Some("mp3"),
            TagType::Flac => Some("flac"),
            TagType::Mp4 => Some("mp4"),
            TagType::Unknown => None,
        }
    }

    /// Audio format name shown to users
    pub fn format_name(&self) -> &'static str {
        match self {
            TagType::Id3 => "MP3",
            TagType::Flac => "FLAC",
            TagType::Mp4 => "MP4",
            TagType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_name())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamInfo {
    tag_type: TagType,
    length_seconds: f64,
    bitrate: u32,
    bits_per_sample: Option<u32>,
    mp3_method: Option<EncodingMethod>,
    xing: Option<XingHeader>,
}

impl StreamInfo {
    /// Build a snapshot, rejecting values no real stream can have
    pub fn new(
        tag_type: TagType,
        length_seconds: f64,
        bitrate: u32,
        bits_per_sample: Option<u32>,
        mp3_method: Option<EncodingMethod>,
        xing: Option<XingHeader>,
    ) -> Result<Self> {
        if tag_type == TagType::Unknown {
            return Err(Error::InvalidStreamInfo("unknown tag type"));
        }
        if !length_seconds.is_finite() || length_seconds <= 0.0 {
            return Err(Error::InvalidStreamInfo("track length must be positive"));
        }
        if bitrate == 0 {
            return Err(Error::InvalidStreamInfo("bitrate must be positive"));
        }
        if mp3_method == Some(EncodingMethod::Unknown) {
            return Err(Error::InvalidStreamInfo("unknown mp3 method"));
        }

        Ok(Self {
            tag_type,
            length_seconds,
            bitrate,
            bits_per_sample,
            mp3_method,
            xing,
        })
    }

    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    pub fn length_seconds(&self) -> f64 {
        self.length_seconds
    }

    /// Bits per second
    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    pub fn bits_per_sample(&self) -> Option<u32> {
        self.bits_per_sample
    }

    pub fn mp3_method(&self) -> Option<EncodingMethod> {
        self.mp3_method
    }

    pub fn xing(&self) -> Option<&XingHeader> {
        self.xing.as_ref()
    }

    pub fn extension(&self) -> &'static str {
        // tag_type is never Unknown after construction
        self.tag_type.extension().unwrap_or("bin")
    }

    pub fn codec_descriptor(&self) -> CodecDescriptor {
        codec::resolve(self)
    }
}

/// Two snapshots describe the same stream when format, bit depth and
/// encoder header agree. Length and bitrate vary between tag libraries.
impl PartialEq for StreamInfo {
    fn eq(&self, other: &Self) -> bool {
        self.tag_type == other.tag_type
            && self.bits_per_sample == other.bits_per_sample
            && self.xing == other.xing
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.1}s {}kbps",
            self.tag_type,
            self.length_seconds,
            self.bitrate / 1000
        )?;
        if let Some(bits) = self.bits_per_sample {
            write!(f, " {}bit", bits)?;
        }
        if let Some(method) = self.mp3_method {
            write!(f, " {}", method)?;
        }
        if let Some(xing) = &self.xing {
            write!(f, " ({})", xing)?;
        }
        Ok(())
    }
}
