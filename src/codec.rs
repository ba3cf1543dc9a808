//! Codec description
//!
//! Turns a [`StreamInfo`] into a `(format, setting)` pair such as
//! `("MP3", "V2")` or `("FLAC", "24bit")`. This is a pure function of the
//! snapshot: no I/O, same answer every time.
//!
//! # MP3 classification
//!
//! When a LAME tag is present its VBR method code decides:
//!
//! | Method | Meaning | Setting |
//! |--------|---------|---------|
//! | 1 | CBR | `CBR` |
//! | 8 | CBR 2-pass | `CBR` (LAME >= 3.94), `VBR` before that |
//! | 3 | old VBR | `APE` / `APS` / `APM` for V0 / V2 / V4, else `vbr-old V<n>` |
//! | 4, 5 | VBR mtrh / mt | `V<n>` |
//! | 2, 9 | ABR | `ABR` |
//! | none | | `VBR` |
//!
//! Anything else is shown as `lame_vbr_method <n>` so it is never lost.
//! Without a LAME tag the tag library's bitrate mode is used.

use crate::mp3::{EncodingMethod, XingHeader};
use crate::stream::{StreamInfo, TagType};
use serde::Serialize;
use std::fmt;

/// LAME releases before this one wrote method 8 for VBR files
const CBR_2PASS_FIXED_IN: (u32, u32) = (3, 94);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CodecDescriptor {
    pub format: &'static str,
    pub setting: Option<String>,
}

impl CodecDescriptor {
    fn new(format: &'static str, setting: Option<String>) -> Self {
        Self { format, setting }
    }

    fn with(format: &'static str, setting: impl Into<String>) -> Self {
        Self::new(format, Some(setting.into()))
    }

    /// Setting followed by format ("24bit FLAC", "V0 MP3"), or just the format
    pub fn codec(&self) -> String {
        match &self.setting {
            Some(setting) => format!("{} {}", setting, self.format),
            None => self.format.to_string(),
        }
    }

    /// Text for a filename or listing.
    ///
    /// FLAC always reads "24bit FLAC"/"FLAC". Other formats give the bare
    /// setting when `short`, "MP3 V0" style otherwise.
    pub fn label(&self, short: bool) -> String {
        if self.format == TagType::Flac.format_name() {
            return self.codec();
        }
        match &self.setting {
            Some(setting) if short => setting.clone(),
            Some(setting) => format!("{} {}", self.format, setting),
            None => self.format.to_string(),
        }
    }
}

impl fmt::Display for CodecDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.codec())
    }
}

/// Describe the codec of a stream snapshot
pub fn resolve(info: &StreamInfo) -> CodecDescriptor {
    let format = info.tag_type().format_name();

    match info.tag_type() {
        TagType::Flac => match info.bits_per_sample() {
            Some(16) | None => CodecDescriptor::new(format, None),
            Some(bits) => CodecDescriptor::with(format, format!("{}bit", bits)),
        },
        TagType::Mp4 => CodecDescriptor::with(format, "UNKNOWN"),
        TagType::Id3 => {
            let setting = match info.xing().filter(|x| has_lame_version(x)) {
                Some(xing) => Some(lame_setting(xing)),
                None => info.mp3_method().map(|m| m.to_string()),
            };
            CodecDescriptor::new(format, setting)
        }
        TagType::Unknown => CodecDescriptor::new(format, None),
    }
}

fn has_lame_version(xing: &XingHeader) -> bool {
    xing.lame_version().is_some_and(|v| !v.is_empty())
}

fn lame_setting(xing: &XingHeader) -> String {
    let v = match xing.vbr_quality_v() {
        Some(v) => v.to_string(),
        None => "?".to_string(),
    };

    match xing.lame_vbr_method() {
        None => "VBR".to_string(),
        Some(1) => "CBR".to_string(),
        Some(8) => {
            let version = (xing.lame_version_major(), xing.lame_version_minor());
            if version < CBR_2PASS_FIXED_IN {
                "VBR".to_string()
            } else {
                "CBR".to_string()
            }
        }
        Some(3) => match xing.vbr_quality_v() {
            Some(0) => "APE".to_string(),
            Some(2) => "APS".to_string(),
            Some(4) => "APM".to_string(),
            _ => format!("vbr-old V{}", v),
        },
        Some(4 | 5) => format!("V{}", v),
        Some(2 | 9) => EncodingMethod::Abr.to_string(),
        Some(other) => format!("lame_vbr_method {}", other),
    }
}
