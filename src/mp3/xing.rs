//! Xing/LAME header decoding
//!
//! VBR-capable encoders write an info header into the first audio frame of
//! the stream. The Xing layout is driven by a flags word:
//!
//! ```text
//! "Xing" | flags (4) | [frames (4)] | [bytes (4)] | [TOC (100)] | [quality (4)]
//!                       bit 0          bit 1         bit 2         bit 3
//! ```
//!
//! LAME (3.90+) appends its own tag directly after the Xing fields:
//!
//! ```text
//! "LAME" + 5 version bytes | revision (4 bits) | VBR method (4 bits) |
//! 9 bytes lowpass/replay gain/ATH | nspsytune | nssafejoint | nogap next | nogap prev | ...
//! ```
//!
//! Files without a "Xing" signature are classified by the "Info" (CBR written
//! by a Xing-family encoder) and "VBRI" (Fraunhofer) signatures, or assumed
//! CBR when neither is present.

use super::cursor::BitCursor;
use super::id3::{self, ScanLimits, SearchWindow};
use crate::error::{DecodeError, Error, Result};
use encoding_rs::WINDOWS_1252;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const XING_SIGNATURE: &[u8; 4] = b"Xing";
pub const INFO_SIGNATURE: &[u8; 4] = b"Info";
pub const VBRI_SIGNATURE: &[u8; 4] = b"VBRI";
pub const LAME_SIGNATURE: &[u8; 4] = b"LAME";

/// Seek table size. Some documentation of the format suggests 816 bits
/// (102 bytes); every encoder we've seen writes 100.
const TOC_LEN: usize = 100;
/// "LAME" plus the 5-byte version string
const LAME_PROBE_LEN: usize = 9;
/// Lowpass, replay gain and ATH fields between the method nibble and the flag bits
const LAME_OPAQUE_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XingField {
    Frames,
    Bytes,
    Toc,
    Quality,
}

/// Optional Xing fields in on-disk order, keyed by their flag bit
const XING_FIELDS: [(u32, XingField); 4] = [
    (0x01, XingField::Frames),
    (0x02, XingField::Bytes),
    (0x04, XingField::Toc),
    (0x08, XingField::Quality),
];

/// Which signature, if any, was found and decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeaderKind {
    None,
    Xing,
    Lame,
    Info,
    Vbri,
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderKind::None => write!(f, "NONE"),
            HeaderKind::Xing => write!(f, "XING"),
            HeaderKind::Lame => write!(f, "LAME"),
            HeaderKind::Info => write!(f, "INFO"),
            HeaderKind::Vbri => write!(f, "VBRI"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EncodingMethod {
    Cbr,
    Vbr,
    Abr,
    Unknown,
}

impl fmt::Display for EncodingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingMethod::Cbr => write!(f, "CBR"),
            EncodingMethod::Vbr => write!(f, "VBR"),
            EncodingMethod::Abr => write!(f, "ABR"),
            EncodingMethod::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Quality indicators derived from the raw Xing quality field.
///
/// LAME writes `100 - 10 * V - Q`, so `V` is recovered from the tens and
/// `Q` from the units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VbrQuality {
    pub v: i32,
    pub q: i32,
}

impl VbrQuality {
    pub fn from_raw(quality: u32) -> Self {
        // Both fit in i32 for any u32 input
        let v = 10 - i64::from(quality.div_ceil(10));
        let q = 10 - i64::from(quality % 10);
        Self {
            v: v as i32,
            q: q as i32,
        }
    }
}

/// Fields specific to the LAME extension of the Xing header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LameTag {
    /// Trimmed version string without the "LAME" prefix (e.g. "3.99", "EOS")
    pub version: String,
    pub tag_revision: Option<u8>,
    pub vbr_method: Option<u8>,
    pub nspsytune: Option<bool>,
    pub nssafejoint: Option<bool>,
    pub nogap_next: Option<bool>,
    pub nogap_previous: Option<bool>,
}

impl LameTag {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            tag_revision: None,
            vbr_method: None,
            nspsytune: None,
            nssafejoint: None,
            nogap_next: None,
            nogap_previous: None,
        }
    }

    pub fn with_vbr_method(mut self, method: u8) -> Self {
        self.vbr_method = Some(method);
        self
    }

    /// Integer before the first '.', or 0 if that part is not all digits
    pub fn version_major(&self) -> u32 {
        let major = self.version.split('.').next().unwrap_or_default();
        parse_digits(major).unwrap_or(0)
    }

    /// First two characters after the '.', or 0 unless both are digits.
    ///
    /// Only versions with exactly one '.' have a minor. "3.100" therefore
    /// reads as minor 10, while "3.99.1" reads as 0.
    pub fn version_minor(&self) -> u32 {
        self.version
            .split_once('.')
            .filter(|(_, rest)| !rest.contains('.'))
            .and_then(|(_, rest)| rest.get(..2))
            .and_then(parse_digits)
            .unwrap_or(0)
    }

    pub fn version_tuple(&self) -> (u32, u32) {
        (self.version_major(), self.version_minor())
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Decoded encoder header. Built once per file and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct XingHeader {
    kind: HeaderKind,
    method: EncodingMethod,
    quality: Option<VbrQuality>,
    lame: Option<LameTag>,
}

impl XingHeader {
    fn bare(kind: HeaderKind, method: EncodingMethod) -> Self {
        Self {
            kind,
            method,
            quality: None,
            lame: None,
        }
    }

    /// No recognised header; assumed CBR
    pub fn none() -> Self {
        Self::bare(HeaderKind::None, EncodingMethod::Cbr)
    }

    pub fn info() -> Self {
        Self::bare(HeaderKind::Info, EncodingMethod::Cbr)
    }

    pub fn vbri() -> Self {
        Self::bare(HeaderKind::Vbri, EncodingMethod::Vbr)
    }

    /// Xing header without a LAME tag (pre-3.90 LAME and other encoders)
    pub fn xing(quality: Option<VbrQuality>) -> Self {
        Self {
            quality,
            ..Self::bare(HeaderKind::Xing, EncodingMethod::Vbr)
        }
    }

    pub fn lame(quality: Option<VbrQuality>, tag: LameTag) -> Self {
        Self {
            kind: HeaderKind::Lame,
            method: EncodingMethod::Vbr,
            quality,
            lame: Some(tag),
        }
    }

    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    pub fn method(&self) -> EncodingMethod {
        self.method
    }

    pub fn quality(&self) -> Option<VbrQuality> {
        self.quality
    }

    pub fn vbr_quality_v(&self) -> Option<i32> {
        self.quality.map(|q| q.v)
    }

    pub fn vbr_quality_q(&self) -> Option<i32> {
        self.quality.map(|q| q.q)
    }

    pub fn lame_tag(&self) -> Option<&LameTag> {
        self.lame.as_ref()
    }

    pub fn lame_version(&self) -> Option<&str> {
        self.lame.as_ref().map(|t| t.version.as_str())
    }

    pub fn lame_version_major(&self) -> u32 {
        self.lame.as_ref().map_or(0, LameTag::version_major)
    }

    pub fn lame_version_minor(&self) -> u32 {
        self.lame.as_ref().map_or(0, LameTag::version_minor)
    }

    pub fn lame_tag_revision(&self) -> Option<u8> {
        self.lame.as_ref().and_then(|t| t.tag_revision)
    }

    pub fn lame_vbr_method(&self) -> Option<u8> {
        self.lame.as_ref().and_then(|t| t.vbr_method)
    }

    pub fn lame_nspsytune(&self) -> Option<bool> {
        self.lame.as_ref().and_then(|t| t.nspsytune)
    }

    pub fn lame_nssafejoint(&self) -> Option<bool> {
        self.lame.as_ref().and_then(|t| t.nssafejoint)
    }

    pub fn lame_nogap_next(&self) -> Option<bool> {
        self.lame.as_ref().and_then(|t| t.nogap_next)
    }

    pub fn lame_nogap_previous(&self) -> Option<bool> {
        self.lame.as_ref().and_then(|t| t.nogap_previous)
    }

    /// Coarse bitrate mode, as a tag library would report it.
    ///
    /// The LAME method code wins when present; otherwise the signature decides.
    pub fn bitrate_mode(&self) -> EncodingMethod {
        match self.lame_vbr_method() {
            Some(1 | 8) => EncodingMethod::Cbr,
            Some(2 | 9) => EncodingMethod::Abr,
            Some(3..=6) => EncodingMethod::Vbr,
            _ => match self.kind {
                HeaderKind::Xing | HeaderKind::Lame | HeaderKind::Vbri => EncodingMethod::Vbr,
                HeaderKind::Info => EncodingMethod::Cbr,
                HeaderKind::None => EncodingMethod::Unknown,
            },
        }
    }
}

impl fmt::Display for XingHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.method)?;
        if let Some(q) = self.quality {
            write!(f, " V{} Q{}", q.v, q.q)?;
        }
        if let Some(tag) = &self.lame {
            write!(f, " [{}", tag.version)?;
            if let Some(method) = tag.vbr_method {
                write!(f, ", vbr_method {}", method)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Decode the 5-byte version field: UTF-8 first, Windows-1252 otherwise.
///
/// Windows-1252 maps every byte, so this never fails.
fn decode_version_text(raw: &[u8]) -> String {
    let text = match std::str::from_utf8(raw) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _had_errors) = WINDOWS_1252.decode_without_bom_handling(raw);
            decoded
        }
    };

    let mut version = text.trim().to_string();
    if version.ends_with('.') {
        version.pop();
    }
    version
}

/// Decode the structure following a "Xing" signature. The cursor must sit
/// just past the signature.
fn decode_xing(cursor: &mut BitCursor<'_>) -> Result<XingHeader, DecodeError> {
    let flags = cursor.read_uint(32)?;
    let mut quality = None;

    for (mask, field) in XING_FIELDS {
        if flags & mask == 0 {
            continue;
        }
        match field {
            XingField::Frames | XingField::Bytes => cursor.skip_bytes(4)?,
            XingField::Toc => cursor.skip_bytes(TOC_LEN)?,
            XingField::Quality => quality = Some(VbrQuality::from_raw(cursor.read_uint(32)?)),
        }
    }

    let probe = cursor.read_bytes(LAME_PROBE_LEN)?;
    if !probe.starts_with(LAME_SIGNATURE) {
        return Ok(XingHeader::xing(quality));
    }

    let version = decode_version_text(&probe[LAME_SIGNATURE.len()..]);
    let tag_revision = cursor.read_uint(4)? as u8;
    let vbr_method = cursor.read_uint(4)? as u8;
    cursor.skip_bytes(LAME_OPAQUE_LEN)?;

    let tag = LameTag {
        version,
        tag_revision: Some(tag_revision),
        vbr_method: Some(vbr_method),
        nspsytune: Some(cursor.read_bool()?),
        nssafejoint: Some(cursor.read_bool()?),
        nogap_next: Some(cursor.read_bool()?),
        nogap_previous: Some(cursor.read_bool()?),
    };

    Ok(XingHeader::lame(quality, tag))
}

/// Classify a stream that has no "Xing" signature in the window
fn classify_fallback(cursor: &BitCursor<'_>, window: &SearchWindow) -> XingHeader {
    if let Some(pos) = cursor.find_aligned(INFO_SIGNATURE, window.start, window.end) {
        debug!(offset = pos, "found Info signature");
        return XingHeader::info();
    }
    if let Some(pos) = cursor.find_aligned(VBRI_SIGNATURE, window.start, window.end) {
        debug!(offset = pos, "found VBRI signature");
        return XingHeader::vbri();
    }
    XingHeader::none()
}

/// Decode the encoder header of an in-memory MP3 file
pub fn read_xing(data: &[u8]) -> Result<XingHeader, DecodeError> {
    read_xing_with(data, &ScanLimits::default())
}

pub fn read_xing_with(data: &[u8], limits: &ScanLimits) -> Result<XingHeader, DecodeError> {
    let window = id3::resolve_search_window(data, limits);
    let mut cursor = BitCursor::new(data);

    match cursor.find_aligned(XING_SIGNATURE, window.start, window.end) {
        Some(pos) => {
            debug!(offset = pos, "found Xing signature");
            cursor.seek_bytes(pos + XING_SIGNATURE.len())?;
            decode_xing(&mut cursor)
        }
        None => Ok(classify_fallback(&cursor, &window)),
    }
}

/// Read an MP3 file from disk and decode its encoder header
pub fn read_xing_file<P: AsRef<Path>>(path: P, limits: &ScanLimits) -> Result<XingHeader> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(read_xing_with(&data, limits)?)
}
