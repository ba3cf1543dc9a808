//! Per-file probing
//!
//! [`Prober`] reads one file's tags and stream facts and flattens them into
//! a [`ProbeResult`] for listings and reports. Failures are recorded in the
//! result rather than returned, so a batch keeps going past bad files.

use crate::mp3::{HeaderKind, ScanLimits};
use crate::tags;
use crate::track::Track;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Flattened outcome of probing a single file
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub file_path: String,
    pub file_name: String,
    pub format: Option<String>,
    pub setting: Option<String>,
    pub codec: Option<String>,
    pub header_kind: Option<HeaderKind>,
    pub lame_version: Option<String>,
    pub length_seconds: f64,
    pub bitrate: u32,
    /// Filename built from the tags, when they carry enough to build one
    pub suggested_name: Option<String>,
    pub complete: bool,
    pub error: Option<String>,
}

impl ProbeResult {
    fn empty(file_path: String, file_name: String) -> Self {
        Self {
            file_path,
            file_name,
            format: None,
            setting: None,
            codec: None,
            header_kind: None,
            lame_version: None,
            length_seconds: 0.0,
            bitrate: 0,
            suggested_name: None,
            complete: false,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Prober {
    /// Bounds for the MP3 encoder header search
    pub limits: ScanLimits,
    /// Put the track artists in suggested filenames
    pub include_artist_in_name: bool,
}

impl Prober {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_artist_in_name(mut self, include: bool) -> Self {
        self.include_artist_in_name = include;
        self
    }

    /// Read the track at `path` with this prober's limits
    pub fn read_track<P: AsRef<Path>>(&self, path: P) -> crate::Result<Track> {
        tags::read_tags_with(path, &self.limits)
    }

    /// Probe a single file. Never fails: problems end up in `error`.
    pub fn probe<P: AsRef<Path>>(&self, path: P) -> ProbeResult {
        let path = path.as_ref();
        let file_path = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.clone());

        let mut result = ProbeResult::empty(file_path, file_name);

        let track = match self.read_track(path) {
            Ok(track) => track,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "probe failed");
                result.error = Some(e.to_string());
                return result;
            }
        };

        result.suggested_name = track.filename(self.include_artist_in_name);
        result.complete = track.is_complete();

        if let Some(info) = &track.stream_info {
            let descriptor = info.codec_descriptor();
            result.format = Some(descriptor.format.to_string());
            result.codec = Some(descriptor.codec());
            result.setting = descriptor.setting;
            result.length_seconds = info.length_seconds();
            result.bitrate = info.bitrate();
            result.header_kind = info.xing().map(|x| x.kind());
            result.lame_version = info
                .xing()
                .and_then(|x| x.lame_version())
                .map(str::to_string);
        }

        debug!(path = %path.display(), codec = ?result.codec, "probed");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_mp3() -> Vec<u8> {
        let mut frame = vec![0u8; 417];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        frame.repeat(20)
    }

    // ==========================================================================
    // CONFIGURATION
    // ==========================================================================

    #[test]
    fn test_prober_defaults() {
        let prober = Prober::new();

        assert_eq!(prober.limits, ScanLimits::default());
        assert!(!prober.include_artist_in_name);
    }

    #[test]
    fn test_prober_builder() {
        let limits = ScanLimits {
            id3_scan_limit: 512,
            post_tag_window: 2048,
        };
        let prober = Prober::new().with_limits(limits).with_artist_in_name(true);

        assert_eq!(prober.limits.id3_scan_limit, 512);
        assert_eq!(prober.limits.post_tag_window, 2048);
        assert!(prober.include_artist_in_name);
    }

    // ==========================================================================
    // PROBING
    // ==========================================================================

    #[test]
    fn test_probe_missing_file_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Prober::new().probe(dir.path().join("gone.flac"));

        assert!(result.is_error());
        assert_eq!(result.file_name, "gone.flac");
        assert_eq!(result.codec, None);
        assert_eq!(result.bitrate, 0);
    }

    #[test]
    fn test_probe_untagged_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.mp3");
        std::fs::write(&path, synthetic_mp3()).unwrap();

        let result = Prober::new().probe(&path);

        assert!(!result.is_error(), "unexpected error: {:?}", result.error);
        assert_eq!(result.format.as_deref(), Some("MP3"));
        assert_eq!(result.setting.as_deref(), Some("CBR"));
        assert_eq!(result.codec.as_deref(), Some("CBR MP3"));
        assert_eq!(result.header_kind, Some(HeaderKind::None));
        assert_eq!(result.lame_version, None);
        assert!(result.bitrate > 0);
        assert_eq!(result.suggested_name, None, "No tags, no name");
        assert!(!result.complete);
    }

    #[test]
    fn test_probe_suggested_name_with_artist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.mp3");
        std::fs::write(&path, synthetic_mp3()).unwrap();

        let track = Track {
            artists: vec!["Autechre".to_string()],
            track_title: Some("Rae".to_string()),
            track_number: Some(4),
            ..Track::default()
        };
        tags::write_tags(&path, &track).unwrap();

        let plain = Prober::new().probe(&path);
        assert_eq!(plain.suggested_name.as_deref(), Some("04 - Rae.mp3"));

        let with_artist = Prober::new().with_artist_in_name(true).probe(&path);
        assert_eq!(
            with_artist.suggested_name.as_deref(),
            Some("04 - Autechre - Rae.mp3")
        );
    }
}
