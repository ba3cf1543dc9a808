//! Report generation for probe results
//!
//! - **JSON**: machine-readable, with a summary and a timestamp
//! - **CSV**: spreadsheet-compatible, one row per file
//!
//! # Usage
//!
//! ```ignore
//! use tagscope::report;
//!
//! // Format follows the extension
//! report::generate("library.json", &results)?;  // JSON
//! report::generate("library.csv", &results)?;   // CSV
//! ```

pub mod csv;
pub mod json;

use crate::probe::ProbeResult;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Generate a report in the format matching the file extension
pub fn generate<P: AsRef<Path>>(path: P, results: &[ProbeResult]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, results),
        _ => csv::write(&mut file, results),
    }
}

/// Summary statistics for a batch of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub mp3: usize,
    pub flac: usize,
    pub mp4: usize,
    /// Files whose tags lack artist, album, date, title or track number
    pub incomplete: usize,
    pub error: usize,
}

impl Summary {
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for r in results {
            if r.is_error() {
                summary.error += 1;
                continue;
            }
            match r.format.as_deref() {
                Some("MP3") => summary.mp3 += 1,
                Some("FLAC") => summary.flac += 1,
                Some("MP4") => summary.mp4 += 1,
                _ => {}
            }
            if !r.complete {
                summary.incomplete += 1;
            }
        }

        summary
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Result for a successfully probed file
    pub(crate) fn create_test_result(format: &str, setting: Option<&str>) -> ProbeResult {
        ProbeResult {
            file_path: format!("/music/album/track.{}", format.to_lowercase()),
            file_name: format!("track.{}", format.to_lowercase()),
            format: Some(format.to_string()),
            setting: setting.map(str::to_string),
            codec: Some(match setting {
                Some(s) => format!("{} {}", s, format),
                None => format.to_string(),
            }),
            header_kind: None,
            lame_version: None,
            length_seconds: 180.0,
            bitrate: 320_000,
            suggested_name: None,
            complete: true,
            error: None,
        }
    }

    pub(crate) fn create_error_result(message: &str) -> ProbeResult {
        ProbeResult {
            format: None,
            setting: None,
            codec: None,
            length_seconds: 0.0,
            bitrate: 0,
            error: Some(message.to_string()),
            ..create_test_result("MP3", None)
        }
    }

    // ==========================================================================
    // SUMMARY STATISTICS TESTS
    // ==========================================================================

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_summary_mixed() {
        let mut incomplete = create_test_result("FLAC", Some("24bit"));
        incomplete.complete = false;

        let results = vec![
            create_test_result("MP3", Some("V0")),
            create_test_result("MP3", Some("CBR")),
            create_test_result("FLAC", None),
            incomplete,
            create_test_result("MP4", Some("UNKNOWN")),
            create_error_result("file not found"),
        ];
        let summary = Summary::from_results(&results);

        assert_eq!(summary.total, 6);
        assert_eq!(summary.mp3, 2);
        assert_eq!(summary.flac, 2);
        assert_eq!(summary.mp4, 1);
        assert_eq!(summary.incomplete, 1);
        assert_eq!(summary.error, 1);
    }

    #[test]
    fn test_summary_errors_not_counted_as_incomplete() {
        let results = vec![create_error_result("bad"), create_error_result("worse")];
        let summary = Summary::from_results(&results);

        assert_eq!(summary.error, 2);
        assert_eq!(summary.incomplete, 0);
        assert_eq!(summary.mp3, 0);
    }

    // ==========================================================================
    // FORMAT SELECTION
    // ==========================================================================

    #[test]
    fn test_generate_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![create_test_result("MP3", Some("V2"))];

        let json_path = dir.path().join("report.JSON");
        generate(&json_path, &results).unwrap();
        let json = std::fs::read_to_string(&json_path).unwrap();
        assert!(json.trim_start().starts_with('{'));

        let csv_path = dir.path().join("report.txt");
        generate(&csv_path, &results).unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("format,setting,"));
    }
}
