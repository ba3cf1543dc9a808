//! JSON report generation

use crate::probe::ProbeResult;
use crate::report::Summary;
use chrono::Local;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    summary: Summary,
    files: &'a [ProbeResult],
}

pub fn write<W: Write>(writer: &mut W, results: &[ProbeResult]) -> io::Result<()> {
    let report = JsonReport {
        generated: Local::now().to_rfc3339(),
        summary: Summary::from_results(results),
        files: results,
    };

    serde_json::to_writer_pretty(&mut *writer, &report).map_err(io::Error::other)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{create_error_result, create_test_result};
    use serde_json::Value;

    #[test]
    fn test_json_structure() {
        let results = vec![
            create_test_result("FLAC", Some("24bit")),
            create_error_result("file not found"),
        ];

        let mut out = Vec::new();
        write(&mut out, &results).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();

        assert!(value["generated"].as_str().is_some_and(|s| s.contains('T')));
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["flac"], 1);
        assert_eq!(value["summary"]["error"], 1);

        let files = value["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["codec"], "24bit FLAC");
        assert_eq!(files[1]["error"], "file not found");
        assert!(files[1]["codec"].is_null());
    }

    #[test]
    fn test_header_kind_serialized_uppercase() {
        let mut result = create_test_result("MP3", Some("APS"));
        result.header_kind = Some(crate::mp3::HeaderKind::Lame);

        let mut out = Vec::new();
        write(&mut out, &[result]).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["files"][0]["header_kind"], "LAME");
    }
}
