//! CSV report generation

use crate::probe::ProbeResult;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, results: &[ProbeResult]) -> io::Result<()> {
    writeln!(
        writer,
        "format,setting,filepath,header,lame_version,length_secs,bitrate_kbps,suggested_name,error"
    )?;

    for r in results {
        let header = r
            .header_kind
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            writer,
            "{},{},{},{},{},{:.2},{},{},{}",
            r.format.as_deref().unwrap_or("-"),
            escape_csv(r.setting.as_deref().unwrap_or("-")),
            escape_csv(&r.file_path),
            header,
            escape_csv(r.lame_version.as_deref().unwrap_or("-")),
            r.length_seconds,
            r.bitrate / 1000,
            escape_csv(r.suggested_name.as_deref().unwrap_or("")),
            escape_csv(r.error.as_deref().unwrap_or("")),
        )?;
    }

    Ok(())
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
