//! CSV export and console preview of collected records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fund_collector::{FundRecord, SourceKind, SourceOutcome};

/// UTF-8 byte-order mark, written first so spreadsheet tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Export file name for a source.
pub fn file_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Dipa => "dipa_funds_all.csv",
        SourceKind::DipaDetail => "dipa_detail_funds_all.csv",
        SourceKind::Vcs => "vcs_rsh_funds_all.csv",
        SourceKind::Diva => "diva_funds_all.csv",
        SourceKind::Rcms => "rcms_funds_all.csv",
    }
}

/// Write BOM, header row and one row per record.
pub fn write_csv<W: Write>(mut out: W, records: &[FundRecord]) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(FundRecord::COLUMNS)?;
    for record in records {
        writer.write_record(record.values())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `<dir>/<file_name(kind)>` and return its path.
pub fn export_source(dir: &Path, kind: SourceKind, records: &[FundRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(file_name(kind));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(BufWriter::new(file), records)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Export every successful outcome, in order.
///
/// A failed write is logged and reported for that source only; the sources
/// after it are still exported. Failed fetches produce no entry.
pub fn export_outcomes(dir: &Path, outcomes: &[SourceOutcome]) -> Vec<(SourceKind, Result<PathBuf>)> {
    outcomes
        .iter()
        .filter_map(|outcome| {
            let records = outcome.records()?;
            let result = export_source(dir, outcome.source, records);
            match &result {
                Ok(path) => tracing::info!("{}: wrote {}", outcome.source, path.display()),
                Err(e) => tracing::error!("{}: export failed: {e:#}", outcome.source),
            }
            Some((outcome.source, result))
        })
        .collect()
}

/// Header plus at most `limit` rows, cells separated by ` | `.
pub fn preview_lines(records: &[FundRecord], limit: usize) -> Vec<String> {
    if limit == 0 || records.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![FundRecord::COLUMNS.join(" | ")];
    lines.extend(
        records
            .iter()
            .take(limit)
            .map(|r| r.values().map(|v| v.replace('\n', " ")).join(" | ")),
    );
    if records.len() > limit {
        lines.push(format!("... {} more rows", records.len() - limit));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> FundRecord {
        FundRecord {
            fund_nm: name.to_string(),
            reg_dd: "2024-01-01".to_string(),
            ..FundRecord::blank()
        }
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record("가나, 1호")]).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), FundRecord::COLUMNS.join(","));
        assert_eq!(lines.next().unwrap(), ",,\"가나, 1호\",,,,,,2024-01-01,,,,");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_export_source_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_source(dir.path(), SourceKind::Vcs, &[record("a")]).unwrap();
        assert_eq!(path.file_name().unwrap(), "vcs_rsh_funds_all.csv");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
    }

    #[test]
    fn test_failed_write_does_not_stop_later_sources() {
        let dir = tempfile::tempdir().unwrap();
        // a directory squatting on the rcms file name makes that write fail
        std::fs::create_dir(dir.path().join(file_name(SourceKind::Rcms))).unwrap();

        let outcomes = vec![
            SourceOutcome {
                source: SourceKind::Rcms,
                result: Ok(vec![record("r")]),
            },
            SourceOutcome {
                source: SourceKind::Diva,
                result: Err(fund_collector::FundError::InvalidInput("down".to_string())),
            },
            SourceOutcome {
                source: SourceKind::Vcs,
                result: Ok(vec![record("v")]),
            },
        ];

        let exports = export_outcomes(dir.path(), &outcomes);
        assert_eq!(exports.len(), 2);
        assert_eq!(exports[0].0, SourceKind::Rcms);
        assert!(exports[0].1.is_err());
        assert_eq!(exports[1].0, SourceKind::Vcs);
        let written = exports[1].1.as_ref().unwrap();
        assert!(std::fs::read(written).unwrap().starts_with(UTF8_BOM));
    }

    #[test]
    fn test_preview_truncates() {
        let records: Vec<_> = (0..5).map(|i| record(&format!("f{i}"))).collect();
        let lines = preview_lines(&records, 2);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("f0"));
        assert_eq!(lines[3], "... 3 more rows");
        assert!(preview_lines(&records, 0).is_empty());
    }

    #[test]
    fn test_file_names_are_distinct() {
        let mut names: Vec<_> = SourceKind::ALL.iter().map(|k| file_name(*k)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), SourceKind::ALL.len());
    }
}
