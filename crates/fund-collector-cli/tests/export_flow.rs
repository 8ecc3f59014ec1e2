//! Export flow: outcomes from several sources land in separate CSV files
//! and failed sources are reported without a file.

use fund_collector::{FundError, FundRecord, SourceKind, SourceOutcome, YearRange};
use fund_collector_cli::{export_source, summary, write_csv};

fn record(inst: &str, fund: &str) -> FundRecord {
    FundRecord {
        oper_inst_nm: inst.to_string(),
        fund_nm: fund.to_string(),
        fund_nm_split: fund.to_string(),
        fund_nm_raw: fund.to_string(),
        reg_dd: "2024-02-01".to_string(),
        ..FundRecord::blank()
    }
}

#[test]
fn successful_sources_are_exported_and_failures_are_not() {
    let dir = tempfile::tempdir().unwrap();
    let outcomes = vec![
        SourceOutcome {
            source: SourceKind::Rcms,
            result: Ok(vec![record("가나", "펀드1"), record("다라", "펀드2")]),
        },
        SourceOutcome {
            source: SourceKind::Dipa,
            result: Err(FundError::Transport {
                url: "https://dipa.kban.or.kr/pblntf/pblntfList".to_string(),
                message: "timed out".to_string(),
            }),
        },
    ];

    let mut exported = Vec::new();
    for outcome in &outcomes {
        if let Some(records) = outcome.records() {
            let path = export_source(dir.path(), outcome.source, records).unwrap();
            exported.push((outcome.source.name().to_string(), path.display().to_string()));
        }
    }

    assert_eq!(exported.len(), 1);
    let written = std::fs::read(dir.path().join("rcms_funds_all.csv")).unwrap();
    let mut expected = Vec::new();
    write_csv(&mut expected, outcomes[0].records().unwrap()).unwrap();
    assert_eq!(written, expected);
    assert!(!dir.path().join("dipa_funds_all.csv").exists());

    let value = summary(&outcomes, YearRange::new(2023, 2025).unwrap(), &exported);
    assert_eq!(value["sources"][0]["rows"], 2);
    assert_eq!(value["sources"][1]["success"], false);
    assert!(value["sources"][1]["error"]
        .as_str()
        .unwrap()
        .contains("timed out"));
}
