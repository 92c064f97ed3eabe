//! File round trips: CSV load, CSV export, profile persistence.

use std::fs;

use rowmatch_core::{DatasetSink, MatchSession, RunOptions};
use rowmatch_ingest::{CsvSink, load_profile, read_csv_table, save_profile};
use rowmatch_model::{CellValue, Dataset, MatchSettings, Pruning, ThresholdKind};

#[test]
fn test_read_csv_table_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    fs::write(&path, "\u{feff}lastname , state\nSmith, CA \n\n\"Jones, Jr\",TX\n").unwrap();

    let table = read_csv_table(&path).unwrap();
    assert_eq!(table.columns, vec!["lastname", "state"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0][1], CellValue::text("CA"));
    assert_eq!(table.rows[1][0], CellValue::text("Jones, Jr"));
}

#[test]
fn test_read_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = read_csv_table(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn test_csv_sink_round_trip() {
    let dataset = Dataset::from_rows(
        ["lastname", "match_status"],
        [["Smith", "MATCHED"], ["O'Brien, Pat", "UNMATCHED"]],
    );
    let mut sink = CsvSink::from_writer(Vec::new());
    sink.write_dataset(&dataset).unwrap();
    let bytes = sink.into_inner().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(
        text,
        "lastname,match_status\nSmith,MATCHED\n\"O'Brien, Pat\",UNMATCHED\n"
    );

    let reread = rowmatch_ingest::read_csv_from(text.as_bytes(), "inline").unwrap();
    let reread = rowmatch_core::normalize(&reread);
    assert_eq!(reread.columns(), dataset.columns());
    assert_eq!(reread.rows(), dataset.rows());
}

#[test]
fn test_session_export_to_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let incoming_path = dir.path().join("incoming.csv");
    let reference_path = dir.path().join("reference.csv");
    fs::write(&incoming_path, "lastname,state\nSmith,CA\nDoe,NY\n").unwrap();
    fs::write(&reference_path, "lastname,state,id\nSmyth,CA,7\nSmith,CA,8\n").unwrap();

    let incoming = read_csv_table(&incoming_path).unwrap();
    let reference = read_csv_table(&reference_path).unwrap();
    let snapshot = MatchSettings::with_columns(["lastname", "state"])
        .snapshot()
        .unwrap();
    let mut session = MatchSession::new(&incoming, &reference, snapshot);
    session.run(&RunOptions::sequential()).unwrap();
    session.apply_to_columns(&["id".to_string()]).unwrap();

    let output = dir.path().join("out").join("matched.csv");
    let mut sink = CsvSink::create(&output).unwrap();
    session.export(&mut sink).unwrap();
    drop(sink);

    let written = fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("lastname,state,id,matched_row,match_score,match_status")
    );
    assert_eq!(lines.next(), Some("Smith,CA,8,3,1.0000,MATCHED"));
    assert_eq!(lines.next(), Some("Doe,NY,,,,UNMATCHED"));
}

#[test]
fn test_matched_row_points_at_reference_file_line() {
    let dir = tempfile::tempdir().unwrap();
    let reference_path = dir.path().join("reference.csv");
    fs::write(
        &reference_path,
        "lastname,state,id\n\nSmyth,NY,7\n\nSmith,CA,8\nJones,TX,9\n\nJones,TX,10\n",
    )
    .unwrap();
    let reference = read_csv_table(&reference_path).unwrap();
    let incoming =
        rowmatch_ingest::read_csv_from("lastname,state\nSmith,CA\nJones,TX\n".as_bytes(), "inline")
            .unwrap();

    let snapshot = MatchSettings::with_columns(["lastname", "state"])
        .snapshot()
        .unwrap();
    let mut session = MatchSession::new(&incoming, &reference, snapshot);
    session.run(&RunOptions::sequential()).unwrap();
    let augmented = session.apply_to_columns(&["id".to_string()]).unwrap();

    assert_eq!(augmented.get(0, "id"), Some("8"));
    assert_eq!(augmented.get(0, "matched_row"), Some("5"));
    assert_eq!(augmented.get(1, "matched_row"), Some("6, 8"));
}

#[test]
fn test_profile_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("profile.toml");

    let mut settings = MatchSettings::with_columns(["lastname", "party"]);
    settings.apply_recommended();
    settings.pruning = Pruning::Auto;
    settings.set_threshold(ThresholdKind::Total, 0.9).unwrap();
    settings.swap_priority(1, 4, Some("lastname")).unwrap();

    save_profile(&path, &settings).unwrap();
    let loaded = load_profile(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_missing_profile_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_profile(&dir.path().join("profile.toml")).unwrap();
    assert_eq!(loaded, MatchSettings::default());
}

#[test]
fn test_partial_profile_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.toml");
    fs::write(&path, "total_threshold = 0.9\ncolumns = [\"lastname\"]\n").unwrap();
    let loaded = load_profile(&path).unwrap();
    assert_eq!(loaded.total_threshold, 0.9);
    assert_eq!(loaded.fuzzy_threshold, 0.75);
    assert_eq!(loaded.columns, vec!["lastname"]);
}

#[test]
fn test_malformed_profile_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.toml");
    fs::write(&path, "[priorities]\ndefault = [\"exact\", \"exact\"]\n").unwrap();
    assert!(load_profile(&path).is_err());
}
