use super::record::Dataset;
use super::loader::load_csv;
use super::writer::write_scored_csv;
use crate::error::PipelineError;
use tempfile::tempdir;
use std::fs;

fn table(rows: &[&[&str]]) -> Dataset {
    let headers = vec!["a".to_string(), "b".to_string(), "label".to_string()];
    let rows = rows
        .iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
    Dataset::new("mem.csv", headers, rows).unwrap()
}

#[test]
fn test_forward_fill_propagates_last_value() {
    let mut ds = table(&[
        &["1.0", "2.0", "normal"],
        &["", "NaN", ""],
        &["3.0", "", "attack"],
    ]);

    let report = ds.forward_fill();

    assert_eq!(report.filled, 4);
    assert!(report.unresolved.is_empty());
    assert_eq!(ds.rows[1], vec!["1.0", "2.0", "normal"]);
    assert_eq!(ds.rows[2], vec!["3.0", "2.0", "attack"]);
}

#[test]
fn test_leading_gap_stays_missing() {
    let mut ds = table(&[
        &["", "2.0", "normal"],
        &["", "2.5", "normal"],
        &["4.0", "3.0", "normal"],
    ]);

    let report = ds.forward_fill();
    assert_eq!(report.unresolved, vec![("a".to_string(), 0)]);

    let cols = ds.feature_columns("label");
    match ds.feature_matrix(&cols) {
        Err(PipelineError::MissingValue { column, row }) => {
            assert_eq!(column, "a");
            assert_eq!(row, 0);
        }
        other => panic!("Expected MissingValue, got {:?}", other),
    }
}

#[test]
fn test_feature_matrix_excludes_label_and_respects_order() {
    let ds = table(&[&["1", "10", "x"], &["2", "20", "y"]]);

    let m = ds.feature_matrix(&["b".to_string(), "a".to_string()]).unwrap();
    assert_eq!(m.shape(), &[2, 2]);
    assert_eq!(m[[0, 0]], 10.0);
    assert_eq!(m[[1, 1]], 2.0);
    assert_eq!(ds.feature_columns("label"), vec!["a", "b"]);
}

#[test]
fn test_non_numeric_cell_is_data_load_error() {
    let ds = table(&[&["1", "abc", "x"]]);
    let err = ds.feature_matrix(&ds.feature_columns("label")).unwrap_err();
    assert!(matches!(err, PipelineError::DataLoad { .. }));
    assert!(err.to_string().contains("'b'"));
}

#[test]
fn test_infinite_cell_is_data_load_error() {
    for cell in ["inf", "-inf", "1e400"] {
        let ds = table(&[&["1.0", "2.0", "normal"], &["3.0", cell, "normal"]]);
        let cols = ds.feature_columns("label");
        match ds.feature_matrix(&cols) {
            Err(PipelineError::DataLoad { reason, .. }) => {
                assert!(reason.contains("non-finite"), "{}", reason);
                assert!(reason.contains("'b'"));
            }
            other => panic!("Expected DataLoad for '{}', got {:?}", cell, other),
        }
    }
}

#[test]
fn test_reject_duplicate_and_ragged() {
    let dup = Dataset::new("d.csv", vec!["a".into(), "a".into()], vec![]);
    assert!(matches!(dup, Err(PipelineError::DataLoad { .. })));

    let ragged = Dataset::new("r.csv", vec!["a".into(), "b".into()], vec![vec!["1".into()]]);
    assert!(matches!(ragged, Err(PipelineError::DataLoad { .. })));
}

#[test]
fn test_load_csv_reads_header_and_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.csv");
    fs::write(&path, "a,b,label\n1.5, 2 ,normal\n,4,attack\n").unwrap();

    let ds = load_csv(&path).unwrap();
    assert_eq!(ds.headers, vec!["a", "b", "label"]);
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.rows[0][1], "2");
    assert_eq!(ds.column("a").unwrap(), vec![Some("1.5"), None]);
}

#[test]
fn test_load_csv_missing_file() {
    let dir = tempdir().unwrap();
    let err = load_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, PipelineError::DataLoad { .. }));
}

#[test]
fn test_load_csv_header_only() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "a,b,label\n").unwrap();
    assert!(matches!(load_csv(&path), Err(PipelineError::DataLoad { .. })));
}

#[test]
fn test_write_scored_csv_appends_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("scores.csv");
    let ds = table(&[&["1", "2", "x"], &["3", "4", "y"]]);

    let count = write_scored_csv(&ds, &[0.5, 0.25], &[1, 0], &path).unwrap();
    assert_eq!(count, 2);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "a,b,label,reconstruction_error,predicted_label");
    assert_eq!(lines[1], "1,2,x,0.5,1");
    assert_eq!(lines[2], "3,4,y,0.25,0");
}

#[test]
fn test_write_scored_csv_length_mismatch_leaves_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.csv");
    let ds = table(&[&["1", "2", "x"]]);

    assert!(write_scored_csv(&ds, &[0.1, 0.2], &[0], &path).is_err());
    assert!(!path.exists());
}
