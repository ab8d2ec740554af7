//! Unit tests for the database loader

use kipair::pipeline::{
    load_measurements, load_table, read_table, ColumnMap, CurateError, InputFormat,
};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_input_format_detection() {
    assert_eq!(
        InputFormat::from_path(Path::new("db.tsv")).unwrap(),
        InputFormat::Tsv
    );
    assert_eq!(
        InputFormat::from_path(Path::new("DB.CSV")).unwrap(),
        InputFormat::Csv
    );
    assert!(matches!(
        InputFormat::from_path(Path::new("db.parquet")),
        Err(CurateError::Format { .. })
    ));
}

#[test]
fn test_load_tsv_projects_requested_columns() {
    let (_dir, path) = create_temp_database(&two_protein_rows("100", "5"));

    let columns = vec!["PubChem CID".to_string(), "Ki (nM)".to_string()];
    let df = load_table(&path, &columns, false).unwrap();

    assert_eq!(df.height(), 2);
    assert_eq!(df.get_column_names(), &["PubChem CID", "Ki (nM)"]);
}

#[test]
fn test_load_csv_matches_tsv() {
    let temp_dir = TempDir::new().unwrap();
    let rows = two_protein_rows("100", "5");
    let tsv = write_database(temp_dir.path(), "db.tsv", &rows);
    let csv = write_database(temp_dir.path(), "db.csv", &rows);

    let from_tsv = load_measurements(&tsv, &ColumnMap::default(), false).unwrap();
    let from_csv = load_measurements(&csv, &ColumnMap::default(), false).unwrap();

    assert_eq!(from_tsv, from_csv);
    assert_eq!(from_tsv[0].ki.as_deref(), Some("100"));
    assert_eq!(from_tsv[1].sequence.as_deref(), Some(SEQ_B));
}

#[test]
fn test_unsupported_extension_is_format_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.xlsx");
    std::fs::write(&path, "a\tb\n1\t2\n").unwrap();

    let err = load_measurements(&path, &ColumnMap::default(), false).unwrap_err();
    assert!(matches!(err, CurateError::Format { .. }));
}

#[test]
fn test_missing_column_is_column_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.tsv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "Ligand SMILES\tKi (nM)").unwrap();
    writeln!(file, "CCO\t10").unwrap();
    drop(file);

    match load_measurements(&path, &ColumnMap::default(), false) {
        Err(CurateError::Column { column, available }) => {
            assert_eq!(column, "Target Name");
            assert_eq!(available, vec!["Ligand SMILES", "Ki (nM)"]);
        }
        other => panic!("expected column error, got {:?}", other),
    }
}

#[test]
fn test_censored_ki_survives_as_text() {
    let (_dir, path) = create_temp_database(&[
        [ASPIRIN, "P1", ">100000", SEQ_A, "2244"],
        [ASPIRIN, "P2", "12.5", SEQ_B, "2244"],
    ]);

    let rows = load_measurements(&path, &ColumnMap::default(), false).unwrap();
    assert_eq!(rows[0].ki.as_deref(), Some(">100000"));
    assert_eq!(rows[1].ki.as_deref(), Some("12.5"));
}

#[test]
fn test_empty_cells_are_missing() {
    let (_dir, path) = create_temp_database(&[
        [ASPIRIN, "P1", "", SEQ_A, "2244"],
        [ASPIRIN, "P2", "3", SEQ_B, "2244"],
    ]);

    let rows = load_measurements(&path, &ColumnMap::default(), false).unwrap();
    assert!(rows[0].clone().complete().is_none());
    assert!(rows[1].clone().complete().is_some());
}

#[test]
fn test_read_table_keeps_every_column() {
    let (_dir, path) = create_temp_database(&two_protein_rows("1", "2"));
    let df = read_table(&path).unwrap();
    assert_eq!(df.width(), 5);
}
