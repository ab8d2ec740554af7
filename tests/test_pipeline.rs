//! End-to-end tests running the kipair binary

use assert_cmd::Command;
use kipair::pipeline::{pairs_from_frames, read_table};
use predicates::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn database_rows() -> Vec<[&'static str; 5]> {
    vec![
        [ASPIRIN, "P1", "100", SEQ_A, "2244"],
        [ASPIRIN, "P2", "5", SEQ_B, "2244"],
        [CAFFEINE, "P1", "40", SEQ_A, "2519"],
        [CAFFEINE, "P1", "60", SEQ_A, "2519"],
        [CAFFEINE, "P3", "30", SEQ_C, "2519"],
        [ETHANOL, "P1", "1", SEQ_A, "702"],
        [ETHANOL, "P2", "1000", SEQ_B, "702"],
        [ASPIRIN, "P3", ">100000", SEQ_C, "2244"],
    ]
}

fn kipair() -> Command {
    Command::cargo_bin("kipair").unwrap()
}

#[test]
fn test_full_pipeline_writes_every_output() {
    let temp_dir = TempDir::new().unwrap();
    let db = write_database(temp_dir.path(), "db.tsv", &database_rows());
    let out = temp_dir.path().join("out");

    kipair()
        .args(["-i", db.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--alphafold", "--no-confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("curation complete"));

    for name in [
        "data_prot.csv",
        "AF_input.csv",
        "clean_data.csv",
        "data_A.csv",
        "data_B.csv",
        "run_summary.json",
    ] {
        assert!(out.join(name).exists(), "{} should be written", name);
    }
    assert!(out.join("figures").join("ka_kb.svg").exists());

    // Ethanol is too small; caffeine 50 vs 30 is not differentiated
    let a = read_table(&out.join("data_A.csv")).unwrap();
    let b = read_table(&out.join("data_B.csv")).unwrap();
    let pairs = pairs_from_frames(&a, &b).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].a.sequence, SEQ_A);
    assert_eq!(pairs[0].b.sequence, SEQ_B);

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("run_summary.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["summary"]["cleaning"]["raw_rows"], 8);
    assert_eq!(manifest["summary"]["cleaning"]["final_rows"], 4);
    assert_eq!(manifest["summary"]["pairs"], 1);
}

#[test]
fn test_exclusions_remove_rows_before_pairing() {
    let temp_dir = TempDir::new().unwrap();
    let db = write_database(temp_dir.path(), "db.tsv", &database_rows());
    // Cleaned table is sorted by (sequence, ligand): row 1 is SEQ_A/aspirin
    let train = write_single_column(temp_dir.path(), "train.csv", &[1]);
    let out = temp_dir.path().join("out");

    kipair()
        .args(["-i", db.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["-x", train.to_str().unwrap(), "--no-plot", "--no-confirm"])
        .assert()
        .success();

    let filtered = read_table(&out.join("clean_data.csv")).unwrap();
    assert_eq!(filtered.height(), 3);
    let a = read_table(&out.join("data_A.csv")).unwrap();
    assert_eq!(a.height(), 0);
    assert!(!out.join("figures").join("ka_kb.svg").exists());
}

#[test]
fn test_out_of_range_exclusion_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = write_database(temp_dir.path(), "db.tsv", &database_rows());
    let train = write_single_column(temp_dir.path(), "train.csv", &[99]);
    let out = temp_dir.path().join("out");

    kipair()
        .args(["-i", db.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["-x", train.to_str().unwrap(), "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Exclusion index 99"));
}

#[test]
fn test_unsupported_input_format_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("db.json");
    std::fs::write(&db, "{}").unwrap();

    kipair()
        .args(["-i", db.to_str().unwrap(), "--no-confirm"])
        .current_dir(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_plot_subcommand_with_score_mismatch_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = write_database(temp_dir.path(), "db.tsv", &database_rows());
    let out = temp_dir.path().join("out");

    kipair()
        .args(["-i", db.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--no-plot", "--no-confirm"])
        .assert()
        .success();

    let scores = write_single_column(temp_dir.path(), "scores.csv", &[0.5, 0.7]);
    kipair()
        .arg("plot")
        .args(["--table-a", out.join("data_A.csv").to_str().unwrap()])
        .args(["--table-b", out.join("data_B.csv").to_str().unwrap()])
        .args(["--scores", scores.to_str().unwrap()])
        .args(["-o", temp_dir.path().join("re.svg").to_str().unwrap()])
        .assert()
        .failure();

    let scores = write_single_column(temp_dir.path(), "scores.csv", &[0.5]);
    let svg = temp_dir.path().join("re.svg");
    kipair()
        .arg("plot")
        .args(["--table-a", out.join("data_A.csv").to_str().unwrap()])
        .args(["--table-b", out.join("data_B.csv").to_str().unwrap()])
        .args(["--scores", scores.to_str().unwrap()])
        .args(["-o", svg.to_str().unwrap()])
        .assert()
        .success();
    assert!(svg.exists());
}
