//! Tests for CLI argument parsing

use clap::Parser;
use kipair::cli::{Cli, Commands};
use std::path::PathBuf;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["kipair", "-i", "db.tsv"]);

    assert_eq!(cli.input, Some(PathBuf::from("db.tsv")));
    assert_eq!(cli.exclusions, None);
    assert_eq!(cli.output_dir, PathBuf::from("output"));
    assert_eq!(cli.min_atoms, 8, "Default min atoms should be 8");
    assert_eq!(
        cli.max_sequence_length, 500,
        "Default max sequence length should be 500"
    );
    assert_eq!(cli.threshold, 0.1, "Default threshold should be 0.1");
    assert!(!cli.alphafold);
    assert!(!cli.similarity);
    assert!(!cli.no_plot);
    assert!(!cli.no_confirm, "Default no_confirm should be false");
}

#[test]
fn test_cli_custom_values() {
    let cli = Cli::parse_from([
        "kipair",
        "-i",
        "db.csv",
        "-x",
        "train.csv",
        "-o",
        "results",
        "--min-atoms",
        "12",
        "--max-sequence-length",
        "300",
        "--threshold",
        "0.05",
        "--alphafold",
        "--no-plot",
        "--no-confirm",
    ]);

    assert_eq!(cli.exclusions, Some(PathBuf::from("train.csv")));
    assert_eq!(cli.output_dir, PathBuf::from("results"));
    assert_eq!(cli.threshold, 0.05);

    let config = cli.clean_config();
    assert_eq!(config.min_atoms, 12);
    assert_eq!(config.max_sequence_length, 300);

    let layout = cli.layout();
    assert_eq!(layout.table_a(), PathBuf::from("results/data_A.csv"));
    assert_eq!(layout.filtered_table(), PathBuf::from("results/clean_data.csv"));
}

#[test]
fn test_cli_rejects_threshold_outside_unit_interval() {
    for bad in ["0", "1", "1.5", "-0.1", "ten"] {
        let result = Cli::try_parse_from(["kipair", "-i", "db.tsv", "--threshold", bad]);
        assert!(result.is_err(), "threshold {} should be rejected", bad);
    }
}

#[test]
fn test_plot_subcommand() {
    let cli = Cli::parse_from([
        "kipair",
        "plot",
        "--table-a",
        "data_A.csv",
        "--table-b",
        "data_B.csv",
        "--scores",
        "guess.csv",
    ]);

    match cli.command {
        Some(Commands::Plot {
            table_a,
            table_b,
            scores,
            threshold,
            output,
        }) => {
            assert_eq!(table_a, PathBuf::from("data_A.csv"));
            assert_eq!(table_b, PathBuf::from("data_B.csv"));
            assert_eq!(scores, Some(PathBuf::from("guess.csv")));
            assert_eq!(threshold, 0.1);
            assert_eq!(output, PathBuf::from("ka_kb.svg"));
        }
        other => panic!("expected plot subcommand, got {:?}", other),
    }
}
