//! Shared test utilities and fixture generators

#![allow(dead_code)]

use kipair::pipeline::{Interaction, RawMeasurement};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Database export headers in projection order
pub const HEADER: [&str; 5] = [
    "Ligand SMILES",
    "Target Name",
    "Ki (nM)",
    "BindingDB Target Chain Sequence",
    "PubChem CID",
];

/// Aspirin, 13 atoms
pub const ASPIRIN: &str = "CC(=O)OC1=CC=CC=C1C(=O)O";
/// Caffeine, 14 atoms
pub const CAFFEINE: &str = "CN1C=NC2=C1C(=O)N(C(=O)N2C)C";
/// Ethanol, 3 atoms
pub const ETHANOL: &str = "CCO";

pub const SEQ_A: &str = "MKTAYIAKQRQISFVKSHFSRQ";
pub const SEQ_B: &str = "MSEQNNTEMTFQIQRIYTKDIS";
pub const SEQ_C: &str = "MALWMRLLPLLALLALWGPDPA";

/// Write a delimited database export; the separator follows the extension
pub fn write_database(dir: &Path, name: &str, rows: &[[&str; 5]]) -> PathBuf {
    let path = dir.join(name);
    let sep = if name.ends_with(".csv") { "," } else { "\t" };

    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", HEADER.join(sep)).unwrap();
    for row in rows {
        writeln!(file, "{}", row.join(sep)).unwrap();
    }
    path
}

/// Write a single-column side file (exclusions, scores) with header `0`
pub fn write_single_column<T: ToString>(dir: &Path, name: &str, values: &[T]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "0").unwrap();
    for value in values {
        writeln!(file, "{}", value.to_string()).unwrap();
    }
    path
}

/// Create a temp directory holding a TSV database export
pub fn create_temp_database(rows: &[[&str; 5]]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_database(temp_dir.path(), "db.tsv", rows);
    (temp_dir, path)
}

/// Raw measurement with every field present
pub fn raw(smiles: &str, target: &str, ki: &str, sequence: &str, ligand_id: &str) -> RawMeasurement {
    RawMeasurement {
        smiles: Some(smiles.to_string()),
        target_name: Some(target.to_string()),
        ki: Some(ki.to_string()),
        sequence: Some(sequence.to_string()),
        ligand_id: Some(ligand_id.to_string()),
    }
}

/// Cleaned interaction row
pub fn interaction(
    row: usize,
    protein_id: usize,
    sequence: &str,
    ligand_id: &str,
    ki_mean: f64,
    smiles: &str,
) -> Interaction {
    Interaction {
        row,
        protein_id,
        sequence: sequence.to_string(),
        ligand_id: ligand_id.to_string(),
        ki_mean,
        ki_sem: 0.0,
        smiles: smiles.to_string(),
    }
}

/// Database rows for one ligand measured against two proteins
pub fn two_protein_rows<'a>(ki_p1: &'a str, ki_p2: &'a str) -> Vec<[&'a str; 5]> {
    vec![
        [ASPIRIN, "P1", ki_p1, SEQ_A, "2244"],
        [ASPIRIN, "P2", ki_p2, SEQ_B, "2244"],
    ]
}

/// Assert two floats agree within `tol`
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {} within {} of {}",
        actual,
        tol,
        expected
    );
}
