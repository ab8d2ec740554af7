//! Typed records carried between pipeline stages and their table forms
//!
//! Stages operate on plain `Vec`s of these records; polars frames only
//! appear at the edges, when a table is read from or written to disk.

use std::path::Path;

use polars::prelude::*;

use super::error::{CurateError, CurateResult};
use super::loader::column_strings;

/// Column headers used in the cleaned interaction tables
pub const INDEX_COLUMN: &str = "index";
pub const SEQUENCE_COLUMN: &str = "BindingDB Target Chain Sequence";
pub const LIGAND_ID_COLUMN: &str = "PubChem CID";
pub const KI_MEAN_COLUMN: &str = "ki_mean";
pub const KI_SEM_COLUMN: &str = "ki_sem";
pub const SMILES_COLUMN: &str = "SMILES";
pub const PROTEIN_ID_COLUMN: &str = "ID";

/// Column headers used in the paired A/B tables
pub const PAIR_COLUMNS: [&str; 6] = [
    "Prot ID",
    "Sequence",
    "SMILES",
    "Ki (nM)",
    "ki SEM",
    "PubChem CID",
];

/// Names of the five source columns in the database export.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub smiles: String,
    pub target_name: String,
    pub ki: String,
    pub sequence: String,
    pub ligand_id: String,
}

impl Default for ColumnMap {
    /// BindingDB export headers
    fn default() -> Self {
        Self {
            smiles: "Ligand SMILES".to_string(),
            target_name: "Target Name".to_string(),
            ki: "Ki (nM)".to_string(),
            sequence: SEQUENCE_COLUMN.to_string(),
            ligand_id: LIGAND_ID_COLUMN.to_string(),
        }
    }
}

impl ColumnMap {
    /// Column names in projection order
    pub fn names(&self) -> Vec<String> {
        vec![
            self.smiles.clone(),
            self.target_name.clone(),
            self.ki.clone(),
            self.sequence.clone(),
            self.ligand_id.clone(),
        ]
    }
}

/// One experimental observation exactly as read; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMeasurement {
    pub smiles: Option<String>,
    pub target_name: Option<String>,
    pub ki: Option<String>,
    pub sequence: Option<String>,
    pub ligand_id: Option<String>,
}

impl RawMeasurement {
    /// Returns the measurement if every field is present and non-blank.
    pub fn complete(self) -> Option<Measurement> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Some(Measurement {
            smiles: present(self.smiles)?,
            target_name: present(self.target_name)?,
            ki: present(self.ki)?,
            sequence: present(self.sequence)?,
            ligand_id: present(self.ligand_id)?,
        })
    }
}

/// A complete measurement; Ki is still the raw cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub smiles: String,
    pub target_name: String,
    pub ki: String,
    pub sequence: String,
    pub ligand_id: String,
}

/// A measurement whose Ki parsed to a finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub smiles: String,
    pub sequence: String,
    pub ligand_id: String,
    pub ki: f64,
}

/// Aggregated (sequence, ligand) interaction in the cleaned table.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Position in the current table, dense from 0
    pub row: usize,
    pub protein_id: usize,
    pub sequence: String,
    pub ligand_id: String,
    pub ki_mean: f64,
    pub ki_sem: f64,
    pub smiles: String,
}

/// One side of an affinity pair
#[derive(Debug, Clone, PartialEq)]
pub struct PairedRecord {
    pub protein_id: usize,
    pub sequence: String,
    pub smiles: String,
    pub ki: f64,
    pub ki_sem: f64,
    pub ligand_id: String,
}

impl From<&Interaction> for PairedRecord {
    fn from(row: &Interaction) -> Self {
        Self {
            protein_id: row.protein_id,
            sequence: row.sequence.clone(),
            smiles: row.smiles.clone(),
            ki: row.ki_mean,
            ki_sem: row.ki_sem,
            ligand_id: row.ligand_id.clone(),
        }
    }
}

/// Two proteins binding the same ligand with differentiated affinity.
///
/// `a` is the higher-Ki (weaker binding) partner, `b` the lower-Ki one.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityPair {
    pub a: PairedRecord,
    pub b: PairedRecord,
}

impl AffinityPair {
    /// Ki(B) / Ki(A), always below the pairing threshold
    pub fn ratio(&self) -> f64 {
        self.b.ki / self.a.ki
    }
}

/// Row of the AlphaFold input table
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaFoldEntry {
    /// Protein ID wrapped in single quotes, e.g. `'3'`
    pub id: String,
    pub sequence: String,
}

impl AlphaFoldEntry {
    pub fn new(protein_id: usize, sequence: &str) -> Self {
        Self {
            id: format!("'{}'", protein_id),
            sequence: sequence.to_string(),
        }
    }
}

/// Build the cleaned interaction table
pub fn interactions_to_frame(rows: &[Interaction]) -> CurateResult<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            INDEX_COLUMN.into(),
            rows.iter().map(|r| r.row as u64).collect::<Vec<u64>>(),
        ),
        Column::new(
            SEQUENCE_COLUMN.into(),
            rows.iter().map(|r| r.sequence.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            LIGAND_ID_COLUMN.into(),
            rows.iter().map(|r| r.ligand_id.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            KI_MEAN_COLUMN.into(),
            rows.iter().map(|r| r.ki_mean).collect::<Vec<f64>>(),
        ),
        Column::new(
            KI_SEM_COLUMN.into(),
            rows.iter().map(|r| r.ki_sem).collect::<Vec<f64>>(),
        ),
        Column::new(
            SMILES_COLUMN.into(),
            rows.iter().map(|r| r.smiles.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            PROTEIN_ID_COLUMN.into(),
            rows.iter().map(|r| r.protein_id as u64).collect::<Vec<u64>>(),
        ),
    ])?;
    Ok(df)
}

/// Build the AlphaFold id/sequence table
pub fn alphafold_to_frame(entries: &[AlphaFoldEntry]) -> CurateResult<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            INDEX_COLUMN.into(),
            (0..entries.len() as u64).collect::<Vec<u64>>(),
        ),
        Column::new(
            "id".into(),
            entries.iter().map(|e| e.id.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            "sequence".into(),
            entries.iter().map(|e| e.sequence.clone()).collect::<Vec<String>>(),
        ),
    ])?;
    Ok(df)
}

fn paired_frame(records: &[&PairedRecord]) -> CurateResult<DataFrame> {
    let [prot_id, sequence, smiles, ki, ki_sem, ligand_id] = PAIR_COLUMNS;
    let df = DataFrame::new(vec![
        Column::new(
            INDEX_COLUMN.into(),
            (0..records.len() as u64).collect::<Vec<u64>>(),
        ),
        Column::new(
            prot_id.into(),
            records.iter().map(|r| r.protein_id as u64).collect::<Vec<u64>>(),
        ),
        Column::new(
            sequence.into(),
            records.iter().map(|r| r.sequence.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            smiles.into(),
            records.iter().map(|r| r.smiles.clone()).collect::<Vec<String>>(),
        ),
        Column::new(ki.into(), records.iter().map(|r| r.ki).collect::<Vec<f64>>()),
        Column::new(
            ki_sem.into(),
            records.iter().map(|r| r.ki_sem).collect::<Vec<f64>>(),
        ),
        Column::new(
            ligand_id.into(),
            records.iter().map(|r| r.ligand_id.clone()).collect::<Vec<String>>(),
        ),
    ])?;
    Ok(df)
}

/// Materialise the row-aligned A and B tables from the pair list
pub fn pairs_to_frames(pairs: &[AffinityPair]) -> CurateResult<(DataFrame, DataFrame)> {
    let a: Vec<&PairedRecord> = pairs.iter().map(|p| &p.a).collect();
    let b: Vec<&PairedRecord> = pairs.iter().map(|p| &p.b).collect();
    Ok((paired_frame(&a)?, paired_frame(&b)?))
}

fn parse_number<T: std::str::FromStr>(column: &str, value: Option<String>) -> CurateResult<T> {
    let text = value.unwrap_or_default();
    text.trim().parse::<T>().map_err(|_| CurateError::Value {
        column: column.to_string(),
        value: text,
    })
}

fn paired_records(df: &DataFrame) -> CurateResult<Vec<PairedRecord>> {
    let [prot_id, sequence, smiles, ki, ki_sem, ligand_id] = PAIR_COLUMNS;
    let ids = column_strings(df, prot_id)?;
    let sequences = column_strings(df, sequence)?;
    let structures = column_strings(df, smiles)?;
    let kis = column_strings(df, ki)?;
    let sems = column_strings(df, ki_sem)?;
    let ligands = column_strings(df, ligand_id)?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        records.push(PairedRecord {
            protein_id: parse_number(prot_id, ids[i].clone())?,
            sequence: sequences[i].clone().unwrap_or_default(),
            smiles: structures[i].clone().unwrap_or_default(),
            ki: parse_number(ki, kis[i].clone())?,
            ki_sem: parse_number(ki_sem, sems[i].clone())?,
            ligand_id: ligands[i].clone().unwrap_or_default(),
        });
    }
    Ok(records)
}

/// Rebuild the pair list from A and B tables read back from disk
pub fn pairs_from_frames(a: &DataFrame, b: &DataFrame) -> CurateResult<Vec<AffinityPair>> {
    if a.height() != b.height() {
        return Err(CurateError::PairMismatch {
            a: a.height(),
            b: b.height(),
        });
    }

    let pairs = paired_records(a)?
        .into_iter()
        .zip(paired_records(b)?)
        .map(|(a, b)| AffinityPair { a, b })
        .collect();
    Ok(pairs)
}

/// Write a table as comma-separated text, creating parent directories
pub fn write_csv(df: &mut DataFrame, path: &Path) -> CurateResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_rejects_blank_fields() {
        let raw = RawMeasurement {
            smiles: Some("CCO".to_string()),
            target_name: Some("Kinase".to_string()),
            ki: Some("  ".to_string()),
            sequence: Some("MKV".to_string()),
            ligand_id: Some("702".to_string()),
        };
        assert!(raw.complete().is_none());
    }

    #[test]
    fn test_complete_accepts_full_row() {
        let raw = RawMeasurement {
            smiles: Some("CCO".to_string()),
            target_name: Some("Kinase".to_string()),
            ki: Some(">100000".to_string()),
            sequence: Some("MKV".to_string()),
            ligand_id: Some("702".to_string()),
        };
        let m = raw.complete().unwrap();
        assert_eq!(m.ki, ">100000");
    }

    #[test]
    fn test_alphafold_id_is_quoted() {
        let entry = AlphaFoldEntry::new(7, "MKV");
        assert_eq!(entry.id, "'7'");
    }

    #[test]
    fn test_pair_frames_share_height() {
        let record = PairedRecord {
            protein_id: 0,
            sequence: "MKV".to_string(),
            smiles: "CCO".to_string(),
            ki: 100.0,
            ki_sem: 0.0,
            ligand_id: "702".to_string(),
        };
        let pair = AffinityPair {
            a: record.clone(),
            b: PairedRecord {
                protein_id: 1,
                ki: 5.0,
                ..record
            },
        };
        let (a, b) = pairs_to_frames(&[pair.clone(), pair]).unwrap();
        assert_eq!(a.height(), 2);
        assert_eq!(b.height(), 2);
        assert_eq!(a.get_column_names().len(), 7);
    }
}
