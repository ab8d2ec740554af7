//! Error types for the curation pipeline.
//!
//! Each variant is a fatal condition: the pipeline has no partial-success
//! mode, so any of these aborts the run. Ki values that fail numeric
//! coercion are not errors; the cleaner drops them silently.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the loader, cleaner, training filter, sorter and reporter.
#[derive(Debug, Error)]
pub enum CurateError {
    /// Input file extension is neither `.tsv` nor `.csv`.
    #[error("Unsupported file format: {}. Database must be a tsv or csv", path.display())]
    Format {
        /// Path of the rejected file
        path: PathBuf,
    },

    /// A requested column is absent from the source file.
    #[error("Column '{column}' not found. Available columns: {available:?}")]
    Column {
        /// Name of the missing column
        column: String,
        /// Columns the file actually has
        available: Vec<String>,
    },

    /// A ligand SMILES string does not describe a valid molecule.
    ///
    /// Must be fixed in the source data, never swallowed.
    #[error("Invalid ligand structure '{smiles}': {reason}")]
    Chemistry {
        /// The offending SMILES string
        smiles: String,
        /// What the parser rejected
        reason: String,
    },

    /// An exclusion index does not exist in the table being filtered.
    #[error("Exclusion index {index} not found in table with {len} rows")]
    Reference {
        /// Index listed in the exclusion file
        index: usize,
        /// Number of rows in the table
        len: usize,
    },

    /// An exclusion file entry is not a non-negative integer row index.
    #[error("Exclusion entry '{value}' in {} is not a row index", path.display())]
    InvalidReference {
        /// Raw cell text
        value: String,
        /// Exclusion file
        path: PathBuf,
    },

    /// Pairing threshold outside the open interval (0, 1).
    #[error("Pairing threshold must be between 0 and 1 (exclusive), got {0}")]
    Threshold(f64),

    /// Auxiliary score file does not line up with the pair table.
    #[error("Score file has {found} values but the pair table has {expected} rows")]
    Score {
        /// Rows in table A
        expected: usize,
        /// Values in the score file
        found: usize,
    },

    /// Pair tables A and B read back from disk have different lengths.
    #[error("Pair tables are not row-aligned: A has {a} rows, B has {b}")]
    PairMismatch {
        /// Rows in table A
        a: usize,
        /// Rows in table B
        b: usize,
    },

    /// A numeric column of a previously written table holds a non-numeric cell.
    #[error("Column '{column}' holds non-numeric value '{value}'")]
    Value {
        /// Column name
        column: String,
        /// Raw cell text
        value: String,
    },

    /// Error from the table engine.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    /// I/O error while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CurateResult<T> = std::result::Result<T, CurateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display() {
        let err = CurateError::Format {
            path: PathBuf::from("data/db.xlsx"),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported file format: data/db.xlsx. Database must be a tsv or csv"
        );
    }

    #[test]
    fn test_reference_error_display() {
        let err = CurateError::Reference { index: 42, len: 10 };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("10 rows"));
    }

    #[test]
    fn test_column_error_lists_available() {
        let err = CurateError::Column {
            column: "Ki (nM)".to_string(),
            available: vec!["a".to_string(), "b".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Ki (nM)'"));
        assert!(msg.contains("\"a\""));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CurateError = io_err.into();
        assert!(matches!(err, CurateError::Io(_)));
    }
}
