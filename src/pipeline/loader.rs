//! Dataset loader for TSV and CSV database exports

use std::path::Path;

use polars::prelude::*;

use super::error::{CurateError, CurateResult};
use super::records::{ColumnMap, RawMeasurement};

/// Supported delimited formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Tsv,
    Csv,
}

impl InputFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> CurateResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "tsv" => Ok(Self::Tsv),
            "csv" => Ok(Self::Csv),
            _ => Err(CurateError::Format {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn separator(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            Self::Csv => b',',
        }
    }
}

/// Open a delimited file lazily with every column typed as a string.
///
/// Skipping schema inference keeps censored Ki values (`>100000`) and
/// ligand ids intact for the cleaner to coerce.
pub fn scan_table(path: &Path) -> CurateResult<LazyFrame> {
    let format = InputFormat::from_path(path)?;
    let lf = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(format.separator())
        .with_infer_schema_length(Some(0))
        .finish()?;
    Ok(lf)
}

/// Read a whole delimited file with string columns
pub fn read_table(path: &Path) -> CurateResult<DataFrame> {
    Ok(scan_table(path)?.collect()?)
}

/// Load a database export and project it to `columns`, preserving row order.
///
/// With `display_columns` set, every available column name is printed first.
pub fn load_table(path: &Path, columns: &[String], display_columns: bool) -> CurateResult<DataFrame> {
    let lf = scan_table(path)?;
    let schema = lf.clone().collect_schema()?;
    let available: Vec<String> = schema.iter_names().map(|n| n.to_string()).collect();

    if display_columns {
        for name in &available {
            println!("{}", name);
        }
    }

    if let Some(missing) = columns.iter().find(|c| !available.contains(c)) {
        return Err(CurateError::Column {
            column: missing.clone(),
            available,
        });
    }

    let projection: Vec<Expr> = columns.iter().map(|c| col(c.as_str())).collect();
    let df = lf.select(projection).collect()?;
    log::debug!(
        "loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Column values as owned optional strings
pub fn column_strings(df: &DataFrame, name: &str) -> CurateResult<Vec<Option<String>>> {
    let column = df.column(name).map_err(|_| CurateError::Column {
        column: name.to_string(),
        available: df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    })?;
    let column = column.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Convert a projected frame into typed measurement rows
pub fn read_measurements(df: &DataFrame, columns: &ColumnMap) -> CurateResult<Vec<RawMeasurement>> {
    let smiles = column_strings(df, &columns.smiles)?;
    let target_names = column_strings(df, &columns.target_name)?;
    let kis = column_strings(df, &columns.ki)?;
    let sequences = column_strings(df, &columns.sequence)?;
    let ligand_ids = column_strings(df, &columns.ligand_id)?;

    let rows = smiles
        .into_iter()
        .zip(target_names)
        .zip(kis)
        .zip(sequences)
        .zip(ligand_ids)
        .map(
            |((((smiles, target_name), ki), sequence), ligand_id)| RawMeasurement {
                smiles,
                target_name,
                ki,
                sequence,
                ligand_id,
            },
        )
        .collect();
    Ok(rows)
}

/// Load a database export straight into typed rows
pub fn load_measurements(
    path: &Path,
    columns: &ColumnMap,
    display_columns: bool,
) -> CurateResult<Vec<RawMeasurement>> {
    let df = load_table(path, &columns.names(), display_columns)?;
    read_measurements(&df, columns)
}

/// Values of a single-column side file (exclusion list, score file).
///
/// The column named `0` is used when present, otherwise the first column.
pub fn single_column_values(path: &Path) -> CurateResult<Vec<Option<String>>> {
    let df = read_table(path)?;
    let name = match df.column("0") {
        Ok(_) => "0".to_string(),
        Err(_) => df
            .get_column_names()
            .first()
            .map(|n| n.to_string())
            .ok_or_else(|| CurateError::Column {
                column: "0".to_string(),
                available: Vec::new(),
            })?,
    };
    column_strings(&df, &name)
}
