//! Removal of rows already used to train the docking model

use std::collections::BTreeSet;
use std::path::Path;

use super::error::{CurateError, CurateResult};
use super::loader::single_column_values;
use super::records::Interaction;

/// Parse a row index cell; integral floats such as `3.0` are accepted
fn parse_index(text: &str) -> Option<usize> {
    let text = text.trim();
    if let Ok(n) = text.parse::<usize>() {
        return Some(n);
    }
    let value = text.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as usize)
}

/// Read the single-column list of row indices to exclude
pub fn read_exclusions(path: &Path) -> CurateResult<Vec<usize>> {
    single_column_values(path)?
        .into_iter()
        .map(|value| {
            let text = value.unwrap_or_default();
            parse_index(&text).ok_or_else(|| CurateError::InvalidReference {
                value: text,
                path: path.to_path_buf(),
            })
        })
        .collect()
}

/// Drop exactly the listed row indices and reindex the rest from 0.
///
/// Protein IDs are left untouched. Every listed index must exist in `rows`.
pub fn drop_trained(rows: Vec<Interaction>, exclusions: &[usize]) -> CurateResult<Vec<Interaction>> {
    let len = rows.len();
    let excluded: BTreeSet<usize> = exclusions.iter().copied().collect();
    if let Some(&index) = excluded.iter().find(|&&i| i >= len) {
        return Err(CurateError::Reference { index, len });
    }

    let mut kept: Vec<Interaction> = rows
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !excluded.contains(i))
        .map(|(_, row)| row)
        .collect();
    for (i, row) in kept.iter_mut().enumerate() {
        row.row = i;
    }

    log::debug!("dropped {} trained rows, {} remain", excluded.len(), kept.len());
    Ok(kept)
}
