//! Relative-affinity pairing of proteins that bind the same ligand

use std::collections::BTreeMap;

use super::error::{CurateError, CurateResult};
use super::records::{AffinityPair, Interaction, PairedRecord};

/// Default maximum Ki(B) / Ki(A) ratio for a pair
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Square matrix of Ki ratios over one ligand's slice, row-major.
///
/// `get(j, k)` is `ki[j] / ki[k]`.
#[derive(Debug, Clone)]
pub struct RatioMatrix {
    size: usize,
    ratios: Vec<f64>,
}

impl RatioMatrix {
    pub fn new(ki: &[f64]) -> Self {
        let ratios = ki
            .iter()
            .flat_map(|num| ki.iter().map(move |den| num / den))
            .collect();
        Self {
            size: ki.len(),
            ratios,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.ratios[row * self.size + col]
    }

    /// All (row, col) positions with a ratio below `threshold`, row-major
    pub fn below(&self, threshold: f64) -> Vec<(usize, usize)> {
        self.ratios
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r < threshold)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }
}

/// Pair proteins sharing a ligand whose Ki differ by more than `threshold`.
///
/// Ligands are visited in ascending SMILES order and rows within a ligand in
/// table order. For every selected matrix position (j, k), the column
/// protein k (higher Ki) becomes `a` and the row protein j (lower Ki)
/// becomes `b`, so `b.ki / a.ki < threshold` holds for every pair.
pub fn sort_pairs(rows: &[Interaction], threshold: f64) -> CurateResult<Vec<AffinityPair>> {
    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(CurateError::Threshold(threshold));
    }

    let mut by_ligand: BTreeMap<&str, Vec<&Interaction>> = BTreeMap::new();
    for row in rows {
        by_ligand.entry(row.smiles.as_str()).or_default().push(row);
    }

    let mut pairs = Vec::new();
    for (smiles, slice) in by_ligand {
        let ki: Vec<f64> = slice.iter().map(|r| r.ki_mean).collect();
        let matrix = RatioMatrix::new(&ki);
        let selected = matrix.below(threshold);
        log::debug!(
            "ligand {}: {} proteins, {} pairs",
            smiles,
            matrix.size(),
            selected.len()
        );

        pairs.extend(selected.into_iter().map(|(j, k)| AffinityPair {
            a: PairedRecord::from(slice[k]),
            b: PairedRecord::from(slice[j]),
        }));
    }
    Ok(pairs)
}
