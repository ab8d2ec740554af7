//! Sequence similarity among proteins that share a ligand
//!
//! Diagnostic only: near-identical chains (mutants, isoforms) paired for the
//! same ligand are worth a manual look before docking, but nothing here
//! filters the table.

use std::collections::BTreeMap;

use super::records::Interaction;

/// Default similarity above which two sequences are reported
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.8;

/// Two highly similar sequences bound to the same ligand
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarSequences {
    pub smiles: String,
    /// Positions within the ligand's slice of the table
    pub first: usize,
    pub second: usize,
    pub first_protein_id: usize,
    pub second_protein_id: usize,
    pub ratio: f64,
}

/// Longest common block as (start in a, start in b, length).
///
/// Ties resolve to the earliest start in `a`, then in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        for j in 0..b.len() {
            curr[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let len = curr[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_characters(&a[..i], &b[..j])
        + matching_characters(&a[i + len..], &b[j + len..])
}

/// Ratcliff/Obershelp similarity: twice the matched characters over the total length.
///
/// No autojunk heuristic: residues frequent in sequences of 200 or more
/// characters still take part in matching, so long chains can score
/// higher here than with difflib's `SequenceMatcher` defaults.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Report sequence pairs above `min_ratio` for every ligand, in SMILES order
pub fn similar_sequences(rows: &[Interaction], min_ratio: f64) -> Vec<SimilarSequences> {
    let mut by_ligand: BTreeMap<&str, Vec<&Interaction>> = BTreeMap::new();
    for row in rows {
        by_ligand.entry(row.smiles.as_str()).or_default().push(row);
    }

    let mut found = Vec::new();
    for (smiles, slice) in by_ligand {
        for (i, first) in slice.iter().enumerate() {
            for (j, second) in slice.iter().enumerate().skip(i + 1) {
                let ratio = similarity_ratio(&first.sequence, &second.sequence);
                if ratio > min_ratio {
                    found.push(SimilarSequences {
                        smiles: smiles.to_string(),
                        first: i,
                        second: j,
                        first_protein_id: first.protein_id,
                        second_protein_id: second.protein_id,
                        ratio,
                    });
                }
            }
        }
    }
    found
}
