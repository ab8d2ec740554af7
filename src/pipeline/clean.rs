//! Affinity cleaning: filtering, aggregation and protein ID assignment
//!
//! Turns raw measurement rows into one aggregated interaction per
//! (target sequence, ligand id) pair. Every step narrows the candidate
//! set, so the order below matters:
//!
//! 1. drop incomplete rows
//! 2. drop over-long target sequences
//! 3. coerce Ki to a number (censored values such as `>100000` are lost)
//! 4. aggregate mean and standard error per (sequence, ligand)
//! 5. keep ligands measured against at least two sequences
//! 6. drop ligands with too few atoms, attach their SMILES
//! 7. drop zero-affinity rows and exact duplicates
//! 8. assign protein IDs

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::chem::MoleculeParser;
use super::error::CurateResult;
use super::records::{AlphaFoldEntry, Interaction, Measurement, Observation, RawMeasurement};

/// Default minimum ligand size; ligands with this many atoms or fewer are dropped
pub const DEFAULT_MIN_ATOMS: usize = 8;

/// Default maximum target sequence length
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 500;

/// Cleaning parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanConfig {
    /// Ligands whose atom count is `<=` this value are dropped
    pub min_atoms: usize,
    /// Sequences longer than this are dropped
    pub max_sequence_length: usize,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            min_atoms: DEFAULT_MIN_ATOMS,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
        }
    }
}

/// Row counts after each cleaning step
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanStats {
    pub raw_rows: usize,
    pub complete_rows: usize,
    pub within_length_rows: usize,
    pub numeric_ki_rows: usize,
    pub aggregated_rows: usize,
    pub shared_ligand_rows: usize,
    pub sized_ligand_rows: usize,
    pub final_rows: usize,
    pub distinct_sequences: usize,
}

/// Cleaned table plus the step-by-step row counts
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub interactions: Vec<Interaction>,
    pub stats: CleanStats,
}

/// Mean Ki and its standard error for one (sequence, ligand) pair
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityGroup {
    pub sequence: String,
    pub ligand_id: String,
    pub ki_mean: f64,
    pub ki_sem: f64,
    pub observations: usize,
}

/// Step 1: keep rows with every field present
pub fn drop_incomplete(raw: Vec<RawMeasurement>) -> Vec<Measurement> {
    raw.into_iter().filter_map(RawMeasurement::complete).collect()
}

/// Step 2: keep rows whose sequence has at most `max_len` residues
pub fn drop_long_sequences(rows: Vec<Measurement>, max_len: usize) -> Vec<Measurement> {
    rows.into_iter()
        .filter(|m| m.sequence.chars().count() <= max_len)
        .collect()
}

/// Parse a Ki cell; inequality-qualified and non-finite values yield `None`
pub fn parse_ki(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Step 3: coerce Ki to a number, silently dropping rows that fail
pub fn coerce_ki(rows: Vec<Measurement>) -> Vec<Observation> {
    rows.into_iter()
        .filter_map(|m| {
            let ki = parse_ki(&m.ki)?;
            Some(Observation {
                smiles: m.smiles,
                sequence: m.sequence,
                ligand_id: m.ligand_id,
                ki,
            })
        })
        .collect()
}

/// Order ligand ids numerically when both are numbers, textually otherwise
pub fn compare_ligand_ids(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| s.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x
            .partial_cmp(&y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sample mean and standard error of the mean (ddof = 1).
///
/// A single value has a standard error of exactly 0.
pub fn mean_and_sem(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.is_empty() {
        return (f64::NAN, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt() / n.sqrt())
}

/// Step 4: group by (sequence, ligand id), sorted by sequence then ligand id
pub fn aggregate(observations: &[Observation]) -> Vec<AffinityGroup> {
    let mut order: Vec<&Observation> = observations.iter().collect();
    order.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| compare_ligand_ids(&a.ligand_id, &b.ligand_id))
    });

    let mut groups: Vec<AffinityGroup> = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let first = order[start];
        let end = order[start..]
            .iter()
            .position(|o| o.sequence != first.sequence || o.ligand_id != first.ligand_id)
            .map_or(order.len(), |offset| start + offset);

        let values: Vec<f64> = order[start..end].iter().map(|o| o.ki).collect();
        let (ki_mean, ki_sem) = mean_and_sem(&values);
        groups.push(AffinityGroup {
            sequence: first.sequence.clone(),
            ligand_id: first.ligand_id.clone(),
            ki_mean,
            ki_sem,
            observations: values.len(),
        });
        start = end;
    }
    groups
}

/// Step 5: keep every group whose ligand id appears in two or more groups
pub fn keep_shared_ligands(groups: Vec<AffinityGroup>) -> Vec<AffinityGroup> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for group in &groups {
        *occurrences.entry(group.ligand_id.clone()).or_insert(0) += 1;
    }
    groups
        .into_iter()
        .filter(|g| occurrences.get(&g.ligand_id).copied().unwrap_or(0) > 1)
        .collect()
}

/// Step 6: attach each ligand's first SMILES and drop ligands with
/// `min_atoms` atoms or fewer.
///
/// A SMILES the parser rejects aborts the whole run.
pub fn attach_structures(
    groups: Vec<AffinityGroup>,
    observations: &[Observation],
    parser: &dyn MoleculeParser,
    min_atoms: usize,
) -> CurateResult<Vec<Interaction>> {
    let mut first_smiles: HashMap<&str, &str> = HashMap::new();
    for obs in observations {
        first_smiles
            .entry(obs.ligand_id.as_str())
            .or_insert(obs.smiles.as_str());
    }

    let mut atom_counts: HashMap<String, usize> = HashMap::new();
    let mut rows = Vec::with_capacity(groups.len());

    for group in groups {
        let Some(&smiles) = first_smiles.get(group.ligand_id.as_str()) else {
            continue;
        };
        let atoms = match atom_counts.get(&group.ligand_id) {
            Some(&n) => n,
            None => {
                let n = parser.atom_count(smiles)?;
                atom_counts.insert(group.ligand_id.clone(), n);
                n
            }
        };
        if atoms <= min_atoms {
            continue;
        }

        rows.push(Interaction {
            row: 0,
            protein_id: 0,
            sequence: group.sequence,
            ligand_id: group.ligand_id,
            ki_mean: group.ki_mean,
            ki_sem: group.ki_sem,
            smiles: smiles.to_string(),
        });
    }
    Ok(rows)
}

/// Step 7: drop rows with a mean Ki of exactly zero, then exact duplicates
pub fn drop_zero_and_duplicates(rows: Vec<Interaction>) -> Vec<Interaction> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| r.ki_mean != 0.0)
        .filter(|r| {
            seen.insert((
                r.sequence.clone(),
                r.ligand_id.clone(),
                r.ki_mean.to_bits(),
                r.ki_sem.to_bits(),
                r.smiles.clone(),
            ))
        })
        .collect()
}

/// Step 8: set the dense row key and protein IDs.
///
/// When some sequence occurs on more than one row, IDs are renumbered
/// densely in ascending sequence order; otherwise each row keeps its index.
pub fn assign_protein_ids(rows: &mut [Interaction]) {
    let mut unique: Vec<String> = rows.iter().map(|r| r.sequence.clone()).collect();
    unique.sort();
    unique.dedup();

    let renumber = unique.len() != rows.len();
    let ids: HashMap<String, usize> = unique
        .into_iter()
        .enumerate()
        .map(|(i, seq)| (seq, i))
        .collect();

    for (i, row) in rows.iter_mut().enumerate() {
        row.row = i;
        row.protein_id = if renumber { ids[&row.sequence] } else { i };
    }
}

/// One AlphaFold input row per distinct sequence, in ascending sequence
/// order, using the protein ID already carried by the table.
pub fn alphafold_entries(rows: &[Interaction]) -> Vec<AlphaFoldEntry> {
    let mut first_id: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        first_id.entry(row.sequence.as_str()).or_insert(row.protein_id);
    }
    first_id
        .into_iter()
        .map(|(sequence, id)| AlphaFoldEntry::new(id, sequence))
        .collect()
}

/// Run every cleaning step over the raw rows
pub fn clean_interactions(
    raw: Vec<RawMeasurement>,
    config: &CleanConfig,
    parser: &dyn MoleculeParser,
) -> CurateResult<CleanOutcome> {
    let mut stats = CleanStats {
        raw_rows: raw.len(),
        ..Default::default()
    };

    let complete = drop_incomplete(raw);
    stats.complete_rows = complete.len();

    let short = drop_long_sequences(complete, config.max_sequence_length);
    stats.within_length_rows = short.len();

    let observations = coerce_ki(short);
    stats.numeric_ki_rows = observations.len();
    log::debug!(
        "{} rows dropped by Ki coercion",
        stats.within_length_rows - stats.numeric_ki_rows
    );

    let groups = aggregate(&observations);
    stats.aggregated_rows = groups.len();

    let shared = keep_shared_ligands(groups);
    stats.shared_ligand_rows = shared.len();

    let sized = attach_structures(shared, &observations, parser, config.min_atoms)?;
    stats.sized_ligand_rows = sized.len();

    let mut interactions = drop_zero_and_duplicates(sized);
    assign_protein_ids(&mut interactions);
    stats.final_rows = interactions.len();
    stats.distinct_sequences = interactions
        .iter()
        .map(|r| r.sequence.as_str())
        .collect::<HashSet<_>>()
        .len();

    log::debug!("cleaning stats: {:?}", stats);

    Ok(CleanOutcome {
        interactions,
        stats,
    })
}
