//! Tests for the pairwise sorter

use kipair::pipeline::{
    clean_interactions, pairs_from_frames, pairs_to_frames, sort_pairs, CleanConfig, CurateError,
    SmilesParser,
};

#[path = "common/mod.rs"]
mod common;

use common::*;

fn clean_two_proteins(ki_p1: &str, ki_p2: &str) -> Vec<kipair::pipeline::Interaction> {
    let raw = vec![
        raw(ASPIRIN, "P1", ki_p1, SEQ_A, "2244"),
        raw(ASPIRIN, "P2", ki_p2, SEQ_B, "2244"),
    ];
    let config = CleanConfig {
        min_atoms: 0,
        max_sequence_length: 500,
    };
    clean_interactions(raw, &config, &SmilesParser)
        .unwrap()
        .interactions
}

#[test]
fn test_twenty_fold_difference_is_paired() {
    let rows = clean_two_proteins("100", "5");
    assert_eq!(rows.len(), 2);

    let pairs = sort_pairs(&rows, 0.1).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].a.sequence, SEQ_A);
    assert_close(pairs[0].a.ki, 100.0, 1e-12);
    assert_eq!(pairs[0].b.sequence, SEQ_B);
    assert_close(pairs[0].b.ki, 5.0, 1e-12);
    assert_close(pairs[0].ratio(), 0.05, 1e-12);
}

#[test]
fn test_two_fold_difference_is_not_paired() {
    let rows = clean_two_proteins("100", "50");
    let pairs = sort_pairs(&rows, 0.1).unwrap();
    assert!(pairs.is_empty());
}

#[test]
fn test_every_pair_is_below_threshold() {
    let rows = vec![
        interaction(0, 0, SEQ_A, "2244", 1000.0, ASPIRIN),
        interaction(1, 1, SEQ_B, "2244", 50.0, ASPIRIN),
        interaction(2, 2, SEQ_C, "2244", 1.0, ASPIRIN),
        interaction(3, 0, SEQ_A, "2519", 3.0, CAFFEINE),
        interaction(4, 1, SEQ_B, "2519", 2.0, CAFFEINE),
    ];
    let threshold = 0.1;
    let pairs = sort_pairs(&rows, threshold).unwrap();

    // 50/1000, 1/1000 and 1/50 pass; caffeine's 2/3 does not
    assert_eq!(pairs.len(), 3);
    for pair in &pairs {
        assert_eq!(pair.a.smiles, pair.b.smiles);
        assert!(pair.a.ki > pair.b.ki);
        assert!(pair.ratio() < threshold);
    }
}

#[test]
fn test_single_protein_slice_yields_nothing() {
    let rows = vec![interaction(0, 0, SEQ_A, "2244", 1000.0, ASPIRIN)];
    assert!(sort_pairs(&rows, 0.5).unwrap().is_empty());
}

#[test]
fn test_threshold_outside_unit_interval_is_rejected() {
    let rows = clean_two_proteins("100", "5");
    for bad in [0.0, 1.0, -0.2, 2.0] {
        assert!(matches!(
            sort_pairs(&rows, bad),
            Err(CurateError::Threshold(_))
        ));
    }
}

#[test]
fn test_pair_tables_stay_row_aligned() {
    let rows = vec![
        interaction(0, 0, SEQ_A, "2244", 1000.0, ASPIRIN),
        interaction(1, 1, SEQ_B, "2244", 50.0, ASPIRIN),
        interaction(2, 2, SEQ_C, "2244", 1.0, ASPIRIN),
    ];
    let pairs = sort_pairs(&rows, 0.1).unwrap();
    let (a, b) = pairs_to_frames(&pairs).unwrap();

    assert_eq!(a.height(), b.height());
    assert_eq!(
        a.get_column_names(),
        &["index", "Prot ID", "Sequence", "SMILES", "Ki (nM)", "ki SEM", "PubChem CID"]
    );

    let restored = pairs_from_frames(&a, &b).unwrap();
    assert_eq!(restored, pairs);
}
