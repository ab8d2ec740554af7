//! Curation summary report

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{CleanStats, SimilarSequences};

/// Row counts and timings of one pipeline run
#[derive(Debug, Default, Clone, Serialize)]
pub struct CurationSummary {
    pub cleaning: CleanStats,
    /// Rows removed by the training-set filter
    pub excluded_rows: usize,
    /// Rows left after the training-set filter
    pub filtered_rows: usize,
    pub pairs: usize,
    /// Distinct ligands contributing at least one pair
    pub paired_ligands: usize,
    #[serde(skip)]
    pub timings: Vec<(String, Duration)>,
}

impl CurationSummary {
    pub fn new(cleaning: CleanStats) -> Self {
        Self {
            filtered_rows: cleaning.final_rows,
            cleaning,
            ..Default::default()
        }
    }

    pub fn set_training_filter(&mut self, excluded_rows: usize, filtered_rows: usize) {
        self.excluded_rows = excluded_rows;
        self.filtered_rows = filtered_rows;
    }

    pub fn set_pairs(&mut self, pairs: usize, paired_ligands: usize) {
        self.pairs = pairs;
        self.paired_ligands = paired_ligands;
    }

    pub fn add_timing(&mut self, stage: &str, elapsed: Duration) {
        self.timings.push((stage.to_string(), elapsed));
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("CURATION SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let stats = &self.cleaning;
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
        ]);

        let rows: [(&str, usize); 8] = [
            ("📁 Raw measurements", stats.raw_rows),
            ("🧹 Complete rows", stats.complete_rows),
            ("📏 Within sequence length", stats.within_length_rows),
            ("🔢 Numeric Ki", stats.numeric_ki_rows),
            ("∑  Aggregated interactions", stats.aggregated_rows),
            ("🔗 Shared ligands", stats.shared_ligand_rows),
            ("⚛️  Ligand size filter", stats.sized_ligand_rows),
            ("✅ Cleaned interactions", stats.final_rows),
        ];
        for (label, count) in rows {
            table.add_row(vec![Cell::new(label), Cell::new(count)]);
        }

        table.add_row(vec![
            Cell::new("🧬 Distinct proteins"),
            Cell::new(stats.distinct_sequences).fg(Color::Cyan),
        ]);
        table.add_row(vec![
            Cell::new("🗑️  Excluded (training set)"),
            Cell::new(self.excluded_rows).fg(if self.excluded_rows == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("🎯 Affinity pairs"),
            Cell::new(self.pairs)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("💊 Paired ligands"),
            Cell::new(self.paired_ligands),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.timings.is_empty() {
            println!();
            for (stage, elapsed) in &self.timings {
                println!(
                    "      {} {:<24} {}",
                    style("•").dim(),
                    stage,
                    style(format!("{:.2?}", elapsed)).dim()
                );
            }
        }
    }
}

/// Print the sequence similarity report as a table
pub fn display_similar_sequences(found: &[SimilarSequences], min_ratio: f64) {
    println!();
    if found.is_empty() {
        println!(
            "      No sequences above {:.2} similarity share a ligand",
            min_ratio
        );
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Ligand").add_attribute(Attribute::Bold),
        Cell::new("Prot ID 1").add_attribute(Attribute::Bold),
        Cell::new("Prot ID 2").add_attribute(Attribute::Bold),
        Cell::new("Similarity").add_attribute(Attribute::Bold),
    ]);
    for entry in found {
        table.add_row(vec![
            Cell::new(truncate(&entry.smiles, 40)),
            Cell::new(entry.first_protein_id),
            Cell::new(entry.second_protein_id),
            Cell::new(format!("{:.3}", entry.ratio)).fg(Color::Yellow),
        ]);
    }
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}
