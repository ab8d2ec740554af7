//! kipair: Ki Affinity Pair Curation CLI Tool
//!
//! Runs the full curation pipeline over a BindingDB export, or re-renders
//! the affinity plot from previously written pair tables.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use kipair::cli::{confirm_overwrite, Cli, Commands};
use kipair::pipeline::{
    alphafold_entries, alphafold_to_frame, clean_interactions, drop_trained,
    interactions_to_frame, load_measurements, pairs_from_frames, pairs_to_frames, read_exclusions,
    read_table, similar_sequences, sort_pairs, write_csv, AffinityPair, ColumnMap, Interaction,
    SmilesParser, DEFAULT_MIN_SIMILARITY,
};
use kipair::report::{
    display_similar_sequences, export_run_manifest, render_affinity_plot, run_colour_scale,
    ColourScale, CurationSummary, ManifestParams,
};
use kipair::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    ConfigCard,
};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Plot {
                table_a,
                table_b,
                scores,
                threshold,
                output,
            } => run_plot(table_a, table_b, scores.as_deref(), *threshold, output),
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let layout = cli.layout();
    let config = cli.clean_config();

    if !cli.no_confirm && layout.has_existing_outputs() && !confirm_overwrite(layout.root())? {
        println!("Cancelled by user.");
        return Ok(());
    }

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input,
        exclusions: cli.exclusions.as_deref(),
        output_dir: layout.root(),
        min_atoms: config.min_atoms,
        max_sequence_length: config.max_sequence_length,
        threshold: cli.threshold,
    });

    // Step 1: Load the database export
    print_step_header(1, "Load Measurements");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading database export...");
    let raw = load_measurements(input, &ColumnMap::default(), cli.show_columns)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    finish_with_success(&spinner, "Database export loaded");
    print_count("measurement row(s)", raw.len(), None);
    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    // Step 2: Clean and aggregate
    print_step_header(2, "Clean Affinities");
    let step_start = Instant::now();
    let spinner = create_spinner("Aggregating Ki measurements...");
    let outcome = clean_interactions(raw, &config, &SmilesParser)?;
    finish_with_success(&spinner, "Cleaning complete");
    print_count(
        "interaction(s)",
        outcome.stats.final_rows,
        Some(&format!(
            "({} distinct sequences)",
            outcome.stats.distinct_sequences
        )),
    );

    let mut summary = CurationSummary::new(outcome.stats.clone());
    summary.add_timing("Load", load_elapsed);
    let interactions = outcome.interactions;

    write_interactions(&interactions, &layout.cleaned_table())?;
    print_success(&format!("Saved {}", layout.cleaned_table().display()));
    if cli.alphafold {
        write_alphafold(&interactions, &layout.alphafold_table())?;
        print_success(&format!("Saved {}", layout.alphafold_table().display()));
    }
    if cli.similarity {
        let found = similar_sequences(&interactions, DEFAULT_MIN_SIMILARITY);
        display_similar_sequences(&found, DEFAULT_MIN_SIMILARITY);
    }
    let clean_elapsed = step_start.elapsed();
    summary.add_timing("Clean", clean_elapsed);
    print_step_time(clean_elapsed);

    // Step 3: Remove training-set rows
    print_step_header(3, "Training-Set Filter");
    let step_start = Instant::now();
    let filtered = match &cli.exclusions {
        Some(path) => {
            let exclusions = read_exclusions(path)
                .with_context(|| format!("Failed to read exclusions from {}", path.display()))?;
            let before = interactions.len();
            let filtered = drop_trained(interactions.clone(), &exclusions)?;
            print_count(
                "row(s) removed",
                before - filtered.len(),
                Some("(seen during training)"),
            );
            summary.set_training_filter(before - filtered.len(), filtered.len());
            filtered
        }
        None => {
            print_info("No exclusion list given, keeping every row");
            summary.set_training_filter(0, interactions.len());
            interactions.clone()
        }
    };
    write_interactions(&filtered, &layout.filtered_table())?;
    print_success(&format!("Saved {}", layout.filtered_table().display()));
    if cli.alphafold {
        write_alphafold(&filtered, &layout.alphafold_table())?;
    }
    let filter_elapsed = step_start.elapsed();
    summary.add_timing("Filter", filter_elapsed);
    print_step_time(filter_elapsed);

    // Step 4: Pair measurements
    print_step_header(4, "Pairwise Sorting");
    let step_start = Instant::now();
    let spinner = create_spinner("Comparing Ki within each ligand...");
    let pairs = sort_pairs(&filtered, cli.threshold)?;
    let paired_ligands = pairs
        .iter()
        .map(|p| p.a.smiles.as_str())
        .collect::<HashSet<_>>()
        .len();
    if pairs.is_empty() {
        finish_with_warning(&spinner, "No pairs below the threshold");
    } else {
        finish_with_success(&spinner, "Pairing complete");
        print_count(
            "pair(s)",
            pairs.len(),
            Some(&format!("({} ligands, ratio < {})", paired_ligands, cli.threshold)),
        );
    }
    summary.set_pairs(pairs.len(), paired_ligands);

    let (mut table_a, mut table_b) = pairs_to_frames(&pairs)?;
    write_csv(&mut table_a, &layout.table_a())
        .with_context(|| format!("Failed to write {}", layout.table_a().display()))?;
    write_csv(&mut table_b, &layout.table_b())
        .with_context(|| format!("Failed to write {}", layout.table_b().display()))?;
    print_success("Saved pair tables");
    let pair_elapsed = step_start.elapsed();
    summary.add_timing("Pair", pair_elapsed);
    print_step_time(pair_elapsed);

    // Step 5: Report
    print_step_header(5, "Report");
    let step_start = Instant::now();
    if cli.no_plot {
        print_info("Plot skipped");
    } else {
        let colour = run_colour_scale(&pairs, cli.scores.as_deref(), &interactions)
            .context("Failed to read plot scores")?;
        render_affinity_plot(&layout.figure(), &pairs, &colour, cli.threshold)
            .with_context(|| format!("Failed to render {}", layout.figure().display()))?;
        print_success(&format!("Saved {}", layout.figure().display()));
    }
    let report_elapsed = step_start.elapsed();
    summary.add_timing("Report", report_elapsed);

    export_run_manifest(
        &summary,
        &layout.manifest(),
        &ManifestParams {
            input_file: input,
            exclusions_file: cli.exclusions.as_deref(),
            min_atoms: config.min_atoms,
            max_sequence_length: config.max_sequence_length,
            threshold: cli.threshold,
            alphafold: cli.alphafold,
        },
    )?;
    print_step_time(report_elapsed);

    summary.display();
    print_completion();

    Ok(())
}

/// Re-render the affinity plot from written pair tables
fn run_plot(
    table_a: &Path,
    table_b: &Path,
    scores: Option<&Path>,
    threshold: f64,
    output: &Path,
) -> Result<()> {
    let a = read_table(table_a)
        .with_context(|| format!("Failed to read {}", table_a.display()))?;
    let b = read_table(table_b)
        .with_context(|| format!("Failed to read {}", table_b.display()))?;
    let pairs: Vec<AffinityPair> = pairs_from_frames(&a, &b)?;

    let colour = match scores {
        Some(path) => ColourScale::from_score_file(path, pairs.len())
            .with_context(|| format!("Failed to read scores from {}", path.display()))?,
        None => ColourScale::ligand_counts(&pairs, pairs.iter().map(|p| p.a.smiles.as_str())),
    };

    let spinner = create_spinner("Rendering affinity plot...");
    render_affinity_plot(output, &pairs, &colour, threshold)
        .with_context(|| format!("Failed to render {}", output.display()))?;
    finish_with_success(&spinner, &format!("Saved {}", output.display()));
    Ok(())
}

fn write_interactions(rows: &[Interaction], path: &Path) -> Result<()> {
    let mut df = interactions_to_frame(rows)?;
    write_csv(&mut df, path).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn write_alphafold(rows: &[Interaction], path: &Path) -> Result<()> {
    let mut df = alphafold_to_frame(&alphafold_entries(rows))?;
    write_csv(&mut df, path).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
