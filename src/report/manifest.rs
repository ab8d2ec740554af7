//! Run manifest export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::summary::CurationSummary;

/// Metadata about the curation run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// kipair version
    pub kipair_version: String,
    /// Database export that was curated
    pub input_file: String,
    /// Training-set exclusion list, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusions_file: Option<String>,
    pub min_atoms: usize,
    pub max_sequence_length: usize,
    pub threshold: f64,
    pub alphafold: bool,
}

/// Complete manifest: run metadata plus stage counts
#[derive(Serialize)]
pub struct RunManifest<'a> {
    pub metadata: RunMetadata,
    pub summary: &'a CurationSummary,
}

/// Parameters recorded in the manifest
pub struct ManifestParams<'a> {
    pub input_file: &'a Path,
    pub exclusions_file: Option<&'a Path>,
    pub min_atoms: usize,
    pub max_sequence_length: usize,
    pub threshold: f64,
    pub alphafold: bool,
}

/// Write the run manifest as pretty-printed JSON
pub fn export_run_manifest(
    summary: &CurationSummary,
    output_path: &Path,
    params: &ManifestParams,
) -> Result<()> {
    let manifest = RunManifest {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            kipair_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.display().to_string(),
            exclusions_file: params.exclusions_file.map(|p| p.display().to_string()),
            min_atoms: params.min_atoms,
            max_sequence_length: params.max_sequence_length,
            threshold: params.threshold,
            alphafold: params.alphafold,
        },
        summary,
    };

    let json = serde_json::to_string_pretty(&manifest)
        .context("Failed to serialize run manifest to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run manifest to {}", output_path.display()))?;

    Ok(())
}
