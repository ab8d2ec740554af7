//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{CleanConfig, DEFAULT_MAX_SEQUENCE_LENGTH, DEFAULT_MIN_ATOMS};

/// kipair - Curate Ki measurements into affinity pairs for docking benchmarks
#[derive(Parser, Debug)]
#[command(name = "kipair")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Database export to curate (TSV or CSV)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Training-set exclusion list: one row index per line, header `0`.
    /// Rows of the curated table at these positions are removed before pairing.
    #[arg(short = 'x', long)]
    pub exclusions: Option<PathBuf>,

    /// Directory every output file is written to
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Ligands with this many heavy-or-explicit atoms or fewer are dropped
    #[arg(long, default_value_t = DEFAULT_MIN_ATOMS)]
    pub min_atoms: usize,

    /// Target sequences longer than this are dropped
    #[arg(long, default_value_t = DEFAULT_MAX_SEQUENCE_LENGTH)]
    pub max_sequence_length: usize,

    /// Pairing threshold: two measurements of a ligand are paired when
    /// the lower Ki divided by the higher Ki falls below this value (0 < t < 1)
    #[arg(long, default_value = "0.1", value_parser = validate_threshold)]
    pub threshold: f64,

    /// Also write the structure-prediction input table (AF_input.csv)
    #[arg(long, default_value = "false")]
    pub alphafold: bool,

    /// Colour the plot by per-row scores from this file instead of ligand counts
    #[arg(long)]
    pub scores: Option<PathBuf>,

    /// Print the column names of the input file
    #[arg(long, default_value = "false")]
    pub show_columns: bool,

    /// Print pairs of similar target sequences sharing a ligand
    #[arg(long, default_value = "false")]
    pub similarity: bool,

    /// Skip rendering the affinity plot
    #[arg(long, default_value = "false")]
    pub no_plot: bool,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Re-render the affinity plot from previously written pair tables
    Plot {
        /// Table of higher-Ki partners (data_A.csv)
        #[arg(long)]
        table_a: PathBuf,

        /// Table of lower-Ki partners (data_B.csv)
        #[arg(long)]
        table_b: PathBuf,

        /// Single-column score file aligned to table A
        #[arg(long)]
        scores: Option<PathBuf>,

        /// Threshold used for the offset reference line
        #[arg(long, default_value = "0.1", value_parser = validate_threshold)]
        threshold: f64,

        /// Output SVG path
        #[arg(short, long, default_value = "ka_kb.svg")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    pub fn clean_config(&self) -> CleanConfig {
        CleanConfig {
            min_atoms: self.min_atoms,
            max_sequence_length: self.max_sequence_length,
        }
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_dir)
    }
}

/// Paths of every file the pipeline writes, rooted at the output directory
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cleaned table before training-set filtering
    pub fn cleaned_table(&self) -> PathBuf {
        self.root.join("data_prot.csv")
    }

    pub fn alphafold_table(&self) -> PathBuf {
        self.root.join("AF_input.csv")
    }

    /// Table after training-set filtering
    pub fn filtered_table(&self) -> PathBuf {
        self.root.join("clean_data.csv")
    }

    pub fn table_a(&self) -> PathBuf {
        self.root.join("data_A.csv")
    }

    pub fn table_b(&self) -> PathBuf {
        self.root.join("data_B.csv")
    }

    pub fn figure(&self) -> PathBuf {
        self.root.join("figures").join("ka_kb.svg")
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join("run_summary.json")
    }

    /// Whether any output of a previous run would be overwritten
    pub fn has_existing_outputs(&self) -> bool {
        [
            self.cleaned_table(),
            self.alphafold_table(),
            self.filtered_table(),
            self.table_a(),
            self.table_b(),
            self.figure(),
            self.manifest(),
        ]
        .iter()
        .any(|p| p.exists())
    }
}

/// Validator for the pairing threshold, which must lie strictly inside (0, 1)
pub fn validate_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "threshold must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_threshold_bounds() {
        assert_eq!(validate_threshold("0.1"), Ok(0.1));
        assert!(validate_threshold("0").is_err());
        assert!(validate_threshold("1.0").is_err());
        assert!(validate_threshold("-0.5").is_err());
        assert!(validate_threshold("abc").is_err());
    }

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new(Path::new("out"));
        assert_eq!(layout.cleaned_table(), Path::new("out/data_prot.csv"));
        assert_eq!(layout.figure(), Path::new("out/figures/ka_kb.svg"));
        assert_eq!(layout.manifest(), Path::new("out/run_summary.json"));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["kipair", "-i", "db.tsv"]);
        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert_eq!(cli.min_atoms, 8);
        assert_eq!(cli.max_sequence_length, 500);
        assert!((cli.threshold - 0.1).abs() < 1e-12);
        assert!(!cli.alphafold);
        assert!(cli.command.is_none());
    }
}
