//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static FLASK: Emoji<'_, '_> = Emoji("🧪 ", "");
pub static SCALE: Emoji<'_, '_> = Emoji("⚖️  ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("kipair").cyan().bold(),
        style("Ki affinity pairs for docking").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Values shown on the configuration card
pub struct ConfigCard<'a> {
    pub input: &'a Path,
    pub exclusions: Option<&'a Path>,
    pub output_dir: &'a Path,
    pub min_atoms: usize,
    pub max_sequence_length: usize,
    pub threshold: f64,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let exclusions = card
        .exclusions
        .map(|p| truncate_path(p, 36))
        .unwrap_or_else(|| "none".to_string());

    println!("    ┌{}┐", line);
    println!("    │ {:<53}│", style("⚙️  Configuration").cyan().bold());
    println!("    ├{}┤", line);
    println!("    │  {}Input:      {:<36}│", FOLDER, truncate_path(card.input, 36));
    println!("    │  {}Exclusions: {:<36}│", FOLDER, exclusions);
    println!("    │  {}Output:     {:<36}│", SAVE, truncate_path(card.output_dir, 36));
    println!("    ├{}┤", line);
    println!(
        "    │  {}Min ligand atoms:    {:<27}│",
        FLASK,
        style(format!("> {}", card.min_atoms)).yellow()
    );
    println!(
        "    │  {}Max sequence length: {:<27}│",
        FLASK,
        style(card.max_sequence_length).yellow()
    );
    println!(
        "    │  {}Pairing threshold:   {:<27}│",
        SCALE,
        style(format!("{:.3}", card.threshold)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!("      {}", style(format!("⏱  {:.2?}", elapsed)).dim());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("kipair curation complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
