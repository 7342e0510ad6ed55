//! Console output formatting.
//!
//! Centralizes all styling so the rest of the crate reports through one
//! surface: colored status lines, per-pass move reporting, a category
//! summary table, and a progress bar for one-shot runs.

use crate::relocate::PassReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Reports the outcome of one watch-triggered pass over `root`.
    ///
    /// Quiet passes (nothing moved, nothing failed) print nothing, so an
    /// idle watched folder stays silent.
    pub fn pass_report(root: &Path, report: &PassReport) {
        if report.is_quiet() {
            return;
        }

        for moved in &report.moved {
            let name = moved
                .to
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Self::success(&format!(
                "{}: {} → {}/{}",
                root.display(),
                moved
                    .from
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                moved.subfolder,
                name
            ));
        }
        for failure in &report.failures {
            Self::error(&format!("{}", failure.error));
        }
    }

    /// Creates a progress bar for file operations.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a summary table of moved files by destination subfolder.
    pub fn summary_table(subfolder_counts: &HashMap<String, usize>, total_moved: usize) {
        Self::header("SUMMARY");

        // Sort for consistent output
        let mut subfolders: Vec<_> = subfolder_counts.iter().collect();
        subfolders.sort_by_key(|&(name, _)| name);

        let max_name_len = subfolders
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(11); // At least "Destination" width

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Files".bold(),
            width = max_name_len
        );
        println!("{}", "-".repeat(max_name_len + 10));

        for (subfolder, count) in &subfolders {
            let file_word = if **count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                subfolder,
                count.to_string().green(),
                file_word,
                width = max_name_len
            );
        }

        println!("{}", "-".repeat(max_name_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_moved.to_string().green().bold(),
            if total_moved == 1 { "file" } else { "files" },
            width = max_name_len
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
