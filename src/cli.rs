//! Command orchestration.
//!
//! This module wires configuration, classifiers, the relocator and the
//! watch binding into the two user-facing commands:
//! - `organize`: one pass over a directory, with an optional dry run
//! - `watch`: keep organizing every configured root until stopped

use crate::classify::{Classifier, ExtensionClassifier, ScreengrabClassifier};
use crate::config::{ClassifierKind, CompiledFilters, Config};
use crate::output::OutputFormatter;
use crate::relocate::{self, Move};
use crate::rules::ExtensionTable;
use crate::watch::{self, WatchedRoot};
use std::collections::HashMap;
use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

/// Builds the classifier a root asked for.
fn build_classifier(
    kind: ClassifierKind,
    table_path: Option<&Path>,
) -> Result<Arc<dyn Classifier>, String> {
    match kind {
        ClassifierKind::Extensions => {
            let table = match table_path {
                Some(path) => ExtensionTable::load(path).map_err(|e| e.to_string())?,
                None => ExtensionTable::builtin(),
            };
            Ok(Arc::new(ExtensionClassifier::new(table)))
        }
        ClassifierKind::Screengrabs => Ok(Arc::new(ScreengrabClassifier::new())),
    }
}

/// Lists the direct-child files of `root` that pass the filters, in
/// directory order.
fn list_candidates(root: &Path, filters: &CompiledFilters) -> Result<Vec<String>, String> {
    let entries = fs::read_dir(root)
        .map_err(|e| format!("Error reading directory {}: {}", root.display(), e))?;

    let mut names = Vec::new();
    for entry in entries.flatten() {
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if filters.should_include(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn count_by_subfolder(moves: &[Move]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for moved in moves {
        *counts.entry(moved.subfolder.clone()).or_insert(0) += 1;
    }
    counts
}

/// Runs a single organization pass over `path`.
///
/// With `dry_run` the planned moves are printed and nothing is touched,
/// not even the destination subfolders.
pub fn run_organize(
    path: &Path,
    kind: ClassifierKind,
    table_path: Option<&Path>,
    dry_run: bool,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let config = Config::load(config_path).map_err(|e| e.to_string())?;
    let filters = config.compile_filters().map_err(|e| e.to_string())?;
    let classifier = build_classifier(kind, table_path)?;

    if dry_run {
        return organize_dry_run(path, classifier.as_ref(), &filters);
    }

    OutputFormatter::info(&format!("Organizing contents of: {}", path.display()));

    relocate::ensure_subfolders(path, &classifier.subfolders()).map_err(|e| e.to_string())?;
    let candidates = list_candidates(path, &filters)?;

    if candidates.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    let progress = OutputFormatter::create_progress_bar(candidates.len() as u64);
    let mut moves = Vec::new();
    let mut failed = false;

    for name in &candidates {
        match relocate::relocate_file(path, name, classifier.as_ref()) {
            Ok(Some(moved)) => moves.push(moved),
            Ok(None) => {}
            Err(e) => {
                OutputFormatter::error(&e.to_string());
                failed = true;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    for moved in &moves {
        OutputFormatter::success(&format!(
            "{} → {}/",
            moved
                .from
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            moved.subfolder
        ));
    }

    OutputFormatter::summary_table(&count_by_subfolder(&moves), moves.len());

    if failed {
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    }

    Ok(())
}

/// Prints what a pass over `path` would do, without moving anything.
fn organize_dry_run(
    path: &Path,
    classifier: &dyn Classifier,
    filters: &CompiledFilters,
) -> Result<(), String> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", path.display()));

    let candidates = list_candidates(path, filters)?;
    if candidates.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    let mut planned = Vec::new();
    for name in &candidates {
        match relocate::plan_file(path, name, classifier) {
            Ok(Some(moved)) => {
                OutputFormatter::plain(&format!(
                    " - {} → {}/{}",
                    name,
                    moved.subfolder,
                    moved
                        .to
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default()
                ));
                planned.push(moved);
            }
            Ok(None) => {
                OutputFormatter::plain(&format!(" - {} (stays)", name));
            }
            Err(e) => OutputFormatter::error(&e.to_string()),
        }
    }

    OutputFormatter::summary_table(&count_by_subfolder(&planned), planned.len());
    OutputFormatter::dry_run_notice("No files were modified.");

    Ok(())
}

/// Watches every configured root until stdin reports Enter or end-of-input,
/// then shuts the watchers down gracefully.
pub fn run_watch(config_path: Option<&Path>) -> Result<(), String> {
    let config = Config::load(config_path).map_err(|e| e.to_string())?;
    if config.roots.is_empty() {
        return Err(
            "No watched roots configured. Add [[roots]] entries to the configuration file."
                .to_string(),
        );
    }

    let filters = Arc::new(config.compile_filters().map_err(|e| e.to_string())?);

    let mut roots = Vec::new();
    for root in &config.roots {
        let classifier = build_classifier(root.classifier, root.table.as_deref())?;
        roots.push(WatchedRoot {
            path: root.path.clone(),
            classifier,
        });
    }

    let mut handle =
        watch::spawn(roots, filters, &config.watch).map_err(|e| e.to_string())?;

    for path in handle.watched_paths() {
        OutputFormatter::info(&format!("Watching: {}", path.display()));
    }
    OutputFormatter::plain("Press Enter to stop.");

    // Blocks until Enter or EOF; either one is the stop signal.
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);

    OutputFormatter::plain("Stopping...");
    handle.stop();
    OutputFormatter::success("All watchers stopped.");

    Ok(())
}

/// Convenience used by tests and embedders: one-shot organization of a
/// directory with an explicit table file.
pub fn organize_with_table(path: &Path, table_path: &Path) -> Result<(), String> {
    run_organize(
        path,
        ClassifierKind::Extensions,
        Some(table_path),
        false,
        None,
    )
}
