//! File relocation engine.
//!
//! The relocator is the orchestration layer: for each direct child of a root
//! directory it asks a [`Classifier`] for a destination, asks the collision
//! resolver for a safe name within that destination, and performs the move
//! with a single `rename`. Directories are skipped and never descended into;
//! destination subfolders are directories, so already-organized files never
//! take part in later passes.
//!
//! The relocator assumes the required subfolders already exist; callers
//! re-assert them with [`ensure_subfolders`] before every pass. A subfolder
//! that vanishes between the check and the move surfaces as a per-file
//! failure and the file is retried naturally on the next pass.

use crate::classify::Classifier;
use crate::collision::{self, CollisionError};
use crate::config::CompiledFilters;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while relocating files.
#[derive(Debug)]
pub enum RelocateError {
    /// The root directory is missing or is not a directory.
    InvalidRoot {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a required subfolder.
    SubfolderCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to list the root directory; aborts the pass.
    ListFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file to its destination.
    MoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Collision resolution gave up on this file.
    Collision(CollisionError),
}

impl std::fmt::Display for RelocateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoot { path, source } => {
                write!(f, "Invalid root directory {}: {}", path.display(), source)
            }
            Self::SubfolderCreationFailed { path, source } => {
                write!(f, "Failed to create subfolder {}: {}", path.display(), source)
            }
            Self::ListFailed { path, source } => {
                write!(f, "Failed to list directory {}: {}", path.display(), source)
            }
            Self::MoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::Collision(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RelocateError {}

impl From<CollisionError> for RelocateError {
    fn from(e: CollisionError) -> Self {
        Self::Collision(e)
    }
}

/// Result type for relocation operations.
pub type RelocateResult<T> = Result<T, RelocateError>;

/// One completed (or planned) relocation.
#[derive(Debug, Clone)]
pub struct Move {
    /// Where the file was.
    pub from: PathBuf,
    /// Where the file went.
    pub to: PathBuf,
    /// The subfolder it was classified into.
    pub subfolder: String,
}

/// A per-file failure inside a pass.
#[derive(Debug)]
pub struct PassFailure {
    /// The file that could not be relocated.
    pub file: PathBuf,
    /// Why.
    pub error: RelocateError,
}

/// Outcome of one full pass over a root's direct children.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Moves that were performed.
    pub moved: Vec<Move>,
    /// Files visited but left in place (unclassifiable or filtered out).
    pub skipped: usize,
    /// Per-file failures; these never abort the pass.
    pub failures: Vec<PassFailure>,
}

impl PassReport {
    /// True when the pass moved nothing and hit no failures.
    pub fn is_quiet(&self) -> bool {
        self.moved.is_empty() && self.failures.is_empty()
    }
}

/// Creates any of `names` missing under `root` and returns the names it
/// actually created.
///
/// Idempotent: already-existing subfolders are not an error and are not
/// reported as created. Subfolders are never deleted.
pub fn ensure_subfolders<S: AsRef<str>>(root: &Path, names: &[S]) -> RelocateResult<Vec<String>> {
    if !root.is_dir() {
        return Err(RelocateError::InvalidRoot {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "root is not a directory"),
        });
    }

    let mut created = Vec::new();
    for name in names {
        let destination = root.join(name.as_ref());
        if !destination.is_dir() {
            fs::create_dir(&destination).map_err(|e| RelocateError::SubfolderCreationFailed {
                path: destination.clone(),
                source: e,
            })?;
            created.push(name.as_ref().to_string());
        }
    }
    Ok(created)
}

/// Computes the move a file would undergo, without touching it.
///
/// Returns `Ok(None)` when the classifier leaves the file in place, which
/// is a normal skip, not an error. The returned destination name is
/// collision-resolved against the current state of the destination
/// directory.
pub fn plan_file(
    root: &Path,
    file_name: &str,
    classifier: &dyn Classifier,
) -> RelocateResult<Option<Move>> {
    let Some(target) = classifier.classify(file_name) else {
        return Ok(None);
    };

    let destination_dir = root.join(&target.subfolder);
    let desired = target.rename_to.as_deref().unwrap_or(file_name);
    let safe_name = collision::resolve(desired, &destination_dir)?;

    Ok(Some(Move {
        from: root.join(file_name),
        to: destination_dir.join(safe_name),
        subfolder: target.subfolder,
    }))
}

/// Classifies a single file and moves it to its destination.
///
/// Returns `Ok(None)` when the file is left in place. The existence check
/// and the rename are not one atomic operation; with one sequential worker
/// per root this is only observable if something else writes into the
/// destination concurrently, in which case the rename itself still never
/// silently overwrites a directory and the failure is reported.
pub fn relocate_file(
    root: &Path,
    file_name: &str,
    classifier: &dyn Classifier,
) -> RelocateResult<Option<Move>> {
    let Some(planned) = plan_file(root, file_name, classifier)? else {
        return Ok(None);
    };

    fs::rename(&planned.from, &planned.to).map_err(|e| RelocateError::MoveFailure {
        source: planned.from.clone(),
        destination: planned.to.clone(),
        source_error: e,
    })?;

    Ok(Some(planned))
}

/// Runs one full scan-and-relocate pass over `root`'s direct children.
///
/// Files are visited in directory-listing order, each at most once.
/// Directories are skipped (the scan is non-recursive), as are files the
/// filters exclude. A per-file failure is recorded in the report and the
/// pass continues; only failure to list the root aborts.
pub fn run_pass(
    root: &Path,
    classifier: &dyn Classifier,
    filters: &CompiledFilters,
) -> RelocateResult<PassReport> {
    let entries = fs::read_dir(root).map_err(|e| RelocateError::ListFailed {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut report = PassReport::default();
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !filters.should_include(&file_name) {
            report.skipped += 1;
            continue;
        }

        match relocate_file(root, &file_name, classifier) {
            Ok(Some(moved)) => report.moved.push(moved),
            Ok(None) => report.skipped += 1,
            Err(error) => report.failures.push(PassFailure {
                file: root.join(&file_name),
                error,
            }),
        }
    }

    Ok(report)
}
