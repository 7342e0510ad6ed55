//! Directory watching.
//!
//! Each watched root gets a debounced filesystem watcher and a dedicated
//! worker thread, joined by a capacity-one channel. The watcher callback
//! does a non-blocking send of a unit token, so however many change
//! notifications arrive while a pass is running, at most one further pass is
//! queued: notifications coalesce and at most one pass is ever in flight
//! per root. Roots are independent of each other and share only read-only
//! configuration.
//!
//! Before the initial pass and before every notification-triggered pass the
//! worker re-asserts the root's required subfolders, so the relocator's
//! precondition holds even if a user deletes a subfolder mid-run.
//!
//! A pass that moves files generates change events of its own; those
//! collapse into one follow-up pass that finds nothing to do, after which
//! the root settles.

use crate::classify::Classifier;
use crate::config::{CompiledFilters, WatchSettings};
use crate::output::OutputFormatter;
use crate::relocate;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebounceEventResult, Debouncer, RecommendedCache, new_debouncer};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, sync_channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Errors that can occur while setting up watchers.
#[derive(Debug)]
pub enum WatchError {
    /// The underlying filesystem watcher could not be created or attached.
    Notify {
        path: PathBuf,
        source: notify::Error,
    },
    /// The root could not be prepared for watching.
    Relocate(relocate::RelocateError),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notify { path, source } => {
                write!(f, "Failed to watch {}: {}", path.display(), source)
            }
            Self::Relocate(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WatchError {}

impl From<relocate::RelocateError> for WatchError {
    fn from(e: relocate::RelocateError) -> Self {
        Self::Relocate(e)
    }
}

/// A root directory paired with the classifier that organizes it.
pub struct WatchedRoot {
    /// Directory to watch and organize.
    pub path: PathBuf,
    /// Classification strategy for this root.
    pub classifier: Arc<dyn Classifier>,
}

/// Everything one worker needs for its passes.
struct RootContext {
    path: PathBuf,
    classifier: Arc<dyn Classifier>,
    filters: Arc<CompiledFilters>,
}

impl RootContext {
    /// Re-asserts subfolders, runs one pass, and reports the outcome.
    /// Failures are reported and swallowed; the watching process never
    /// crashes on a per-pass problem and unmoved files are retried on the
    /// next notification.
    fn run_pass(&self) {
        let subfolders = self.classifier.subfolders();
        if let Err(e) = relocate::ensure_subfolders(&self.path, &subfolders) {
            OutputFormatter::error(&format!("{}: {}", self.path.display(), e));
            return;
        }

        match relocate::run_pass(&self.path, self.classifier.as_ref(), &self.filters) {
            Ok(report) => OutputFormatter::pass_report(&self.path, &report),
            Err(e) => OutputFormatter::error(&format!("{}: {}", self.path.display(), e)),
        }
    }
}

/// One pass at startup, then one pass per received token, until the sending
/// side disconnects. An in-flight pass always runs to completion; shutdown
/// only stops the intake.
fn worker_loop(notifications: Receiver<()>, context: RootContext) {
    context.run_pass();
    while notifications.recv().is_ok() {
        context.run_pass();
    }
}

/// A live watcher for one root.
struct RootWatcher {
    path: PathBuf,
    debouncer: Option<Debouncer<RecommendedWatcher, RecommendedCache>>,
    worker: Option<JoinHandle<()>>,
}

/// Handle over all running watchers.
///
/// Dropping the handle (or calling [`stop`](Self::stop)) detaches every
/// filesystem watcher, lets each worker finish its in-flight pass, and joins
/// the worker threads.
pub struct WatcherHandle {
    roots: Vec<RootWatcher>,
}

impl WatcherHandle {
    /// The paths currently being watched.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.roots.iter().map(|r| r.path.clone()).collect()
    }

    /// Graceful shutdown: stop accepting notifications, finish in-flight
    /// passes, tear the workers down.
    pub fn stop(&mut self) {
        for root in &mut self.roots {
            // Dropping the debouncer drops the callback's sender; the worker
            // sees the disconnect once its current pass is done.
            root.debouncer = None;
            if let Some(worker) = root.worker.take()
                && worker.join().is_err()
            {
                OutputFormatter::error(&format!("Worker for {} panicked", root.path.display()));
            }
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns a watcher and worker for every root and runs the initial passes.
///
/// Returns once all watchers are attached; organization then happens on the
/// worker threads until the handle is stopped or dropped.
pub fn spawn(
    roots: Vec<WatchedRoot>,
    filters: Arc<CompiledFilters>,
    settings: &WatchSettings,
) -> Result<WatcherHandle, WatchError> {
    let debounce = Duration::from_millis(settings.debounce_ms);
    let mut running = Vec::with_capacity(roots.len());

    for root in roots {
        // Subfolders are asserted once, eagerly, so a bad root fails spawn
        // instead of a worker thread. Workers re-assert before every pass.
        relocate::ensure_subfolders(&root.path, &root.classifier.subfolders())?;

        // Capacity 1: a burst of notifications while a pass runs queues
        // exactly one follow-up pass.
        let (tx, rx) = sync_channel::<()>(1);

        let callback_path = root.path.clone();
        let mut debouncer = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    if !events.is_empty() {
                        let _ = tx.try_send(());
                    }
                }
                Err(errors) => {
                    for error in errors {
                        OutputFormatter::error(&format!(
                            "Watcher error on {}: {}",
                            callback_path.display(),
                            error
                        ));
                    }
                }
            }
        })
        .map_err(|e| WatchError::Notify {
            path: root.path.clone(),
            source: e,
        })?;

        debouncer
            .watch(&root.path, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Notify {
                path: root.path.clone(),
                source: e,
            })?;

        // Only start the worker once the watcher is attached; a failed root
        // spawns nothing.
        let context = RootContext {
            path: root.path.clone(),
            classifier: root.classifier,
            filters: Arc::clone(&filters),
        };
        let worker = thread::spawn(move || worker_loop(rx, context));

        running.push(RootWatcher {
            path: root.path,
            debouncer: Some(debouncer),
            worker: Some(worker),
        });
    }

    Ok(WatcherHandle { roots: running })
}
