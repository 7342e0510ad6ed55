//! tidywatch - keep watched directories tidy
//!
//! This library watches directories for filesystem changes and reorganizes
//! their files into category subfolders, classifying by extension table or
//! by screenshot-style filename patterns, with deterministic collision-safe
//! renaming.

pub mod classify;
pub mod cli;
pub mod collision;
pub mod config;
pub mod extension;
pub mod output;
pub mod relocate;
pub mod rules;
pub mod watch;

pub use classify::{Classifier, ExtensionClassifier, ScreengrabClassifier, Target};
pub use collision::CollisionError;
pub use config::{ClassifierKind, CompiledFilters, Config, ConfigError};
pub use extension::file_extension;
pub use relocate::{Move, PassReport, RelocateError, ensure_subfolders, run_pass};
pub use rules::{ExtensionTable, OTHER_CATEGORY, TableError};
pub use watch::{WatchError, WatchedRoot, WatcherHandle};
