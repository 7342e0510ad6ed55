//! File classification.
//!
//! A classifier decides, from a filename alone, which subfolder of the
//! watched root a file belongs in, and optionally what it should be called
//! once it gets there. Two implementations exist: one driven by an
//! [`ExtensionTable`], one matching the platform screenshot/screen-recording
//! naming convention. Content is never inspected.

use crate::extension::file_extension;
use crate::rules::ExtensionTable;
use regex::Regex;
use std::sync::LazyLock;

/// The destination a classifier picked for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Subfolder name under the watched root.
    pub subfolder: String,
    /// Replacement filename, when the classifier renames. `None` keeps the
    /// original name.
    pub rename_to: Option<String>,
}

/// Capability interface for classification.
///
/// Any implementation can be handed to the relocator or the watch binding;
/// `classify` returning `None` means the file stays where it is.
pub trait Classifier: Send + Sync {
    /// Picks a destination for `file_name`, or `None` to leave it in place.
    fn classify(&self, file_name: &str) -> Option<Target>;

    /// The subfolder names that must exist under a root before a pass runs.
    fn subfolders(&self) -> Vec<String>;
}

/// Classifies files by their extension through an [`ExtensionTable`].
///
/// An unknown extension, a missing extension, and the sentinel `Other`
/// category all yield `None`; the file is left untouched.
#[derive(Debug, Clone)]
pub struct ExtensionClassifier {
    table: ExtensionTable,
}

impl ExtensionClassifier {
    pub fn new(table: ExtensionTable) -> Self {
        Self { table }
    }
}

impl Classifier for ExtensionClassifier {
    fn classify(&self, file_name: &str) -> Option<Target> {
        let extension = file_extension(file_name)?;
        let category = self.table.category_for(&extension)?;
        Some(Target {
            subfolder: category.to_string(),
            rename_to: None,
        })
    }

    fn subfolders(&self) -> Vec<String> {
        self.table.subfolders()
    }
}

/// Subfolder the screengrab classifier files everything into.
pub const SCREENGRAB_SUBFOLDER: &str = "Screenshots";

static SCREENGRAB_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Screenshot|Screen\sRecording)\s(\d+-*)+\sat\s((\d+\.){2}\d+)(\s\(\d\))*(\.(mov|png))")
        .expect("screengrab pattern is valid")
});

/// Detects platform screenshots and screen recordings by filename and files
/// them into [`SCREENGRAB_SUBFOLDER`] under a fresh name.
///
/// The replacement name embeds the *current* local time, not the capture
/// time. Classifying the same file twice produces two different names, and
/// the collision resolver (not a stable identity) is what prevents
/// overwrites.
#[derive(Debug, Clone, Default)]
pub struct ScreengrabClassifier;

impl ScreengrabClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for ScreengrabClassifier {
    fn classify(&self, file_name: &str) -> Option<Target> {
        if !SCREENGRAB_NAME.is_match(file_name) {
            return None;
        }

        let stamp = chrono::Local::now().format("%d-%m-%Y_%H-%M-%S");
        let extension = file_extension(file_name).unwrap_or_default();
        Some(Target {
            subfolder: SCREENGRAB_SUBFOLDER.to_string(),
            rename_to: Some(format!("Screengrab_{}_captured{}", stamp, extension)),
        })
    }

    fn subfolders(&self) -> Vec<String> {
        vec![SCREENGRAB_SUBFOLDER.to_string()]
    }
}
