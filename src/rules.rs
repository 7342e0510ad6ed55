//! Extension-to-category classification rules.
//!
//! The table maps extension strings *including the leading dot* (`".png"`)
//! to category labels (`"Images"`). The sentinel category [`OTHER_CATEGORY`]
//! means "leave the file where it is"; extensions absent from the table are
//! treated the same way. Lookup is case-sensitive: `.PNG` and `.png` are
//! distinct keys.
//!
//! The table is persisted as a flat JSON object and loaded once at startup;
//! it is immutable for the rest of the run.
//!
//! ```json
//! {
//!     ".png": "Images",
//!     ".txt": "Docs",
//!     ".tmp": "Other"
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Category label meaning "do not relocate".
pub const OTHER_CATEGORY: &str = "Other";

/// Errors that can occur while loading an extension table.
#[derive(Debug)]
pub enum TableError {
    /// Table file not found at the specified path.
    NotFound(PathBuf),
    /// Table file is not a flat JSON object of strings.
    Invalid { path: PathBuf, reason: String },
    /// IO error while reading the table file.
    Io { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Extension table not found: {}", path.display())
            }
            Self::Invalid { path, reason } => {
                write!(f, "Invalid extension table {}: {}", path.display(), reason)
            }
            Self::Io { path, source } => {
                write!(f, "Error reading extension table {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Immutable mapping from dotted extension to category label.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    entries: HashMap<String, String>,
}

impl ExtensionTable {
    /// Builds a table from explicit `(extension, category)` pairs.
    ///
    /// Extensions are expected to carry their leading dot.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Loads a table from a JSON file of the shape `{".png": "Images", ...}`.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        if !path.exists() {
            return Err(TableError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| TableError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let entries: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| TableError::Invalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self { entries })
    }

    /// The built-in table used when no table file is configured.
    pub fn builtin() -> Self {
        Self::from_entries([
            (".png", "Images"),
            (".jpg", "Images"),
            (".jpeg", "Images"),
            (".gif", "Images"),
            (".svg", "Images"),
            (".webp", "Images"),
            (".heic", "Images"),
            (".pdf", "Docs"),
            (".txt", "Docs"),
            (".md", "Docs"),
            (".doc", "Docs"),
            (".docx", "Docs"),
            (".rtf", "Docs"),
            (".csv", "Docs"),
            (".xlsx", "Docs"),
            (".mp3", "Audio"),
            (".wav", "Audio"),
            (".flac", "Audio"),
            (".m4a", "Audio"),
            (".mp4", "Videos"),
            (".mov", "Videos"),
            (".mkv", "Videos"),
            (".webm", "Videos"),
            (".zip", "Archives"),
            (".tar", "Archives"),
            (".gz", "Archives"),
            (".7z", "Archives"),
            (".rar", "Archives"),
            (".dmg", "Installers"),
            (".pkg", "Installers"),
            (".deb", "Installers"),
            (".tmp", "Other"),
            (".part", "Other"),
            (".crdownload", "Other"),
        ])
    }

    /// Returns the destination category for a dotted extension, or `None`
    /// when the extension is unknown or maps to the sentinel [`OTHER_CATEGORY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tidywatch::rules::ExtensionTable;
    ///
    /// let table = ExtensionTable::from_entries([(".png", "Images"), (".tmp", "Other")]);
    /// assert_eq!(table.category_for(".png"), Some("Images"));
    /// assert_eq!(table.category_for(".tmp"), None);
    /// assert_eq!(table.category_for(".xyz"), None);
    /// ```
    pub fn category_for(&self, extension: &str) -> Option<&str> {
        self.entries
            .get(extension)
            .map(String::as_str)
            .filter(|category| *category != OTHER_CATEGORY)
    }

    /// The sorted, deduplicated set of destination subfolder names this
    /// table can classify into. The sentinel category is not a subfolder.
    pub fn subfolders(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .values()
            .filter(|category| category.as_str() != OTHER_CATEGORY)
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of entries, the sentinel included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_category_lookup() {
        let table = ExtensionTable::from_entries([(".png", "Images"), (".txt", "Docs")]);
        assert_eq!(table.category_for(".png"), Some("Images"));
        assert_eq!(table.category_for(".txt"), Some("Docs"));
    }

    #[test]
    fn test_unknown_extension_has_no_category() {
        let table = ExtensionTable::from_entries([(".png", "Images")]);
        assert_eq!(table.category_for(".xyz"), None);
    }

    #[test]
    fn test_other_sentinel_has_no_category() {
        let table = ExtensionTable::from_entries([(".tmp", "Other")]);
        assert_eq!(table.category_for(".tmp"), None);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = ExtensionTable::from_entries([(".png", "Images")]);
        assert_eq!(table.category_for(".PNG"), None);
    }

    #[test]
    fn test_subfolders_sorted_unique_without_sentinel() {
        let table = ExtensionTable::from_entries([
            (".png", "Images"),
            (".jpg", "Images"),
            (".txt", "Docs"),
            (".tmp", "Other"),
        ]);
        assert_eq!(table.subfolders(), vec!["Docs".to_string(), "Images".to_string()]);
    }

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("extensions.json");
        fs::write(&path, r#"{".png": "Images", ".tmp": "Other"}"#)
            .expect("Failed to write table file");

        let table = ExtensionTable::load(&path).expect("Failed to load table");
        assert_eq!(table.category_for(".png"), Some("Images"));
        assert_eq!(table.category_for(".tmp"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ExtensionTable::load(Path::new("/no/such/table.json"));
        assert!(matches!(result, Err(TableError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("extensions.json");
        fs::write(&path, r#"{".png": ["not", "a", "string"]}"#)
            .expect("Failed to write table file");

        let result = ExtensionTable::load(&path);
        assert!(matches!(result, Err(TableError::Invalid { .. })));
    }

    #[test]
    fn test_builtin_table_has_common_mappings() {
        let table = ExtensionTable::builtin();
        assert_eq!(table.category_for(".png"), Some("Images"));
        assert_eq!(table.category_for(".pdf"), Some("Docs"));
        assert_eq!(table.category_for(".mp3"), Some("Audio"));
        assert_eq!(table.category_for(".crdownload"), None);
        assert!(!table.is_empty());
    }
}
