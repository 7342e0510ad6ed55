//! Filename extension resolution.
//!
//! A filename's extension is the last dot-prefixed run of word characters in
//! the name, including the dot itself. Scanning for the *last* such token is
//! what makes multi-dot names behave (`archive.tar.gz` resolves to `.gz`,
//! `Screenshot 2023-01-01 at 10.30.00.png` resolves to `.png`).

use regex::Regex;
use std::sync::LazyLock;

static EXTENSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[\w]+").expect("extension token pattern is valid"));

/// Returns the extension of `file_name`, including the leading dot.
///
/// Returns `None` for names that contain no dot-extension at all.
///
/// # Examples
///
/// ```
/// use tidywatch::extension::file_extension;
///
/// assert_eq!(file_extension("photo.png"), Some(".png".to_string()));
/// assert_eq!(file_extension("archive.tar.gz"), Some(".gz".to_string()));
/// assert_eq!(file_extension("README"), None);
/// ```
pub fn file_extension(file_name: &str) -> Option<String> {
    EXTENSION_TOKEN
        .find_iter(file_name)
        .last()
        .map(|m| m.as_str().to_string())
}
