//! Run configuration: watched roots, watch settings, and file filters.
//!
//! Configuration is stored in TOML format:
//!
//! ```toml
//! [watch]
//! debounce_ms = 500
//!
//! [[roots]]
//! path = "/home/user/Downloads"
//! classifier = "extensions"
//! table = "/home/user/.config/tidywatch/extensions.json"
//!
//! [[roots]]
//! path = "/home/user/Desktop"
//! classifier = "screengrabs"
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.crdownload", "*.part"]
//! extensions = ["download"]
//! ```
//!
//! The configuration object is built once at startup and passed explicitly
//! to the classifier, relocator and watcher; nothing reads it from a global.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    NotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    Invalid(String),
    /// Invalid glob pattern in the filter rules.
    InvalidGlobPattern(String),
    /// IO error while reading configuration.
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::Io(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Which classifier a watched root uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Extension-table classification.
    Extensions,
    /// Screenshot/screen-recording filename detection.
    Screengrabs,
}

/// One watched root directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    /// Directory to watch and organize.
    pub path: PathBuf,
    /// Classification strategy for this root.
    pub classifier: ClassifierKind,
    /// Optional JSON extension table; the built-in table is used when absent.
    /// Only meaningful for `classifier = "extensions"`.
    #[serde(default)]
    pub table: Option<PathBuf>,
}

/// Watcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Debounce interval for change notifications, in milliseconds. Bursts
    /// of events inside the interval collapse into one notification.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// File exclusion rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to organize hidden files (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    /// Rules for excluding files from a pass.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.crdownload").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, without the dot (case-insensitive).
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Complete run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Watched root directories.
    #[serde(default)]
    pub roots: Vec<RootConfig>,

    /// Watcher tuning.
    #[serde(default)]
    pub watch: WatchSettings,

    /// File exclusion rules, applied to every pass.
    #[serde(default)]
    pub filters: FilterRules,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. `./tidywatch.toml` in the current directory
    /// 3. `~/.config/tidywatch/config.toml`
    /// 4. Default configuration (no roots, default filters)
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from("tidywatch.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("tidywatch")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Compile the filter rules into matchers, validating every pattern.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled filter matchers.
///
/// Glob patterns are compiled once here so that per-file matching never
/// reparses them, and invalid patterns surface at startup rather than
/// mid-pass.
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude_patterns,
        })
    }

    /// Filters that let everything through except hidden files.
    pub fn permissive() -> Self {
        Self {
            enable_hidden_files: false,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Whether a file with this name takes part in a pass.
    ///
    /// Checks run in order with early termination:
    /// 1. Hidden-file filter
    /// 2. Exact filename match
    /// 3. Extension match (case-insensitive, last dot segment)
    /// 4. Glob pattern match
    pub fn should_include(&self, file_name: &str) -> bool {
        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if let Some((_, ext)) = file_name.rsplit_once('.')
            && self.exclude_extensions.contains(&ext.to_lowercase())
        {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return false;
        }

        true
    }
}
