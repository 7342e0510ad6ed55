//! Collision-safe filename resolution.
//!
//! Given a desired filename and a target directory, produce a name that does
//! not collide with an existing file in that directory by appending a numeric
//! `_<n>` suffix to the stem. The resolver only performs existence checks; it
//! never reserves the returned name, so the caller must check-then-move and
//! accept a narrow race window: two concurrent passes over the same
//! destination could be handed the same name. Scoping each root to a single
//! sequential worker removes that case.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Upper bound on suffix probing before giving up on a file.
///
/// The loop in [`resolve`] terminates as soon as a free name is found; the
/// bound exists so a pathological destination can never spin it forever.
const MAX_SUFFIX: u32 = 10_000;

static TRAILING_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<base>.*?)(?:_\d+)?$").expect("suffix pattern is valid"));

/// Errors produced by collision resolution.
#[derive(Debug)]
pub enum CollisionError {
    /// Every candidate up to [`MAX_SUFFIX`] already exists in the target
    /// directory. Fatal for this file only.
    Exhausted {
        /// Canonical stem the candidates were derived from.
        base: String,
        /// Number of candidates probed.
        attempts: u32,
    },
}

impl std::fmt::Display for CollisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { base, attempts } => {
                write!(
                    f,
                    "No free name found for '{}' after {} attempts",
                    base, attempts
                )
            }
        }
    }
}

impl std::error::Error for CollisionError {}

/// A candidate filename decomposed into stem and extension.
///
/// The split happens at the *first* dot, so `report.tar.gz` decomposes into
/// stem `report` and extension `tar.gz` and the suffix lands before the whole
/// extension chain (`report_1.tar.gz`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct CandidateName {
    stem: String,
    extension: Option<String>,
}

impl CandidateName {
    fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((stem, extension)) => Self {
                stem: stem.to_string(),
                extension: Some(extension.to_string()),
            },
            None => Self {
                stem: name.to_string(),
                extension: None,
            },
        }
    }

    /// The stem with any single trailing `_<digits>` group removed, so that
    /// re-resolving an already-suffixed name yields `base_2`, never
    /// `base_1_1`. Only the trailing group is stripped: `report99_2`
    /// canonicalizes to `report99`.
    fn canonical_base(&self) -> &str {
        TRAILING_SUFFIX
            .captures(&self.stem)
            .and_then(|caps| caps.name("base"))
            .map(|m| m.as_str())
            .unwrap_or(&self.stem)
    }

    fn with_stem(&self, stem: String) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        }
    }
}

/// Returns a filename guaranteed not to collide with an existing file in
/// `directory`.
///
/// The desired name itself is tried first; while the candidate exists, the
/// counter is incremented and `<base>_<n>` is tried next. Only regular files
/// count as collisions; a missing `directory` means every name is free (the
/// caller is responsible for creating it before any actual move).
///
/// # Examples
///
/// ```no_run
/// use tidywatch::collision::resolve;
/// use std::path::Path;
///
/// let name = resolve("report.txt", Path::new("/home/user/Downloads/Docs"))?;
/// // "report.txt" if free, otherwise "report_1.txt", "report_2.txt", ...
/// # Ok::<(), tidywatch::collision::CollisionError>(())
/// ```
pub fn resolve(desired: &str, directory: &Path) -> Result<String, CollisionError> {
    let candidate = CandidateName::parse(desired);
    let base = candidate.canonical_base().to_string();

    let mut name = desired.to_string();
    let mut counter = 0u32;
    while directory.join(&name).is_file() {
        counter += 1;
        if counter > MAX_SUFFIX {
            return Err(CollisionError::Exhausted {
                base,
                attempts: counter,
            });
        }
        name = candidate.with_stem(format!("{}_{}", base, counter));
    }
    Ok(name)
}
