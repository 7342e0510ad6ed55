//! Integration tests for tidywatch
//!
//! These tests exercise the complete classify-and-relocate engine the way
//! the binary drives it: one-shot passes, collision handling, screengrab
//! renaming, filtering, and the watch binding end to end.
//!
//! Test categories:
//! 1. Extension-table passes
//! 2. Collision resolution across passes
//! 3. Screengrab detection and renaming
//! 4. Filtering and configuration
//! 5. Watch binding

use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tidywatch::classify::{ExtensionClassifier, ScreengrabClassifier};
use tidywatch::config::{CompiledFilters, Config, WatchSettings};
use tidywatch::relocate::{ensure_subfolders, run_pass};
use tidywatch::rules::ExtensionTable;
use tidywatch::watch::{self, WatchedRoot};
use tidywatch::{collision, Classifier};

// ============================================================================
// Test Utilities
// ============================================================================

/// A test fixture that sets up a temporary directory with a configurable
/// file structure.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file with content in the test directory.
    fn create_file(&self, name: &str, content: &str) {
        let file_path = self.path().join(name);
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content.as_bytes())
            .expect("Failed to write file content");
    }

    /// Create a file at a relative path below the test directory.
    fn create_file_at(&self, rel_path: &str, content: &str) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write file");
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_dir(),
            "Directory should exist: {}",
            path.display()
        );
    }

    /// Names of regular files that are direct children of a subdirectory.
    fn file_names_in(&self, rel_path: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path().join(rel_path))
            .expect("Failed to read directory")
            .filter_map(|entry| {
                let entry = entry.ok()?;
                entry.metadata().ok()?.is_file().then(|| {
                    entry.file_name().to_string_lossy().to_string()
                })
            })
            .collect();
        names.sort();
        names
    }

    /// Waits until `rel_path` exists, up to `timeout`. Returns whether it
    /// appeared in time.
    fn wait_for_file(&self, rel_path: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let path = self.path().join(rel_path);
        while Instant::now() < deadline {
            if path.is_file() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        path.is_file()
    }

    /// Waits until a subdirectory exists, up to `timeout`.
    fn wait_for_dir(&self, rel_path: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let path = self.path().join(rel_path);
        while Instant::now() < deadline {
            if path.is_dir() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        path.is_dir()
    }
}

fn sample_table() -> ExtensionTable {
    ExtensionTable::from_entries([
        (".png", "Images"),
        (".txt", "Docs"),
        (".tmp", "Other"),
    ])
}

fn table_classifier() -> ExtensionClassifier {
    ExtensionClassifier::new(sample_table())
}

fn prepare(fixture: &TestFixture, classifier: &dyn Classifier) {
    ensure_subfolders(fixture.path(), &classifier.subfolders())
        .expect("Failed to create subfolders");
}

// ============================================================================
// Test Suite 1: Extension-Table Passes
// ============================================================================

#[test]
fn test_pass_over_empty_directory() {
    let fixture = TestFixture::new();
    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    let report = run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    assert!(report.is_quiet());
    assert_eq!(report.skipped, 0);
}

#[test]
fn test_pass_sorts_known_extensions_and_leaves_the_rest() {
    // Table {".png": "Images", ".txt": "Docs", ".tmp": "Other"}; root holds
    // a.png, b.txt, c.tmp, d.unknown. One pass relocates exactly two files.
    let fixture = TestFixture::new();
    fixture.create_file("a.png", "a");
    fixture.create_file("b.txt", "b");
    fixture.create_file("c.tmp", "c");
    fixture.create_file("d.unknown", "d");

    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    let report = run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    assert_eq!(report.moved.len(), 2);
    fixture.assert_file_exists("Images/a.png");
    fixture.assert_file_exists("Docs/b.txt");
    fixture.assert_file_exists("c.tmp");
    fixture.assert_file_exists("d.unknown");
    fixture.assert_file_not_exists("a.png");
    fixture.assert_file_not_exists("b.txt");
}

#[test]
fn test_second_pass_is_quiet() {
    let fixture = TestFixture::new();
    fixture.create_file("a.png", "a");

    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("first pass failed");
    let second = run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("second pass failed");

    // Destination subfolders are directories and never re-scanned, so an
    // already-organized tree produces nothing to do.
    assert!(second.is_quiet());
    fixture.assert_file_exists("Images/a.png");
}

#[test]
fn test_table_lookup_is_case_sensitive() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.PNG", "p");

    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    let report = run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    assert!(report.moved.is_empty());
    fixture.assert_file_exists("photo.PNG");
}

#[test]
fn test_multi_dot_names_classify_by_last_token() {
    let fixture = TestFixture::new();
    let classifier = ExtensionClassifier::new(ExtensionTable::from_entries([
        (".gz", "Archives"),
    ]));
    prepare(&fixture, &classifier);
    fixture.create_file("backup.tar.gz", "data");

    run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    fixture.assert_file_exists("Archives/backup.tar.gz");
}

// ============================================================================
// Test Suite 2: Collision Resolution
// ============================================================================

#[test]
fn test_collision_with_existing_destination_file() {
    // Images already holds a.png; a new a.png lands beside it as a_1.png.
    let fixture = TestFixture::new();
    fixture.create_file_at("Images/a.png", "old");
    fixture.create_file("a.png", "new");

    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    assert_eq!(
        fixture.file_names_in("Images"),
        vec!["a.png".to_string(), "a_1.png".to_string()]
    );
    assert_eq!(
        fs::read_to_string(fixture.path().join("Images/a.png")).expect("read failed"),
        "old",
        "existing file is never overwritten"
    );
}

#[test]
fn test_repeated_collisions_count_up() {
    let fixture = TestFixture::new();
    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    for round in 0..3 {
        fixture.create_file("a.png", &format!("round {}", round));
        run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
            .expect("pass failed");
    }

    assert_eq!(
        fixture.file_names_in("Images"),
        vec![
            "a.png".to_string(),
            "a_1.png".to_string(),
            "a_2.png".to_string()
        ]
    );
}

#[test]
fn test_suffixed_source_does_not_stack_suffixes() {
    // report_2.txt arrives while Docs already holds report_1.txt and
    // report_2.txt: the canonical base is "report", so the next free slot is
    // report_3.txt, never report_2_1.txt.
    let fixture = TestFixture::new();
    fixture.create_file_at("Docs/report_1.txt", "one");
    fixture.create_file_at("Docs/report_2.txt", "two");
    fixture.create_file("report_2.txt", "incoming");

    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    fixture.assert_file_exists("Docs/report_3.txt");
    fixture.assert_file_not_exists("Docs/report_2_1.txt");
}

#[test]
fn test_collision_resolver_direct_scenario() {
    let fixture = TestFixture::new();
    fixture.create_file_at("Docs/report_1.txt", "one");
    fixture.create_file_at("Docs/report_2.txt", "two");

    let name = collision::resolve("report_2.txt", &fixture.path().join("Docs"))
        .expect("resolve failed");
    assert_eq!(name, "report_3.txt");
}

// ============================================================================
// Test Suite 3: Screengrab Detection
// ============================================================================

#[test]
fn test_screengrab_is_moved_and_renamed() {
    let fixture = TestFixture::new();
    fixture.create_file("Screenshot 2023-01-01 at 10.30.00.png", "pixels");

    let classifier = ScreengrabClassifier::new();
    prepare(&fixture, &classifier);

    let report = run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    assert_eq!(report.moved.len(), 1);
    fixture.assert_file_not_exists("Screenshot 2023-01-01 at 10.30.00.png");

    let names = fixture.file_names_in("Screenshots");
    assert_eq!(names.len(), 1);
    let shape =
        Regex::new(r"^Screengrab_\d{2}-\d{2}-\d{4}_\d{2}-\d{2}-\d{2}_captured\.png$")
            .expect("shape pattern is valid");
    assert!(shape.is_match(&names[0]), "unexpected name: {}", names[0]);
}

#[test]
fn test_screen_recording_keeps_mov_extension() {
    let fixture = TestFixture::new();
    fixture.create_file("Screen Recording 2023-06-15 at 09.12.45.mov", "frames");

    let classifier = ScreengrabClassifier::new();
    prepare(&fixture, &classifier);

    run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    let names = fixture.file_names_in("Screenshots");
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".mov"));
}

#[test]
fn test_non_screengrabs_are_left_alone() {
    let fixture = TestFixture::new();
    fixture.create_file("holiday.png", "pixels");
    fixture.create_file("notes.txt", "text");

    let classifier = ScreengrabClassifier::new();
    prepare(&fixture, &classifier);

    let report = run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    assert!(report.moved.is_empty());
    assert_eq!(report.skipped, 2);
    fixture.assert_file_exists("holiday.png");
    fixture.assert_file_exists("notes.txt");
}

#[test]
fn test_two_screengrabs_in_one_pass_both_survive() {
    // Both may be renamed within the same second; the collision resolver
    // keeps the second one alive with a suffix.
    let fixture = TestFixture::new();
    fixture.create_file("Screenshot 2023-01-01 at 10.30.00.png", "first");
    fixture.create_file("Screenshot 2023-01-01 at 10.30.00 (2).png", "second");

    let classifier = ScreengrabClassifier::new();
    prepare(&fixture, &classifier);

    run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    assert_eq!(fixture.file_names_in("Screenshots").len(), 2);
}

// ============================================================================
// Test Suite 4: Filtering and Configuration
// ============================================================================

#[test]
fn test_configured_filters_protect_partial_downloads() {
    let fixture = TestFixture::new();
    let config: Config = toml::from_str(
        r#"
        [filters.exclude]
        patterns = ["*.crdownload"]
    "#,
    )
    .expect("Failed to parse config");
    let filters = config.compile_filters().expect("compile failed");

    fixture.create_file("movie.mp4.crdownload", "partial");
    fixture.create_file("done.png", "pixels");

    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    run_pass(fixture.path(), &classifier, &filters).expect("pass failed");

    fixture.assert_file_exists("movie.mp4.crdownload");
    fixture.assert_file_exists("Images/done.png");
}

#[test]
fn test_hidden_files_stay_by_default() {
    let fixture = TestFixture::new();
    fixture.create_file(".secret.png", "pixels");

    let classifier = table_classifier();
    prepare(&fixture, &classifier);

    let filters = Config::default().compile_filters().expect("compile failed");
    run_pass(fixture.path(), &classifier, &filters).expect("pass failed");

    fixture.assert_file_exists(".secret.png");
}

#[test]
fn test_table_loaded_from_json_drives_a_pass() {
    let fixture = TestFixture::new();
    let table_path = fixture.path().join("extensions.json");
    fs::write(&table_path, r#"{".log": "Logs"}"#).expect("Failed to write table");
    fixture.create_file("build.log", "lines");

    let table = ExtensionTable::load(&table_path).expect("Failed to load table");
    let classifier = ExtensionClassifier::new(table);
    prepare(&fixture, &classifier);

    run_pass(fixture.path(), &classifier, &CompiledFilters::permissive())
        .expect("pass failed");

    fixture.assert_file_exists("Logs/build.log");
    // The table file itself has no ".json" mapping and stays put.
    fixture.assert_file_exists("extensions.json");
}

#[test]
fn test_ensure_subfolders_reports_only_new_names() {
    let fixture = TestFixture::new();
    let created = ensure_subfolders(fixture.path(), &["Images", "Docs"])
        .expect("ensure_subfolders failed");
    assert_eq!(created.len(), 2);
    fixture.assert_dir_exists("Images");
    fixture.assert_dir_exists("Docs");

    let created_again = ensure_subfolders(fixture.path(), &["Images", "Docs"])
        .expect("ensure_subfolders failed");
    assert!(created_again.is_empty());
}

// ============================================================================
// Test Suite 5: Watch Binding
// ============================================================================

fn spawn_watcher(fixture: &TestFixture) -> watch::WatcherHandle {
    let roots = vec![WatchedRoot {
        path: fixture.path().to_path_buf(),
        classifier: Arc::new(table_classifier()),
    }];
    watch::spawn(
        roots,
        Arc::new(CompiledFilters::permissive()),
        &WatchSettings { debounce_ms: 100 },
    )
    .expect("Failed to spawn watcher")
}

#[test]
fn test_watcher_runs_initial_pass_on_startup() {
    let fixture = TestFixture::new();
    fixture.create_file("a.png", "pixels");

    let mut handle = spawn_watcher(&fixture);

    assert!(
        fixture.wait_for_file("Images/a.png", Duration::from_secs(5)),
        "startup pass should organize pre-existing files"
    );
    handle.stop();
}

#[test]
fn test_watcher_organizes_a_newly_created_file() {
    let fixture = TestFixture::new();
    let mut handle = spawn_watcher(&fixture);

    // Let the initial pass create the subfolders before dropping the file.
    assert!(
        fixture.wait_for_dir("Images", Duration::from_secs(5)),
        "startup pass should create subfolders"
    );

    fixture.create_file("incoming.png", "pixels");

    assert!(
        fixture.wait_for_file("Images/incoming.png", Duration::from_secs(10)),
        "change notification should trigger a pass"
    );
    fixture.assert_file_not_exists("incoming.png");
    handle.stop();
}

#[test]
fn test_watcher_stop_is_graceful_and_repeatable() {
    let fixture = TestFixture::new();
    let mut handle = spawn_watcher(&fixture);

    handle.stop();
    // A second stop is a no-op, not a panic.
    handle.stop();
}
