//! [`TestDataRoot`] builder for Foundry World Tools test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary application directory laid out as
///
/// ```text
/// <tmp>/Config/options.json
/// <tmp>/Data/
/// ```
///
/// with helpers to add projects, assets and record stores below `Data`.
///
/// # Example
///
/// ```rust,no_run
/// use fwt_test_utils::TestDataRoot;
///
/// let data = TestDataRoot::new();
/// data.add_world("acme");
/// data.write_asset("worlds/acme/img/a.png", b"png");
/// data.write_records("worlds/acme/data/actors.db", &[r#"{"_id":"a1","img":"img/a.png"}"#]);
/// data.assert_exists("worlds/acme/img/a.png");
/// ```
pub struct TestDataRoot {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Default for TestDataRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDataRoot {
    /// Create the application layout in a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        // Resolve platform symlinks (macOS /var) so paths compare equal to
        // what the code under test computes.
        let root = temp_dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("Config")).unwrap();
        fs::write(root.join("Config/options.json"), "{}\n").unwrap();
        fs::create_dir_all(root.join("Data")).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// The temporary application directory (parent of `Data`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("Data")
    }

    /// A directory next to `Data`, outside the data root.
    pub fn outside_dir(&self, name: &str) -> PathBuf {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Create `Data/worlds/<name>/world.json`.
    pub fn add_world(&self, name: &str) -> PathBuf {
        self.add_project("world", &format!("worlds/{name}"), name)
    }

    /// Create a project of `kind` (`world`, `system`, `module`) at `dir`
    /// (relative to `Data`) whose manifest declares `name`.
    pub fn add_project(&self, kind: &str, dir: &str, name: &str) -> PathBuf {
        let project = self.data_dir().join(dir);
        write_manifest(&project, kind, name);
        project
    }

    /// Write a file relative to `Data`, creating parent directories.
    pub fn write_asset(&self, rel: &str, content: &[u8]) -> PathBuf {
        write_file(&self.data_dir().join(rel), content)
    }

    /// Write a record store relative to `Data`, one JSON record per line.
    pub fn write_records(&self, rel: &str, lines: &[&str]) -> PathBuf {
        let mut content = lines.join("\n");
        content.push('\n');
        write_file(&self.data_dir().join(rel), content.as_bytes())
    }

    /// Create a directory relative to `Data`.
    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let dir = self.data_dir().join(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Read a file relative to `Data`.
    pub fn read(&self, rel: &str) -> String {
        let path = self.data_dir().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Entries of a directory relative to `Data`, sorted, or empty when the
    /// directory does not exist.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.data_dir().join(rel)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Assert that `rel` (relative to `Data`) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, rel: &str) {
        let full_path = self.data_dir().join(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` (relative to `Data`) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, rel: &str) {
        let full_path = self.data_dir().join(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }
}

/// Write a manifest for a project at `dir`.
pub fn write_manifest(dir: &Path, kind: &str, name: &str) {
    fs::create_dir_all(dir).unwrap();
    let manifest = format!("{{\"name\": \"{name}\", \"title\": \"{name} (test)\"}}\n");
    fs::write(dir.join(format!("{kind}.json")), manifest).unwrap();
}

fn write_file(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
