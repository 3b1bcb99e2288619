#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a wave: a CSV body plus its codebook sidecar.
    pub fn write_wave(&self, name: &str, csv: &str, codebook_yaml: &str) -> PathBuf {
        let data = self.write(name, csv);
        let sidecar = data.with_extension("codebook.yaml");
        let mut file = File::create(&sidecar).expect("create codebook file");
        file.write_all(codebook_yaml.as_bytes())
            .expect("write codebook contents");
        data
    }
}
