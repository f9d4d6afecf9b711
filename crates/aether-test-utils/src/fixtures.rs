//! Filesystem fixtures.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A uniquely named directory under the system temp dir, removed
/// (with its contents) on drop.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory whose name starts with `aether-{label}-`.
    ///
    /// Panics if the directory cannot be created.
    pub fn new(label: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("aether-{label}-"))
            .tempdir()
            .unwrap_or_else(|e| panic!("cannot create scratch dir for {label}: {e}"));
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Number of entries directly inside `sub` (relative to the scratch dir).
    pub fn entry_count(&self, sub: impl AsRef<Path>) -> usize {
        fs::read_dir(self.path().join(sub))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
