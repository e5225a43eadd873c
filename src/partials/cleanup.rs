//! Removal of the generated-artifacts directory after a write pass.

use crate::log;
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Recursively delete `dir` if it exists.
///
/// Returns whether anything was removed.
pub fn remove_generated(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }

    fs::remove_dir_all(dir)
        .with_context(|| format!("Failed to remove generated directory: {}", dir.display()))?;
    log!("cleanup"; "removed {}", dir.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_nested_tree() {
        let dir = TempDir::new().unwrap();
        let generated = dir.path().join("partials/generated");
        fs::create_dir_all(generated.join("deep/er")).unwrap();
        fs::write(generated.join("a.html"), "a").unwrap();
        fs::write(generated.join("deep/er/b.html"), "b").unwrap();
        fs::write(dir.path().join("partials/keep.html"), "keep").unwrap();

        assert!(remove_generated(&generated).unwrap());
        assert!(!generated.exists());
        assert!(dir.path().join("partials/keep.html").exists());
    }

    #[test]
    fn test_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        assert!(!remove_generated(&dir.path().join("generated")).unwrap());
    }
}
