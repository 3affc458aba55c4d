use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Check that `path` can be written as an output file.
/// Stdout ("-") is rejected, and an existing file is refused unless `force` is set.
/// Creates the parent directory if needed.
pub(crate) fn prepare_output_file(path: &Path, force: bool) -> Result<()> {
    if path == Path::new("-") { bail!("stdout is not supported; pass a file path"); }
    if path.is_dir() { bail!("Output path is a directory: {}", path.display()); }
    if path.exists() && !force {
        bail!("Output file already exists: {} (use --force to overwrite)", path.display());
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir_exists(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_is_rejected() {
        assert!(prepare_output_file(Path::new("-"), true).is_err());
    }

    #[test]
    fn existing_file_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "x").unwrap();

        assert!(prepare_output_file(&path, false).is_err());
        assert!(prepare_output_file(&path, true).is_ok());
    }

    #[test]
    fn missing_parent_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.csv");

        prepare_output_file(&path, false).unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
        assert!(prepare_output_file(dir.path(), true).is_err());
    }
}
