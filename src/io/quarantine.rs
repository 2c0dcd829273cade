use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Move `source` into `error_dir`, creating the directory if absent.
///
/// A file already quarantined under the same name is never replaced; the
/// newcomer gets a numbered name instead. Falls back to copy-and-delete when
/// a rename is not possible (for example across filesystems). Returns the
/// new location.
pub fn quarantine_file(source: &Path, error_dir: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .with_context(|| format!("No file name in path: {:?}", source))?;

    std::fs::create_dir_all(error_dir)
        .with_context(|| format!("Failed to create directory: {:?}", error_dir))?;

    let destination = free_destination(error_dir, Path::new(file_name));
    if destination.file_name() != Some(file_name) {
        warn!(
            "{:?} already holds {:?}, quarantining as {:?}",
            error_dir, file_name, destination
        );
    }

    if let Err(e) = std::fs::rename(source, &destination) {
        debug!("Rename of {:?} failed ({}), copying instead", source, e);
        std::fs::copy(source, &destination)
            .with_context(|| format!("Failed to copy {:?} to {:?}", source, destination))?;
        std::fs::remove_file(source)
            .with_context(|| format!("Failed to remove {:?}", source))?;
    }

    Ok(destination)
}

/// `error_dir/name`, or `error_dir/<stem>_<n>.<ext>` with the lowest free `n`
fn free_destination(error_dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = error_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = error_dir.join(format!("{}_{}{}", stem, n, extension));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarantine_creates_dir_and_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("transcript_7.txt");
        std::fs::write(&source, "PA Agent: hi").unwrap();
        let error_dir = dir.path().join("nested").join("error");

        let moved = quarantine_file(&source, &error_dir).unwrap();

        assert_eq!(moved, error_dir.join("transcript_7.txt"));
        assert!(!source.exists());
        assert_eq!(std::fs::read_to_string(&moved).unwrap(), "PA Agent: hi");
    }

    #[test]
    fn test_quarantine_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = quarantine_file(&dir.path().join("transcript_9.txt"), &dir.path().join("error"));
        assert!(result.is_err());
    }

    #[test]
    fn test_quarantine_keeps_earlier_file() {
        let dir = tempfile::tempdir().unwrap();
        let error_dir = dir.path().join("error");
        std::fs::create_dir(&error_dir).unwrap();
        std::fs::write(error_dir.join("transcript_0.txt"), "EARLIER RUN").unwrap();
        std::fs::write(error_dir.join("transcript_0_1.txt"), "SECOND RUN").unwrap();
        let source = dir.path().join("transcript_0.txt");
        std::fs::write(&source, "NEW").unwrap();

        let moved = quarantine_file(&source, &error_dir).unwrap();

        assert_eq!(moved, error_dir.join("transcript_0_2.txt"));
        assert!(!source.exists());
        assert_eq!(std::fs::read_to_string(&moved).unwrap(), "NEW");
        assert_eq!(
            std::fs::read_to_string(error_dir.join("transcript_0.txt")).unwrap(),
            "EARLIER RUN"
        );
        assert_eq!(
            std::fs::read_to_string(error_dir.join("transcript_0_1.txt")).unwrap(),
            "SECOND RUN"
        );
    }
}
