use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Transcript files are named `transcript_<id>.txt`
pub const TRANSCRIPT_PREFIX: &str = "transcript_";
pub const TRANSCRIPT_EXTENSION: &str = ".txt";

/// Case-sensitive check against the transcript naming convention
pub fn is_transcript_name(name: &str) -> bool {
    name.starts_with(TRANSCRIPT_PREFIX) && name.ends_with(TRANSCRIPT_EXTENSION)
}

/// List the names of entries in `dir` that follow the transcript naming
/// convention, in directory listing order.
///
/// Only names are inspected; nothing is opened.
pub fn list_transcript_files(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("Skipping non UTF-8 file name {:?}", raw);
                continue;
            }
        };

        if is_transcript_name(&name) {
            names.push(name);
        }
    }

    Ok(names)
}

/// Read a transcript file as UTF-8 text
pub fn read_transcript(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}

/// A row of a previously written (or hand-labelled) results table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelledRow {
    pub name: String,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub follow_up_needed: String,
    #[serde(default)]
    pub tag: String,
}

/// Read a results CSV. Columns other than the classification fields are ignored.
pub fn read_labelled_csv(path: &Path) -> Result<Vec<LabelledRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV: {:?}", path))?;

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        let row: LabelledRow =
            row.with_context(|| format!("Failed to parse row {} of {:?}", index, path))?;
        rows.push(row);
    }

    Ok(rows)
}
