use std::path::Path;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::io::{list_transcript_files, read_transcript};
use crate::models::{TranscriptRecord, TranscriptTable};
use crate::stages::normalize;

/// Result of Stage 1 loading
#[derive(Debug)]
pub struct Stage1Result {
    /// One pending record per readable transcript file
    pub table: TranscriptTable,
    /// Matching files that could not be read (not in the table)
    pub unreadable: Vec<String>,
}

/// Execute Stage 1: load every `transcript_*.txt` file in `data_dir`
///
/// Each file is read, trimmed and normalized into a pending record. A file
/// that cannot be read is logged and left out; only a failure to list the
/// directory itself is returned as an error.
pub fn execute_stage1(data_dir: &Path) -> Result<Stage1Result> {
    let names = list_transcript_files(data_dir)?;
    debug!("Found {} transcript files in {:?}", names.len(), data_dir);

    let mut table = TranscriptTable::new(data_dir);
    let mut unreadable = Vec::new();

    for name in names {
        let path = data_dir.join(&name);
        match read_transcript(&path) {
            Ok(content) => {
                let raw = normalize(content.trim());
                table.records.push(TranscriptRecord::new(name, raw));
            }
            Err(e) => {
                error!("Error reading {}: {:#}", name, e);
                unreadable.push(name);
            }
        }
    }

    info!(
        "Loaded {} transcripts ({} unreadable)",
        table.len(),
        unreadable.len()
    );

    Ok(Stage1Result { table, unreadable })
}
