use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::write_table_csv;
use crate::models::{StateCounts, TranscriptTable};

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct Stage3Result {
    /// Path the CSV was written to
    pub output_path: PathBuf,
    /// Number of rows written
    pub rows: usize,
    /// Lifecycle state of the rows at write time
    pub states: StateCounts,
}

/// Execute Stage 3: write the table as `name,raw,sentiment,follow_up_needed,tag`
///
/// Every loaded record gets a row; unclassified records have blank fields.
pub fn execute_stage3(table: &TranscriptTable, output: &Path) -> Result<Stage3Result> {
    info!("Writing {} rows to {:?}", table.len(), output);
    write_table_csv(table, output)?;

    Ok(Stage3Result {
        output_path: output.to_path_buf(),
        rows: table.len(),
        states: table.state_counts(),
    })
}
