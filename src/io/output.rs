use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{TranscriptRecord, TranscriptTable};

/// Column order of the results table
pub const COLUMNS: [&str; 5] = ["name", "raw", "sentiment", "follow_up_needed", "tag"];

/// One output row; field order defines the CSV header
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    raw: &'a str,
    sentiment: &'a str,
    follow_up_needed: &'a str,
    tag: &'a str,
}

impl<'a> From<&'a TranscriptRecord> for CsvRow<'a> {
    fn from(record: &'a TranscriptRecord) -> Self {
        Self {
            name: &record.name,
            raw: &record.raw,
            sentiment: record.sentiment(),
            follow_up_needed: record.follow_up_needed(),
            tag: record.tag(),
        }
    }
}

/// Write every record of the table as a CSV file, creating the parent
/// directory if needed
pub fn write_table_csv(table: &TranscriptTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;

    if table.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(COLUMNS)?;
    }

    for record in &table.records {
        writer
            .serialize(CsvRow::from(record))
            .with_context(|| format!("Failed to write row for {}", record.name))?;
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, ClassificationFields};

    #[test]
    fn test_write_table_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.csv");

        let mut classified = TranscriptRecord::new("transcript_0.txt", "\nPA Agent: Hi.\n\nMember: Hello.");
        classified.classification = Classification::Classified(ClassificationFields {
            sentiment: "positive".to_string(),
            follow_up_needed: "yes".to_string(),
            tag: "claim".to_string(),
        });
        let pending = TranscriptRecord::new("transcript_1.txt", "\nplain, with comma");
        let table = TranscriptTable::with_records(dir.path(), vec![classified, pending]);

        write_table_csv(&table, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("name,raw,sentiment,follow_up_needed,tag\n"));
        assert!(written.contains("transcript_0.txt,\"\nPA Agent: Hi.\n\nMember: Hello.\",positive,yes,claim\n"));
        assert!(written.contains("transcript_1.txt,\"\nplain, with comma\",,,\n"));
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let table = TranscriptTable::new(dir.path());

        write_table_csv(&table, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "name,raw,sentiment,follow_up_needed,tag\n");
    }
}
