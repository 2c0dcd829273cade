use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The three attributes derived from a model response.
///
/// Always written together from a single parsed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationFields {
    /// `positive`, `negative` or `neutral`
    pub sentiment: String,
    /// `yes` or `no`
    pub follow_up_needed: String,
    /// `claim`, `policy`, `tech`, `pre-auth` or `other`
    pub tag: String,
}

/// Where a record is in the classification lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Loaded, not yet sent to the model
    Pending,
    /// Model response parsed successfully
    Classified(ClassificationFields),
    /// Response did not parse; the source file was moved to `path`
    Quarantined { path: PathBuf },
    /// Remote call failed (or the quarantine move did)
    Skipped { reason: String },
}

impl Classification {
    pub fn is_pending(&self) -> bool {
        matches!(self, Classification::Pending)
    }

    pub fn fields(&self) -> Option<&ClassificationFields> {
        match self {
            Classification::Classified(fields) => Some(fields),
            _ => None,
        }
    }
}

/// One row per source transcript file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRecord {
    /// File name, unique within a run
    pub name: String,
    /// Normalized transcript text
    pub raw: String,
    pub classification: Classification,
}

impl TranscriptRecord {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            classification: Classification::Pending,
        }
    }

    pub fn sentiment(&self) -> &str {
        self.classification
            .fields()
            .map(|f| f.sentiment.as_str())
            .unwrap_or("")
    }

    pub fn follow_up_needed(&self) -> &str {
        self.classification
            .fields()
            .map(|f| f.follow_up_needed.as_str())
            .unwrap_or("")
    }

    pub fn tag(&self) -> &str {
        self.classification
            .fields()
            .map(|f| f.tag.as_str())
            .unwrap_or("")
    }
}

/// Ordered collection of records loaded from one directory.
///
/// Row order is the directory listing order at load time and is only
/// meaningful for traceability.
#[derive(Debug, Clone)]
pub struct TranscriptTable {
    /// Directory the records were loaded from
    pub source_dir: PathBuf,
    pub records: Vec<TranscriptRecord>,
}

impl TranscriptTable {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            records: Vec::new(),
        }
    }

    pub fn with_records(source_dir: impl Into<PathBuf>, records: Vec<TranscriptRecord>) -> Self {
        Self {
            source_dir: source_dir.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the file a record was loaded from
    pub fn source_path(&self, record: &TranscriptRecord) -> PathBuf {
        self.source_dir.join(&record.name)
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Count of records in each lifecycle state
    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for record in &self.records {
            match record.classification {
                Classification::Pending => counts.pending += 1,
                Classification::Classified(_) => counts.classified += 1,
                Classification::Quarantined { .. } => counts.quarantined += 1,
                Classification::Skipped { .. } => counts.skipped += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub pending: usize,
    pub classified: usize,
    pub quarantined: usize,
    pub skipped: usize,
}
