use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::io::quarantine_file;
use crate::llm::{build_classification_messages, parse_classification, ChatCompletion};
use crate::models::{Classification, TranscriptTable};

/// Configuration for Stage 2
#[derive(Debug, Clone)]
pub struct Stage2Config {
    /// Where source files go when their response does not parse
    pub error_dir: PathBuf,
}

/// Result of Stage 2 classification
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stage2Result {
    /// Records whose response parsed
    pub classified: usize,
    /// Records whose response did not parse (source file moved)
    pub quarantined: usize,
    /// Records whose call failed
    pub skipped: usize,
}

impl Stage2Result {
    pub fn error_count(&self) -> usize {
        self.quarantined + self.skipped
    }
}

/// Execute Stage 2: model classification
///
/// Every pending record, in table order, one call at a time:
/// 1. Send the system prompt plus the transcript
/// 2. Parse the reply as a JSON object
/// 3. On success write all three fields at once
/// 4. On a malformed reply move the source file to the error directory
///
/// Failures are confined to their record; the batch always runs to the end.
pub async fn execute_stage2<C>(
    client: &C,
    table: &mut TranscriptTable,
    config: &Stage2Config,
) -> Stage2Result
where
    C: ChatCompletion + ?Sized,
{
    let mut result = Stage2Result::default();

    let pending = table
        .records
        .iter()
        .filter(|r| r.classification.is_pending())
        .count();
    info!("Stage 2: Classifying {} transcripts", pending);

    for index in 0..table.records.len() {
        if !table.records[index].classification.is_pending() {
            continue;
        }

        let outcome = classify_record(client, table, index, config).await;

        match &outcome {
            Classification::Classified(_) => result.classified += 1,
            Classification::Quarantined { .. } => result.quarantined += 1,
            Classification::Skipped { .. } => result.skipped += 1,
            Classification::Pending => {}
        }

        table.records[index].classification = outcome;
    }

    info!("Total errors encountered: {}", result.error_count());
    result
}

/// Classify a single record and return its new state
async fn classify_record<C>(
    client: &C,
    table: &TranscriptTable,
    index: usize,
    config: &Stage2Config,
) -> Classification
where
    C: ChatCompletion + ?Sized,
{
    let record = &table.records[index];
    let messages = build_classification_messages(&record.raw);

    let response = match client.complete(&messages).await {
        Ok(response) => response,
        Err(e) => {
            if e.is_timeout() {
                error!("Inference on row {} ({}) timed out: {}", index, record.name, e);
            } else {
                error!("Error running inference on row {} ({}): {}", index, record.name, e);
            }
            return Classification::Skipped {
                reason: e.to_string(),
            };
        }
    };

    match parse_classification(&response) {
        Ok(fields) => {
            debug!(
                "Row {} ({}): sentiment={}, follow_up_needed={}, tag={}",
                index, record.name, fields.sentiment, fields.follow_up_needed, fields.tag
            );
            Classification::Classified(fields)
        }
        Err(parse_error) => {
            let source = table.source_path(record);
            match quarantine_file(&source, &config.error_dir) {
                Ok(path) => {
                    warn!(
                        "Invalid JSON response for row {} ({}) - moved {} to {:?} for further investigation",
                        index, parse_error, record.name, config.error_dir
                    );
                    Classification::Quarantined { path }
                }
                Err(e) => {
                    error!(
                        "Invalid JSON response for row {} ({}) and {} could not be moved: {:#}",
                        index, parse_error, record.name, e
                    );
                    Classification::Skipped {
                        reason: format!("{}; quarantine failed: {:#}", parse_error, e),
                    }
                }
            }
        }
    }
}
