use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::llm::ChatCompletion;
use crate::stages::{execute_stage1, execute_stage2, execute_stage3, Stage2Config, Stage2Result};

/// Locations used by one batch run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder holding `transcript_*.txt` files
    pub data_dir: PathBuf,
    /// CSV file written at the end of the run
    pub output: PathBuf,
    /// Folder receiving transcripts whose reply did not parse
    pub error_dir: PathBuf,
}

/// Summary of one batch run
#[derive(Debug)]
pub struct PipelineResult {
    pub rows: usize,
    pub unreadable: Vec<String>,
    pub classification: Stage2Result,
    pub output_path: PathBuf,
}

/// Load, classify and persist every transcript in `config.data_dir`
pub async fn run_pipeline<C>(client: &C, config: &PipelineConfig) -> Result<PipelineResult>
where
    C: ChatCompletion + ?Sized,
{
    info!("Stage 1: Loading transcripts from {:?}", config.data_dir);
    let loaded = execute_stage1(&config.data_dir)?;
    let mut table = loaded.table;

    let stage2_config = Stage2Config {
        error_dir: config.error_dir.clone(),
    };
    let classification = execute_stage2(client, &mut table, &stage2_config).await;

    info!("Stage 3: Rendering output...");
    let rendered = execute_stage3(&table, &config.output)?;

    Ok(PipelineResult {
        rows: rendered.rows,
        unreadable: loaded.unreadable,
        classification,
        output_path: rendered.output_path,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::io::read_labelled_csv;
    use crate::llm::InferenceError;
    use crate::models::ChatMessage;

    /// Answers every transcript mentioning "Welcome" with a claim, anything else with prose
    struct KeywordCompletion;

    #[async_trait]
    impl ChatCompletion for KeywordCompletion {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, InferenceError> {
            if messages[1].content.contains("Welcome") {
                Ok(r#"{"sentiment":"positive","follow_up_needed":"yes","tag":"claim"}"#.to_string())
            } else {
                Ok("I think the member was unhappy.".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("transcript_0.txt"),
            "PA Agent: Welcome. Member: Thank you.",
        )
        .unwrap();
        std::fs::write(data_dir.join("transcript_1.txt"), "Member: This is useless.").unwrap();
        std::fs::write(data_dir.join("notes.txt"), "Welcome").unwrap();

        let config = PipelineConfig {
            data_dir: data_dir.clone(),
            output: dir.path().join("output").join("transcripts_with_inference.csv"),
            error_dir: dir.path().join("error"),
        };

        let result = run_pipeline(&KeywordCompletion, &config).await.unwrap();

        assert_eq!(result.rows, 2);
        assert_eq!(result.classification.classified, 1);
        assert_eq!(result.classification.quarantined, 1);
        assert!(!data_dir.join("transcript_1.txt").exists());
        assert!(dir.path().join("error").join("transcript_1.txt").exists());
        assert!(data_dir.join("transcript_0.txt").exists());

        let rows = read_labelled_csv(&result.output_path).unwrap();
        assert_eq!(rows.len(), 2);
        let welcome = rows.iter().find(|r| r.name == "transcript_0.txt").unwrap();
        assert_eq!(welcome.sentiment, "positive");
        assert_eq!(welcome.follow_up_needed, "yes");
        assert_eq!(welcome.tag, "claim");
        let useless = rows.iter().find(|r| r.name == "transcript_1.txt").unwrap();
        assert_eq!(useless.sentiment, "");
        assert_eq!(useless.tag, "");

        let written = std::fs::read_to_string(&result.output_path).unwrap();
        assert!(written.contains(
            "transcript_0.txt,\"\nPA Agent: Welcome. \n\nMember: Thank you.\",positive,yes,claim"
        ));
    }

    #[tokio::test]
    async fn test_missing_data_dir_fails_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            data_dir: dir.path().join("missing"),
            output: dir.path().join("out.csv"),
            error_dir: dir.path().join("error"),
        };

        assert!(run_pipeline(&KeywordCompletion, &config).await.is_err());
        assert!(!config.output.exists());
    }
}
