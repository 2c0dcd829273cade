pub mod evaluate;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use evaluate::{evaluate, evaluate_files, EvaluationReport, DEFAULT_ACCURACY_THRESHOLD};
pub use io::{read_labelled_csv, write_table_csv, LabelledRow};
pub use llm::{ChatCompletion, HuggingFaceClient, HuggingFaceConfig, InferenceError};
pub use models::{
    ChatMessage, Classification, ClassificationFields, Role, TranscriptRecord, TranscriptTable,
};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineResult};
pub use stages::{
    execute_stage1, execute_stage2, execute_stage3, normalize, Stage1Result, Stage2Config,
    Stage2Result, Stage3Result,
};
