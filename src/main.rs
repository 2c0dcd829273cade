use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use calltag::{
    evaluate_files, execute_stage1, run_pipeline, HuggingFaceClient, HuggingFaceConfig,
    PipelineConfig, DEFAULT_ACCURACY_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "calltag")]
#[command(author, version, about = "Call transcript classification pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every transcript in a folder and write the results table
    Run {
        /// Folder containing transcript_<id>.txt files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Output CSV file
        #[arg(short, long, default_value = "output/transcripts_with_inference.csv")]
        output: PathBuf,

        /// Folder receiving transcripts whose model reply could not be parsed
        #[arg(short, long, default_value = "error")]
        error_dir: PathBuf,

        /// Model repository id (defaults to Mistral-Nemo-Instruct)
        #[arg(long)]
        model: Option<String>,

        /// Per-call timeout in seconds
        #[arg(long, default_value = "120", value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Load and normalize transcripts without calling the model
    Inspect {
        /// Folder containing transcript_<id>.txt files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Score a results table against a hand-labelled one
    Evaluate {
        /// CSV written by `run`
        #[arg(short, long)]
        predictions: PathBuf,

        /// CSV with the expected sentiment, follow_up_needed and tag
        #[arg(short, long)]
        labels: PathBuf,

        /// Minimum accuracy (%) per column and overall
        #[arg(long, default_value_t = DEFAULT_ACCURACY_THRESHOLD)]
        threshold: f64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data_dir,
            output,
            error_dir,
            model,
            timeout_secs,
            verbose,
        } => {
            setup_logging(verbose);
            run(data_dir, output, error_dir, model, timeout_secs).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect { data_dir, verbose } => {
            setup_logging(verbose);
            inspect(data_dir)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Evaluate {
            predictions,
            labels,
            threshold,
            verbose,
        } => {
            setup_logging(verbose);
            evaluate(predictions, labels, threshold)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run(
    data_dir: PathBuf,
    output: PathBuf,
    error_dir: PathBuf,
    model: Option<String>,
    timeout_secs: u64,
) -> Result<()> {
    // Credentials are checked before any file is touched
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }
    let mut api_config = HuggingFaceConfig::from_env()?
        .with_timeout(Duration::from_secs(timeout_secs));
    if let Some(model) = model {
        api_config = api_config.with_model(model);
    }
    let client =
        HuggingFaceClient::new(api_config).context("Failed to build inference client")?;
    info!(
        "Using model {} (timeout {:?})",
        client.config().model,
        client.config().timeout
    );

    let config = PipelineConfig {
        data_dir,
        output,
        error_dir,
    };
    let result = run_pipeline(&client, &config).await?;

    info!(
        "Complete: {} rows, {} classified, {} quarantined, {} skipped, {} unreadable",
        result.rows,
        result.classification.classified,
        result.classification.quarantined,
        result.classification.skipped,
        result.unreadable.len()
    );
    info!("Inference results saved to {:?}", result.output_path);

    Ok(())
}

fn inspect(data_dir: PathBuf) -> Result<()> {
    info!("Inspecting transcripts in {:?}", data_dir);
    let loaded = execute_stage1(&data_dir).context("Failed to load transcripts")?;

    println!("Transcript Inspection");
    println!("=====================");
    println!("Loaded: {}", loaded.table.len());
    println!("Unreadable: {}", loaded.unreadable.len());
    for name in &loaded.unreadable {
        println!("  - {}", name);
    }
    println!();

    for record in &loaded.table.records {
        let turns = record.raw.matches("\n\n").count() + 1;
        println!(
            "{}: {} chars, {} turns",
            record.name,
            record.raw.chars().count(),
            turns
        );
    }

    Ok(())
}

fn evaluate(predictions: PathBuf, labels: PathBuf, threshold: f64) -> Result<ExitCode> {
    let report = evaluate_files(&predictions, &labels, threshold)?;

    println!("Model Accuracy ({} rows)", report.rows);
    println!("==============");
    for column in &report.columns {
        println!(
            "{}: {:.2}% ({}/{})",
            column.column,
            column.percent(),
            column.correct,
            column.total
        );
    }
    println!("overall: {:.2}%", report.overall_percent());
    println!();

    if report.passed() {
        println!("PASS (threshold {:.0}%)", report.threshold);
        Ok(ExitCode::SUCCESS)
    } else {
        for column in report.failing_columns() {
            println!(
                "Accuracy for {} is below threshold: {:.2}%",
                column.column,
                column.percent()
            );
        }
        if report.overall_percent() < report.threshold {
            println!(
                "Overall accuracy is below threshold: {:.2}%",
                report.overall_percent()
            );
        }
        Ok(ExitCode::FAILURE)
    }
}
