use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};

use crate::io::{read_labelled_csv, LabelledRow};

/// Minimum acceptable accuracy (%) unless overridden
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 85.0;

/// Accuracy of one classification column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAccuracy {
    pub column: &'static str,
    pub correct: usize,
    pub total: usize,
}

impl ColumnAccuracy {
    pub fn percent(&self) -> f64 {
        self.correct as f64 / self.total as f64 * 100.0
    }
}

/// Predictions scored against hand labels
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub columns: Vec<ColumnAccuracy>,
    pub threshold: f64,
    pub rows: usize,
}

impl EvaluationReport {
    /// Correct cells across all columns over all cells, as a percentage
    pub fn overall_percent(&self) -> f64 {
        let correct: usize = self.columns.iter().map(|c| c.correct).sum();
        let total: usize = self.columns.iter().map(|c| c.total).sum();
        correct as f64 / total as f64 * 100.0
    }

    pub fn failing_columns(&self) -> Vec<&ColumnAccuracy> {
        self.columns
            .iter()
            .filter(|c| c.percent() < self.threshold)
            .collect()
    }

    /// Every column and the overall score meet the threshold
    pub fn passed(&self) -> bool {
        self.failing_columns().is_empty() && self.overall_percent() >= self.threshold
    }
}

/// Score `predictions` against `labels`, matching rows by file name
pub fn evaluate(
    predictions: &[LabelledRow],
    labels: &[LabelledRow],
    threshold: f64,
) -> Result<EvaluationReport> {
    if labels.is_empty() {
        bail!("No labelled rows to evaluate against");
    }
    if predictions.len() != labels.len() {
        bail!(
            "Mismatch in number of rows between predictions ({}) and ground truth ({})",
            predictions.len(),
            labels.len()
        );
    }

    let mut by_name: HashMap<&str, &LabelledRow> = HashMap::with_capacity(labels.len());
    for label in labels {
        if by_name.insert(label.name.as_str(), label).is_some() {
            bail!("Duplicate ground truth row for {}", label.name);
        }
    }

    let extractors: [(&'static str, fn(&LabelledRow) -> &str); 3] = [
        ("sentiment", sentiment),
        ("follow_up_needed", follow_up_needed),
        ("tag", tag),
    ];
    let mut columns: Vec<ColumnAccuracy> = extractors
        .iter()
        .map(|(column, _)| ColumnAccuracy {
            column: *column,
            correct: 0,
            total: predictions.len(),
        })
        .collect();

    for prediction in predictions {
        let Some(label) = by_name.remove(prediction.name.as_str()) else {
            bail!("No ground truth row for {}", prediction.name);
        };
        for (accuracy, (_, extract)) in columns.iter_mut().zip(extractors.iter()) {
            if extract(prediction) == extract(label) {
                accuracy.correct += 1;
            }
        }
    }

    Ok(EvaluationReport {
        columns,
        threshold,
        rows: predictions.len(),
    })
}

fn sentiment(row: &LabelledRow) -> &str {
    &row.sentiment
}

fn follow_up_needed(row: &LabelledRow) -> &str {
    &row.follow_up_needed
}

fn tag(row: &LabelledRow) -> &str {
    &row.tag
}

/// Read both CSV files and score them
pub fn evaluate_files(predictions: &Path, labels: &Path, threshold: f64) -> Result<EvaluationReport> {
    let predictions = read_labelled_csv(predictions)?;
    let labels = read_labelled_csv(labels)?;
    evaluate(&predictions, &labels, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, sentiment: &str, follow_up: &str, tag: &str) -> LabelledRow {
        LabelledRow {
            name: name.to_string(),
            sentiment: sentiment.to_string(),
            follow_up_needed: follow_up.to_string(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn test_perfect_predictions_pass() {
        let labels = vec![
            row("a", "positive", "no", "claim"),
            row("b", "negative", "yes", "tech"),
        ];
        let report = evaluate(&labels, &labels, DEFAULT_ACCURACY_THRESHOLD).unwrap();
        assert!(report.passed());
        assert_eq!(report.overall_percent(), 100.0);
    }

    #[test]
    fn test_rows_matched_by_name_not_position() {
        let labels = vec![
            row("a", "positive", "no", "claim"),
            row("b", "negative", "yes", "tech"),
        ];
        let predictions = vec![
            row("b", "negative", "yes", "tech"),
            row("a", "positive", "no", "claim"),
        ];
        let report = evaluate(&predictions, &labels, 100.0).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_column_below_threshold_fails() {
        let labels = vec![
            row("a", "positive", "no", "claim"),
            row("b", "negative", "yes", "tech"),
            row("c", "neutral", "no", "policy"),
            row("d", "neutral", "yes", "other"),
        ];
        let predictions = vec![
            row("a", "positive", "no", "claim"),
            row("b", "negative", "yes", "claim"),
            row("c", "neutral", "no", "claim"),
            row("d", "neutral", "yes", "other"),
        ];

        let report = evaluate(&predictions, &labels, DEFAULT_ACCURACY_THRESHOLD).unwrap();

        assert_eq!(report.columns[0].percent(), 100.0);
        assert_eq!(report.columns[2].column, "tag");
        assert_eq!(report.columns[2].percent(), 50.0);
        let failing = report.failing_columns();
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].column, "tag");
        // 10 of 12 cells
        assert!((report.overall_percent() - 83.333).abs() < 0.01);
        assert!(!report.passed());
    }

    #[test]
    fn test_row_count_mismatch_is_an_error() {
        let labels = vec![row("a", "", "", ""), row("b", "", "", "")];
        let predictions = vec![row("a", "", "", "")];
        assert!(evaluate(&predictions, &labels, 85.0).is_err());
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let labels = vec![row("a", "", "", "")];
        let predictions = vec![row("z", "", "", "")];
        assert!(evaluate(&predictions, &labels, 85.0).is_err());
    }

    #[test]
    fn test_empty_tables_are_an_error() {
        assert!(evaluate(&[], &[], 85.0).is_err());
    }

    #[test]
    fn test_evaluate_files() {
        let dir = tempfile::tempdir().unwrap();
        let predictions = dir.path().join("predictions.csv");
        let labels = dir.path().join("labels.csv");
        std::fs::write(
            &predictions,
            "name,raw,sentiment,follow_up_needed,tag\ntranscript_0.txt,\"\nhi\",positive,yes,claim\n",
        )
        .unwrap();
        std::fs::write(
            &labels,
            "name,sentiment,follow_up_needed,tag\ntranscript_0.txt,positive,yes,claim\n",
        )
        .unwrap();

        let report = evaluate_files(&predictions, &labels, 85.0).unwrap();
        assert_eq!(report.rows, 1);
        assert!(report.passed());
    }
}
