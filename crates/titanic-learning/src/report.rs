//! Classification report generation.
//!
//! A report has one row per class label plus a trailing `avg/total` row, and
//! the columns `precision`, `recall`, `f1_score` and `support`. The summary
//! row holds the unweighted mean of the three scores and the summed support.
//! Every cell is rounded to two decimals.
//!
//! Input is validated before anything touches the filesystem: a malformed
//! score tuple or a bad destination name returns an error and writes nothing.

use polars::prelude::*;
use std::path::Path;
use tracing::info;

use titanic_processing::Label;
use titanic_processing::utils::write_csv;

use crate::error::{LearningError, Result};

/// Metric column names, in report order.
pub const METRIC_NAMES: [&str; 4] = ["precision", "recall", "f1_score", "support"];

/// Row label of the summary row.
pub const SUMMARY_ROW: &str = "avg/total";

/// Name of the row-label column in the written CSV.
pub const CLASS_COLUMN: &str = "class";

/// Per-class `(precision, recall, f1, support)` sequences.
///
/// Built only through [`TryFrom`], so every tuple holds four non-empty
/// sequences of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTuple {
    precision: Vec<f64>,
    recall: Vec<f64>,
    f1: Vec<f64>,
    support: Vec<f64>,
}

impl ScoreTuple {
    /// Number of classes covered.
    pub fn len(&self) -> usize {
        self.precision.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precision.is_empty()
    }

    pub fn precision(&self) -> &[f64] {
        &self.precision
    }

    pub fn recall(&self) -> &[f64] {
        &self.recall
    }

    pub fn f1(&self) -> &[f64] {
        &self.f1
    }

    pub fn support(&self) -> &[f64] {
        &self.support
    }

    fn validate(&self) -> Result<()> {
        check_sequences([&self.precision, &self.recall, &self.f1, &self.support])
    }
}

/// Four non-empty sequences of equal length.
fn check_sequences(sequences: [&Vec<f64>; 4]) -> Result<()> {
    let len = sequences[0].len();
    if len == 0 {
        return Err(LearningError::MalformedReportInput(
            "score sequences are empty".to_string(),
        ));
    }
    if let Some((name, seq)) = METRIC_NAMES
        .iter()
        .zip(sequences)
        .find(|(_, seq)| seq.len() != len)
    {
        return Err(LearningError::MalformedReportInput(format!(
            "{} has {} values, expected {}",
            name,
            seq.len(),
            len
        )));
    }
    Ok(())
}

impl TryFrom<&[Vec<f64>]> for ScoreTuple {
    type Error = LearningError;

    /// Accepts exactly four non-empty sequences of equal length.
    fn try_from(raw: &[Vec<f64>]) -> Result<Self> {
        let [precision, recall, f1, support] = raw else {
            return Err(LearningError::MalformedReportInput(format!(
                "expected 4 sequences (precision, recall, f1, support), got {}",
                raw.len()
            )));
        };
        check_sequences([precision, recall, f1, support])?;

        Ok(Self {
            precision: precision.clone(),
            recall: recall.clone(),
            f1: f1.clone(),
            support: support.clone(),
        })
    }
}

/// Check that a report destination ends in `.csv` and has a stem.
pub fn validate_report_file_name(name: &str) -> Result<()> {
    if name.len() >= 5 && name.ends_with(".csv") {
        Ok(())
    } else {
        Err(LearningError::InvalidReportFileName(name.to_string()))
    }
}

/// One rounded report row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: f64,
}

/// Per-class metrics plus the `avg/total` summary row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    rows: Vec<ReportRow>,
}

impl ClassificationReport {
    /// Build the report; `labels` gives the class of each score position.
    pub fn new(scores: &ScoreTuple, labels: &[Label]) -> Result<Self> {
        scores.validate()?;
        if scores.len() != labels.len() {
            return Err(LearningError::MalformedReportInput(format!(
                "{} class labels for {} score rows",
                labels.len(),
                scores.len()
            )));
        }

        let mut rows: Vec<ReportRow> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| ReportRow {
                class: label.to_string(),
                precision: round2(scores.precision[i]),
                recall: round2(scores.recall[i]),
                f1_score: round2(scores.f1[i]),
                support: round2(scores.support[i]),
            })
            .collect();

        let n = scores.len() as f64;
        let mean = |values: &[f64]| values.iter().sum::<f64>() / n;
        rows.push(ReportRow {
            class: SUMMARY_ROW.to_string(),
            precision: round2(mean(&scores.precision)),
            recall: round2(mean(&scores.recall)),
            f1_score: round2(mean(&scores.f1)),
            support: round2(scores.support.iter().sum()),
        });

        Ok(Self { rows })
    }

    /// All rows, summary last.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn class_rows(&self) -> &[ReportRow] {
        &self.rows[..self.rows.len() - 1]
    }

    pub fn summary(&self) -> &ReportRow {
        &self.rows[self.rows.len() - 1]
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let class: Vec<&str> = self.rows.iter().map(|r| r.class.as_str()).collect();
        let pick = |f: fn(&ReportRow) -> f64| -> Vec<f64> { self.rows.iter().map(f).collect() };

        let columns = vec![
            Column::new(CLASS_COLUMN.into(), class),
            Column::new(METRIC_NAMES[0].into(), pick(|r| r.precision)),
            Column::new(METRIC_NAMES[1].into(), pick(|r| r.recall)),
            Column::new(METRIC_NAMES[2].into(), pick(|r| r.f1_score)),
            Column::new(METRIC_NAMES[3].into(), pick(|r| r.support)),
        ];
        Ok(DataFrame::new(columns)?)
    }
}

/// Validate, build and write a classification report CSV.
///
/// Nothing is written when validation fails.
pub fn save_classification_report(
    scores: &ScoreTuple,
    labels: &[Label],
    path: &Path,
) -> Result<ClassificationReport> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_report_file_name(&file_name)?;

    let report = ClassificationReport::new(scores, labels)?;
    let mut df = report.to_dataframe()?;
    write_csv(&mut df, path)?;

    let summary = report.summary();
    info!(
        "Wrote {} ({} classes, avg precision {:.2}, avg recall {:.2}, avg f1 {:.2})",
        path.display(),
        report.class_rows().len(),
        summary.precision,
        summary.recall,
        summary.f1_score
    );
    Ok(report)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_scores() -> Vec<Vec<f64>> {
        vec![
            vec![0.8, 0.7],
            vec![0.9, 0.5],
            vec![0.86, 0.58],
            vec![100.0, 50.0],
        ]
    }

    // =========================================================================
    // Input Validation Tests
    // =========================================================================

    #[test]
    fn test_score_tuple_requires_four_sequences() {
        let mut raw = raw_scores();
        raw.pop();
        assert!(matches!(
            ScoreTuple::try_from(raw.as_slice()),
            Err(LearningError::MalformedReportInput(_))
        ));

        let mut raw = raw_scores();
        raw.push(vec![0.1, 0.2]);
        assert!(ScoreTuple::try_from(raw.as_slice()).is_err());
    }

    #[test]
    fn test_score_tuple_requires_equal_lengths() {
        let mut raw = raw_scores();
        raw[2].push(0.3);
        let err = ScoreTuple::try_from(raw.as_slice()).unwrap_err();
        assert!(err.to_string().contains("f1_score"));
    }

    #[test]
    fn test_validate_report_file_name() {
        assert!(validate_report_file_name("class_report.csv").is_ok());
        assert!(validate_report_file_name("a.csv").is_ok());
        assert!(validate_report_file_name(".csv").is_err());
        assert!(validate_report_file_name("report.txt").is_err());
        assert!(validate_report_file_name("report").is_err());
    }

    // =========================================================================
    // Report Construction Tests
    // =========================================================================

    #[test]
    fn test_report_rows_and_summary() {
        let scores = ScoreTuple::try_from(raw_scores().as_slice()).unwrap();
        let report = ClassificationReport::new(&scores, &[0, 1]).unwrap();

        assert_eq!(report.rows().len(), 3);
        assert_eq!(report.class_rows()[1].class, "1");
        assert_eq!(
            report.summary(),
            &ReportRow {
                class: "avg/total".to_string(),
                precision: 0.75,
                recall: 0.7,
                f1_score: 0.72,
                support: 150.0,
            }
        );
    }

    #[test]
    fn test_cells_rounded_to_two_decimals() {
        let raw = vec![vec![0.123456], vec![0.98765], vec![0.5555], vec![3.0]];
        let scores = ScoreTuple::try_from(raw.as_slice()).unwrap();
        let report = ClassificationReport::new(&scores, &[1]).unwrap();

        let row = &report.rows()[0];
        assert_eq!(row.precision, 0.12);
        assert_eq!(row.recall, 0.99);
        assert_eq!(row.f1_score, 0.56);
    }

    #[test]
    fn test_label_count_must_match() {
        let scores = ScoreTuple::try_from(raw_scores().as_slice()).unwrap();
        assert!(ClassificationReport::new(&scores, &[0]).is_err());
    }

    // =========================================================================
    // File Output Tests
    // =========================================================================

    #[test]
    fn test_save_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_report.csv");
        let scores = ScoreTuple::try_from(raw_scores().as_slice()).unwrap();

        save_classification_report(&scores, &[0, 1], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "class,precision,recall,f1_score,support");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("avg/total,0.75,0.7,0.72,150"));
    }

    #[test]
    fn test_malformed_scores_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_report.csv");

        let ragged = ScoreTuple {
            precision: vec![0.8, 0.7],
            recall: vec![0.9],
            f1: vec![0.86, 0.58],
            support: vec![100.0, 50.0],
        };
        let err = save_classification_report(&ragged, &[0, 1], &path).unwrap_err();
        assert!(matches!(err, LearningError::MalformedReportInput(_)));
        assert!(!path.exists());

        let empty = ScoreTuple {
            precision: vec![],
            recall: vec![],
            f1: vec![],
            support: vec![],
        };
        let err = save_classification_report(&empty, &[], &path).unwrap_err();
        assert!(matches!(err, LearningError::MalformedReportInput(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_score_tuple_rejects_empty_sequences() {
        let raw: Vec<Vec<f64>> = vec![vec![]; 4];
        assert!(matches!(
            ScoreTuple::try_from(raw.as_slice()),
            Err(LearningError::MalformedReportInput(_))
        ));
    }

    #[test]
    fn test_bad_file_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_report.txt");
        let scores = ScoreTuple::try_from(raw_scores().as_slice()).unwrap();

        let err = save_classification_report(&scores, &[0, 1], &path).unwrap_err();
        assert!(matches!(err, LearningError::InvalidReportFileName(_)));
        assert!(!path.exists());
    }
}
