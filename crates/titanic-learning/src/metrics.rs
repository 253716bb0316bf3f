//! Classification metrics.

use titanic_processing::Label;

use crate::error::{LearningError, Result};
use crate::report::ScoreTuple;

/// Per-class precision, recall, F1 and support.
///
/// Scores are reported for `labels` in the given order. A zero denominator
/// yields 0.0 instead of an error.
pub fn precision_recall_fscore_support(
    y_true: &[Label],
    y_pred: &[Label],
    labels: &[Label],
) -> Result<ScoreTuple> {
    if y_true.len() != y_pred.len() {
        return Err(LearningError::InvalidData(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }

    let mut raw = vec![Vec::with_capacity(labels.len()); 4];
    for &label in labels {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            match (truth == label, pred == label) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        raw[0].push(precision);
        raw[1].push(recall);
        raw[2].push(f1);
        raw[3].push((tp + fn_) as f64);
    }

    ScoreTuple::try_from(raw.as_slice())
}

/// Fraction of predictions equal to the true label.
pub fn accuracy(y_true: &[Label], y_pred: &[Label]) -> f64 {
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    ratio(correct, y_true.len())
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_binary_scores() {
        let y_true = [0, 0, 0, 1, 1, 1, 1];
        let y_pred = [0, 0, 1, 1, 1, 0, 1];
        let scores = precision_recall_fscore_support(&y_true, &y_pred, &[0, 1]).unwrap();

        // class 0: tp 2, fp 1, fn 1
        assert!((scores.precision()[0] - 2.0 / 3.0).abs() < EPS);
        assert!((scores.recall()[0] - 2.0 / 3.0).abs() < EPS);
        // class 1: tp 3, fp 1, fn 1
        assert!((scores.precision()[1] - 0.75).abs() < EPS);
        assert!((scores.f1()[1] - 0.75).abs() < EPS);
        assert_eq!(scores.support(), &[3.0, 4.0]);
    }

    #[test]
    fn test_zero_division_yields_zero() {
        // class 1 is never predicted
        let scores = precision_recall_fscore_support(&[0, 1, 1], &[0, 0, 0], &[0, 1]).unwrap();
        assert_eq!(scores.precision()[1], 0.0);
        assert_eq!(scores.recall()[1], 0.0);
        assert_eq!(scores.f1()[1], 0.0);
        assert_eq!(scores.support()[1], 2.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(precision_recall_fscore_support(&[0, 1], &[0], &[0, 1]).is_err());
    }

    #[test]
    fn test_accuracy() {
        assert!((accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]) - 0.75).abs() < EPS);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
