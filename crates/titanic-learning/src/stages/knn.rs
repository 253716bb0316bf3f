use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use titanic_processing::Label;

use super::check_width;
use crate::error::{LearningError, Result};

/// k-nearest-neighbours classifier with Euclidean distance and uniform votes.
///
/// Ties are broken deterministically: among equidistant training rows the
/// earlier row wins a neighbour slot, and a tied vote goes to the smallest
/// class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnClassifier {
    n_neighbors: usize,
    train: Vec<Vec<f64>>,
    labels: Vec<Label>,
    classes: Vec<Label>,
}

impl KnnClassifier {
    /// Store the training rows. `k` larger than the row count uses every row.
    pub fn fit(n_neighbors: usize, rows: &[Vec<f64>], labels: &[Label]) -> Result<Self> {
        if n_neighbors == 0 {
            return Err(LearningError::InvalidConfig(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if rows.is_empty() {
            return Err(LearningError::InvalidData(
                "cannot fit classifier on zero rows".to_string(),
            ));
        }
        if rows.len() != labels.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        check_width(rows, rows[0].len(), "classifier")?;

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        Ok(Self {
            n_neighbors,
            train: rows.to_vec(),
            labels: labels.to_vec(),
            classes,
        })
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Distinct training labels, ascending.
    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.train.first().map_or(0, Vec::len)
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Label>> {
        if self.train.is_empty() || self.train.len() != self.labels.len() {
            return Err(LearningError::NotFitted("knn"));
        }
        check_width(rows, self.n_features(), "classifier")?;

        rows.iter()
            .map(|row| self.predict_one(row))
            .collect::<Option<Vec<_>>>()
            .ok_or(LearningError::NotFitted("knn"))
    }

    fn predict_one(&self, row: &[f64]) -> Option<Label> {
        let mut neighbors: Vec<(f64, usize)> = self
            .train
            .iter()
            .enumerate()
            .map(|(idx, train_row)| (squared_distance(row, train_row), idx))
            .collect();
        // Stable sort keeps training order among equal distances
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k = self.n_neighbors.min(neighbors.len());
        let mut votes: BTreeMap<Label, usize> = BTreeMap::new();
        for &(_, idx) in &neighbors[..k] {
            *votes.entry(self.labels[idx]).or_default() += 1;
        }

        // Ascending iteration; only a strictly larger count replaces the leader
        votes
            .into_iter()
            .fold(None, |best: Option<(Label, usize)>, (label, count)| match best {
                Some((_, leader)) if leader >= count => best,
                _ => Some((label, count)),
            })
            .map(|(label, _)| label)
    }
}

/// Squared Euclidean distance; ranks neighbours the same as the true distance.
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_majority_vote() {
        let rows = vec![vec![0.0], vec![0.1], vec![0.2], vec![5.0], vec![5.1]];
        let labels = vec![0, 0, 0, 1, 1];
        let knn = KnnClassifier::fit(3, &rows, &labels).unwrap();

        assert_eq!(knn.classes(), &[0, 1]);
        assert_eq!(knn.predict(&[vec![0.05], vec![5.05]]).unwrap(), vec![0, 1]);

        // Every row votes: three zeros outweigh the two nearby ones
        let knn = KnnClassifier::fit(5, &rows, &labels).unwrap();
        assert_eq!(knn.predict(&[vec![0.05], vec![5.05]]).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_vote_tie_goes_to_smallest_label() {
        let rows = vec![vec![-1.0], vec![1.0]];
        let knn = KnnClassifier::fit(2, &rows, &[1, 0]).unwrap();
        assert_eq!(knn.predict(&[vec![0.0]]).unwrap(), vec![0]);
    }

    #[test]
    fn test_distance_tie_keeps_training_order() {
        // Both candidates are at distance 1; k = 1 picks the earlier row
        let rows = vec![vec![1.0], vec![-1.0], vec![10.0]];
        let knn = KnnClassifier::fit(1, &rows, &[1, 0, 0]).unwrap();
        assert_eq!(knn.predict(&[vec![0.0]]).unwrap(), vec![1]);

        let knn = KnnClassifier::fit(1, &[vec![-1.0], vec![1.0]], &[0, 1]).unwrap();
        assert_eq!(knn.predict(&[vec![0.0]]).unwrap(), vec![0]);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0]];
        let knn = KnnClassifier::fit(7, &rows, &[1, 1, 0]).unwrap();
        assert_eq!(knn.predict(&[vec![100.0]]).unwrap(), vec![1]);
    }

    #[test]
    fn test_fit_validation() {
        assert!(matches!(
            KnnClassifier::fit(0, &[vec![1.0]], &[0]),
            Err(LearningError::InvalidConfig(_))
        ));
        assert!(matches!(
            KnnClassifier::fit(3, &[vec![1.0]], &[0, 1]),
            Err(LearningError::InvalidData(_))
        ));
        assert!(matches!(
            KnnClassifier::fit(3, &[vec![1.0], vec![1.0, 2.0]], &[0, 1]),
            Err(LearningError::InvalidData(_))
        ));
    }

    #[test]
    fn test_predict_width_mismatch() {
        let knn = KnnClassifier::fit(1, &[vec![1.0, 2.0]], &[0]).unwrap();
        assert!(knn.predict(&[vec![1.0]]).is_err());
    }
}
