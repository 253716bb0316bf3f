//! Seeded, stratified train/holdout split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use tracing::debug;

use titanic_processing::Label;

use crate::error::{LearningError, Result};

/// Row indices of the two sides of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldoutSplit {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Split row indices into train and holdout sets, preserving class proportions.
///
/// The holdout receives `ceil(test_size * n)` rows. Each class contributes in
/// proportion to its share of `labels`; leftover rows go to the classes with
/// the largest fractional share. The same inputs and seed always produce the
/// same split.
pub fn stratified_split(labels: &[Label], test_size: f64, seed: u64) -> Result<HoldoutSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(LearningError::InvalidConfig(format!(
            "test_size must be between 0.0 and 1.0 (exclusive), got {}",
            test_size
        )));
    }

    let n = labels.len();
    let n_holdout = (test_size * n as f64).ceil() as usize;
    if n_holdout == 0 || n_holdout >= n {
        return Err(LearningError::InvalidData(format!(
            "cannot hold out {} of {} rows",
            n_holdout, n
        )));
    }

    let mut by_class: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(idx);
    }

    let allocation = allocate(&by_class, n, n_holdout);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_holdout);
    let mut holdout = Vec::with_capacity(n_holdout);

    for ((label, indices), take) in by_class.iter_mut().zip(allocation) {
        indices.shuffle(&mut rng);
        debug!("Class {}: {} holdout of {}", label, take, indices.len());
        holdout.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }

    // Interleave the classes
    train.shuffle(&mut rng);
    holdout.shuffle(&mut rng);

    Ok(HoldoutSplit { train, holdout })
}

/// Largest-remainder allocation of `n_holdout` rows across classes.
///
/// Returned counts follow the key order of `by_class`.
fn allocate(by_class: &BTreeMap<Label, Vec<usize>>, n: usize, n_holdout: usize) -> Vec<usize> {
    let quotas: Vec<f64> = by_class
        .values()
        .map(|indices| (n_holdout * indices.len()) as f64 / n as f64)
        .collect();

    let mut counts: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();
    let mut remaining = n_holdout - counts.iter().sum::<usize>();

    // Larger remainder first; ties go to the larger class, then the smaller label
    let mut order: Vec<usize> = (0..quotas.len()).collect();
    let sizes: Vec<usize> = by_class.values().map(Vec::len).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra)
            .then(sizes[b].cmp(&sizes[a]))
            .then(a.cmp(&b))
    });

    for idx in order {
        if remaining == 0 {
            break;
        }
        if counts[idx] < sizes[idx] {
            counts[idx] += 1;
            remaining -= 1;
        }
    }

    counts
}
