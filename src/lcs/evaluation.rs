//! Classification quality and k-fold cross-validation.

use super::runner::Lcs;
use crate::data::Instances;
use crate::error::{LcsError, Result};
use crate::representation::Representation;
use crate::update::UpdateStrategy;
use std::sync::Mutex;

/// Classification quality over a set of instances.
///
/// Predictions and targets are compared as label sets. A single-label
/// target is the one-element set holding its class.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Mean Jaccard similarity of predicted and actual label sets.
    pub accuracy: f64,
    /// Fraction of instances predicted exactly.
    pub exact_match: f64,
    /// Mean fraction of wrong label decisions.
    pub hamming_loss: f64,
    /// Fraction of instances matched by at least one rule.
    pub coverage: f64,
    /// Number of instances evaluated.
    pub instances: usize,
}

impl Evaluation {
    /// Instance-weighted mean of several evaluations.
    pub fn mean(evaluations: &[Evaluation]) -> Evaluation {
        let total: usize = evaluations.iter().map(|e| e.instances).sum();
        if total == 0 {
            return Evaluation::default();
        }
        let weighted = |f: fn(&Evaluation) -> f64| {
            evaluations
                .iter()
                .map(|e| f(e) * e.instances as f64)
                .sum::<f64>()
                / total as f64
        };
        Evaluation {
            accuracy: weighted(|e| e.accuracy),
            exact_match: weighted(|e| e.exact_match),
            hamming_loss: weighted(|e| e.hamming_loss),
            coverage: weighted(|e| e.coverage),
            instances: total,
        }
    }
}

/// Running sums behind an [`Evaluation`].
#[derive(Debug, Clone)]
pub(crate) struct Tally {
    label_count: usize,
    instances: usize,
    jaccard: f64,
    exact: usize,
    hamming: f64,
    covered: usize,
}

impl Tally {
    /// `label_count` of 1 means single-label classification.
    pub(crate) fn new(label_count: usize) -> Self {
        Self {
            label_count,
            instances: 0,
            jaccard: 0.0,
            exact: 0,
            hamming: 0.0,
            covered: 0,
        }
    }

    pub(crate) fn record(&mut self, predicted: &[usize], actual: &[usize], covered: bool) {
        let mut predicted = predicted.to_vec();
        let mut actual = actual.to_vec();
        predicted.sort_unstable();
        predicted.dedup();
        actual.sort_unstable();
        actual.dedup();

        let common = predicted.iter().filter(|l| actual.contains(l)).count();
        let union = predicted.len() + actual.len() - common;
        let differing = union - common;

        self.instances += 1;
        self.jaccard += if union == 0 {
            1.0
        } else {
            common as f64 / union as f64
        };
        if differing == 0 {
            self.exact += 1;
        }
        self.hamming += if self.label_count <= 1 {
            if differing == 0 {
                0.0
            } else {
                1.0
            }
        } else {
            differing as f64 / self.label_count as f64
        };
        if covered {
            self.covered += 1;
        }
    }

    pub(crate) fn finish(self) -> Evaluation {
        if self.instances == 0 {
            return Evaluation::default();
        }
        let n = self.instances as f64;
        Evaluation {
            accuracy: self.jaccard / n,
            exact_match: self.exact as f64 / n,
            hamming_loss: self.hamming / n,
            coverage: self.covered as f64 / n,
            instances: self.instances,
        }
    }
}

/// k-fold cross-validation.
///
/// `build(fold)` creates a fresh, untrained [`Lcs`] for each fold. Each fold
/// is trained on its training part and evaluated on its held-out part.
/// With the `parallel` feature the folds run on a pool of `workers`
/// threads; each worker owns its `Lcs` and only the final evaluations are
/// shared. Returns one evaluation per fold, in fold order.
///
/// # Errors
/// Fails if `folds` or `workers` is invalid, the pool cannot be built, or a
/// fold fails to build or train.
pub fn cross_validate<R, U, F>(
    instances: &Instances,
    folds: usize,
    workers: usize,
    build: F,
) -> Result<Vec<Evaluation>>
where
    R: Representation,
    U: UpdateStrategy,
    F: Fn(usize) -> Result<Lcs<R, U>> + Sync,
{
    if workers == 0 {
        return Err(LcsError::InvalidConfig("workers must be at least 1".into()));
    }
    let splits = instances.folds(folds)?;
    let results: Mutex<Vec<(usize, Evaluation)>> = Mutex::new(Vec::with_capacity(folds));

    let run_fold = |fold: usize, (train, test): &(Instances, Instances)| -> Result<()> {
        let mut lcs = build(fold)?;
        lcs.train(train)?;
        let evaluation = lcs.evaluate(test);
        log::debug!(
            "fold {fold}: accuracy {:.4}, exact match {:.4}",
            evaluation.accuracy,
            evaluation.exact_match
        );
        results
            .lock()
            .map_err(|_| LcsError::WorkerPool("results collector poisoned".into()))?
            .push((fold, evaluation));
        Ok(())
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| LcsError::WorkerPool(e.to_string()))?;
        pool.install(|| {
            splits
                .par_iter()
                .enumerate()
                .try_for_each(|(fold, split)| run_fold(fold, split))
        })?;
    }

    #[cfg(not(feature = "parallel"))]
    for (fold, split) in splits.iter().enumerate() {
        run_fold(fold, split)?;
    }

    let mut results = results
        .into_inner()
        .map_err(|_| LcsError::WorkerPool("results collector poisoned".into()))?;
    results.sort_by_key(|&(fold, _)| fold);
    let evaluations: Vec<Evaluation> = results.into_iter().map(|(_, e)| e).collect();

    let mean = Evaluation::mean(&evaluations);
    log::info!(
        "{folds}-fold cross-validation: accuracy {:.4}, exact match {:.4}, coverage {:.4}",
        mean.accuracy,
        mean.exact_match,
        mean.coverage
    );
    Ok(evaluations)
}
