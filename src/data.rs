//! Labeled instance arrays.
//!
//! An [`Instances`] value is the immutable training or evaluation matrix the
//! engine consumes. Each row holds the attribute values followed by
//! `label_count` label columns.
//!
//! Every array receives a unique generation stamp when it is built.
//! Classifiers key their match caches by this stamp, so swapping the
//! training array for a test array can never serve a stale cached result.

use crate::error::{LcsError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Immutable labeled data set.
#[derive(Debug, Clone)]
pub struct Instances {
    rows: Vec<Vec<f64>>,
    label_count: usize,
    generation: u64,
}

impl Instances {
    /// Builds an instance array, validating its shape.
    ///
    /// Every row must have the same width, and that width must exceed
    /// `label_count` so at least one attribute remains.
    pub fn new(rows: Vec<Vec<f64>>, label_count: usize) -> Result<Self> {
        if label_count == 0 {
            return Err(LcsError::InvalidInstances(
                "label_count must be at least 1".into(),
            ));
        }
        if let Some(first) = rows.first() {
            let width = first.len();
            if width <= label_count {
                return Err(LcsError::InvalidInstances(format!(
                    "rows have {width} columns but {label_count} are labels"
                )));
            }
            if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
                return Err(LcsError::InvalidInstances(format!(
                    "row {i} has {} columns, expected {width}",
                    row.len()
                )));
            }
        }
        Ok(Self {
            rows,
            label_count,
            generation: next_generation(),
        })
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the array holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of label columns.
    pub fn label_count(&self) -> usize {
        self.label_count
    }

    /// Number of attribute columns (0 for an empty array).
    pub fn attribute_count(&self) -> usize {
        self.rows
            .first()
            .map_or(0, |r| r.len() - self.label_count)
    }

    /// Generation stamp of this array.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Full row, labels included.
    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    /// Attribute part of a row.
    pub fn attributes(&self, index: usize) -> &[f64] {
        let row = &self.rows[index];
        &row[..row.len() - self.label_count]
    }

    /// Label part of a row.
    pub fn labels(&self, index: usize) -> &[f64] {
        let row = &self.rows[index];
        &row[row.len() - self.label_count..]
    }

    /// The first label column read as a class index.
    ///
    /// Negative or non-finite values read as class 0.
    pub fn label(&self, index: usize) -> usize {
        let value = self.labels(index)[0];
        if value.is_finite() && value > 0.0 {
            value.round() as usize
        } else {
            0
        }
    }

    /// Whether label column `label` is active (value above 0.5).
    pub fn is_label_active(&self, index: usize, label: usize) -> bool {
        self.labels(index)[label] > 0.5
    }

    /// Indices of the active label columns of a row.
    pub fn active_labels(&self, index: usize) -> Vec<usize> {
        (0..self.label_count)
            .filter(|&l| self.is_label_active(index, l))
            .collect()
    }

    /// Builds a new array from a subset of rows.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            label_count: self.label_count,
            generation: next_generation(),
        }
    }

    /// Splits the rows into `k` interleaved folds.
    ///
    /// Returns `(train, test)` pairs; fold `i` tests on every row whose
    /// index is congruent to `i` modulo `k`.
    pub fn folds(&self, k: usize) -> Result<Vec<(Instances, Instances)>> {
        if k < 2 || k > self.len() {
            return Err(LcsError::InvalidConfig(format!(
                "cannot split {} instances into {k} folds",
                self.len()
            )));
        }
        Ok((0..k)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..self.len()).partition(|i| i % k == fold);
                (self.subset(&train), self.subset(&test))
            })
            .collect())
    }
}
