//! End-to-end training on small boolean problems.

#![allow(clippy::unwrap_used)]

use u_lcs::data::Instances;
use u_lcs::lcs::{cross_validate, Lcs, LcsConfig};
use u_lcs::population::control::PostProcessPruner;
use u_lcs::representation::{MultiLabelRepresentation, TernaryRepresentation};
use u_lcs::update::{AccuracyUpdate, StrengthUpdate, UcsUpdate, UpdateStrategy, XcsUpdate};

/// All 64 instances of the 6-multiplexer: two address bits select one of
/// four data bits.
fn multiplexer() -> Instances {
    let rows = (0..64u32)
        .map(|v| {
            let bits: Vec<f64> = (0..6).map(|i| f64::from((v >> (5 - i)) & 1)).collect();
            let address = (bits[0] as usize) * 2 + bits[1] as usize;
            let class = bits[2 + address];
            let mut row = bits;
            row.push(class);
            row
        })
        .collect();
    Instances::new(rows, 1).unwrap()
}

fn config() -> LcsConfig {
    LcsConfig::default()
        .with_passes(200)
        .with_population_capacity(400)
        .with_callback_frequency(0)
        .with_seed(2024)
}

fn train_multiplexer<U: UpdateStrategy>(strategy: U) -> f64 {
    let data = multiplexer();
    let mut lcs = Lcs::new(config(), TernaryRepresentation::new(6, 2), strategy).unwrap();
    let result = lcs.train(&data).unwrap();
    assert_eq!(result.passes, 200);
    assert!(result.numerosity <= 400);
    assert!(result.coverings > 0);
    assert!(result.offspring > 0);

    let evaluation = lcs.evaluate(&data);
    assert_eq!(evaluation.instances, 64);
    assert!((evaluation.accuracy - evaluation.exact_match).abs() < 1e-12);
    evaluation.accuracy
}

#[test]
fn accuracy_based_learns_multiplexer() {
    let accuracy = train_multiplexer(AccuracyUpdate::default());
    assert!(accuracy >= 0.9, "training accuracy {accuracy}");
}

#[test]
fn ucs_learns_multiplexer() {
    let accuracy = train_multiplexer(UcsUpdate::default());
    assert!(accuracy >= 0.9, "training accuracy {accuracy}");
}

#[test]
fn strength_based_learns_multiplexer() {
    let accuracy = train_multiplexer(StrengthUpdate::default());
    assert!(accuracy >= 0.75, "training accuracy {accuracy}");
}

#[test]
fn xcs_learns_multiplexer() {
    let accuracy = train_multiplexer(XcsUpdate::default());
    assert!(accuracy >= 0.75, "training accuracy {accuracy}");
}

#[test]
fn pruning_keeps_population_consistent() {
    let data = multiplexer();
    let mut lcs = Lcs::new(config(), TernaryRepresentation::new(6, 2), UcsUpdate::default()).unwrap();
    lcs.train(&data).unwrap();

    let before = lcs.population().total_numerosity();
    let removed = lcs.post_process(&data, &PostProcessPruner::new(5, 0.0, 0.0));
    let after = lcs.population();
    assert_eq!(after.total_numerosity(), before - removed);
    let sum: u32 = after.iter().map(|m| m.numerosity()).sum();
    assert_eq!(sum, after.total_numerosity());
    assert!(after.iter().all(|m| m.experience() >= 5));
}

/// Three boolean attributes, label 0 = a0 and label 1 = a1.
fn two_labels() -> Instances {
    let rows = (0..8u32)
        .map(|v| {
            let a: Vec<f64> = (0..3).map(|i| f64::from((v >> i) & 1)).collect();
            vec![a[0], a[1], a[2], a[0], a[1]]
        })
        .collect();
    Instances::new(rows, 2).unwrap()
}

#[test]
fn multi_label_learns_independent_labels() {
    let data = two_labels();
    let mut lcs = Lcs::new(
        LcsConfig::default()
            .with_passes(150)
            .with_population_capacity(200)
            .with_seed(7),
        MultiLabelRepresentation::new(3, 2),
        AccuracyUpdate::default(),
    )
    .unwrap();
    lcs.train(&data).unwrap();

    let evaluation = lcs.evaluate(&data);
    assert!(evaluation.hamming_loss <= 0.2, "hamming loss {}", evaluation.hamming_loss);
    assert!(evaluation.coverage >= 0.75, "coverage {}", evaluation.coverage);
}

#[test]
fn cross_validation_runs_every_fold() {
    let data = multiplexer();
    let evaluations = cross_validate(&data, 4, 2, |fold| {
        Lcs::new(
            LcsConfig::default()
                .with_passes(20)
                .with_population_capacity(200)
                .with_seed(fold as u64),
            TernaryRepresentation::new(6, 2),
            AccuracyUpdate::default(),
        )
    })
    .unwrap();
    assert_eq!(evaluations.len(), 4);
    assert!(evaluations.iter().all(|e| e.instances == 16));
}
