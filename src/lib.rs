//! Michigan-style learning classifier systems for supervised classification.
//!
//! A population of condition/action rules is trained incrementally against
//! labeled instances. Rules are numerosity-compressed into
//! macroclassifiers, rewarded by a pluggable credit-assignment algorithm,
//! and evolved by a steady-state GA that breeds inside niches.
//!
//! - **Chromosomes**: fixed-length bit vectors, interpreted by a
//!   [`Representation`](representation::Representation).
//! - **Populations**: [`ClassifierSet`](population::ClassifierSet) with
//!   match, correct and GA niche views, subsumption, and capacity control.
//! - **Credit assignment**: accuracy-based (AS-LCS), strength-based
//!   (SS-LCS), UCS and XCS updates behind
//!   [`UpdateStrategy`](update::UpdateStrategy).
//! - **Genetic algorithm**: tournament, roulette and best-of selection,
//!   single-point crossover, bitwise mutation.
//! - **Training**: [`Lcs`](lcs::Lcs) with observers, evaluation and
//!   parallel k-fold cross-validation.
//!
//! # Architecture
//!
//! Dependency order: chromosome → classifier → population →
//! {update, ga, population control} → training loop. Each population is
//! mutated by one thread; parallelism exists only across independent
//! populations.

pub mod chromosome;
pub mod classifier;
pub mod data;
pub mod error;
pub mod ga;
pub mod lcs;
pub mod population;
pub mod random;
pub mod representation;
pub mod update;

pub use error::{LcsError, Result};
