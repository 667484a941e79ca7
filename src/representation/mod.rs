//! Rule representations.
//!
//! The engine never interprets chromosome bits itself. Everything it needs
//! to know about conditions and actions goes through the [`Representation`]
//! contract: matching, covering, generality, structural equality, repair,
//! correctness and classification.
//!
//! Two closed implementations ship with the crate:
//!
//! - [`TernaryRepresentation`]: boolean attributes, one class label
//! - [`MultiLabelRepresentation`]: boolean attributes, several binary labels,
//!   evaluated one label niche at a time

mod condition;
mod multilabel;
mod ternary;

pub use multilabel::MultiLabelRepresentation;
pub use ternary::TernaryRepresentation;

use crate::chromosome::BitChromosome;
use crate::data::Instances;
use rand::Rng;

/// The part of an instance's target a credit-assignment pass is about.
///
/// Single-label representations evaluate the whole action at once.
/// Multi-label representations decompose an instance into one niche per
/// label and run the update once per niche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Niche {
    /// The complete advocated action.
    Action,
    /// A single label column.
    Label(usize),
}

/// One weighted ballot in a classification vote.
#[derive(Debug, Clone, Copy)]
pub struct Vote<'a> {
    /// The voting rule.
    pub chromosome: &'a BitChromosome,
    /// Vote weight, usually exploitation value times numerosity.
    pub weight: f64,
}

/// Contract between the engine and a rule encoding.
pub trait Representation: Send + Sync {
    /// Number of bits in every chromosome of this representation.
    fn chromosome_size(&self) -> usize;

    /// Number of attribute columns this representation expects per instance.
    fn attribute_count(&self) -> usize;

    /// Number of label columns this representation expects per instance.
    fn label_count(&self) -> usize;

    /// Returns `true` if the condition encoded in `chromosome` matches the
    /// attribute vector.
    fn is_match(&self, attributes: &[f64], chromosome: &BitChromosome) -> bool;

    /// Synthesizes a chromosome that matches instance `index` and advocates
    /// its true action for `niche`.
    fn create_covering<G: Rng>(
        &self,
        instances: &Instances,
        index: usize,
        niche: Niche,
        rng: &mut G,
    ) -> BitChromosome;

    /// Returns `true` if `general` advocates the same action as `specific`
    /// and matches a strict superset of the inputs `specific` matches.
    fn is_more_general(&self, general: &BitChromosome, specific: &BitChromosome) -> bool;

    /// Structural equivalence of condition and action.
    ///
    /// Bits that carry no meaning (for example the value bit of a
    /// don't-care attribute) are ignored.
    fn are_equal(&self, a: &BitChromosome, b: &BitChromosome) -> bool;

    /// Repairs decoded values that are structurally invalid after crossover
    /// or mutation.
    fn fix_chromosome<G: Rng>(&self, chromosome: &mut BitChromosome, rng: &mut G);

    /// The niches instance `index` decomposes into for credit assignment.
    fn niches(&self, instances: &Instances, index: usize) -> Vec<Niche>;

    /// Whether the rule has an opinion about `niche` at all.
    fn advocates(&self, _chromosome: &BitChromosome, _niche: Niche) -> bool {
        true
    }

    /// Correctness predicate used to derive correct sets.
    fn is_correct(
        &self,
        chromosome: &BitChromosome,
        instances: &Instances,
        index: usize,
        niche: Niche,
    ) -> bool;

    /// Combines the votes of matching rules into predicted labels.
    ///
    /// Returns the predicted class as a one-element vector for single-label
    /// representations and the active label indices for multi-label ones.
    /// An empty ballot yields an empty prediction.
    fn classify(&self, votes: &[Vote<'_>]) -> Vec<usize>;

    /// Human-readable rendering of a rule.
    fn render(&self, chromosome: &BitChromosome) -> String;
}
