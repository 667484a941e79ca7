//! Credit assignment.
//!
//! An [`UpdateStrategy`] owns the credit-assignment algorithm of an LCS: it
//! creates per-classifier statistics, updates them after every instance,
//! recomputes fitness, decides subsumption eligibility, and answers
//! comparison-value queries for selection and deletion.
//!
//! The shared part of an update step (niche decomposition, covering and GA
//! invocation) is the provided method [`UpdateStrategy::update_set`].
//! Each strategy only implements the statistics of its algorithm:
//!
//! | Strategy | Family | Fitness |
//! |---|---|---|
//! | [`AccuracyUpdate`] | AS-LCS | `(tp / msa)^n` |
//! | [`StrengthUpdate`] | SS-LCS | `strength / msa` |
//! | [`UcsUpdate`] | UCS | relative accuracy in the correct set |
//! | [`XcsUpdate`] | XCS | relative prediction accuracy in the action set |
//!
//! # References
//!
//! - Wilson (1995), "Classifier Fitness Based on Accuracy"
//! - Butz & Wilson (2001), "An Algorithmic Description of XCS"
//! - Bernadó-Mansilla & Garrell-Guiu (2003), "Accuracy-Based Learning
//!   Classifier Systems: Models, Analysis and Applications to Classification
//!   Tasks"
//! - Tzima & Mitkas (2010), "Strength-Based Learning Classifier Systems
//!   Revisited"

mod accuracy;
mod strength;
mod ucs;
mod xcs;

pub use accuracy::{AccuracyPayload, AccuracyUpdate};
pub use strength::{StrengthPayload, StrengthUpdate};
pub use ucs::{UcsPayload, UcsUpdate};
pub use xcs::{XcsPayload, XcsUpdate};

use crate::chromosome::BitChromosome;
use crate::classifier::{Classifier, ComparisonMode, Macroclassifier};
use crate::data::Instances;
use crate::ga::SteadyStateGa;
use crate::population::{ClassifierSet, SetView};
use crate::representation::Representation;
use rand::Rng;
use std::fmt;

/// Thresholds a classifier must exceed to absorb more specific rules.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubsumptionThresholds {
    /// Fitness must be strictly greater than this.
    pub fitness: f64,
    /// Experience must be strictly greater than this.
    pub experience: u64,
}

/// Everything an update step needs besides the population.
pub struct UpdateContext<'a, R, G> {
    pub representation: &'a R,
    pub instances: &'a Instances,
    pub instance_index: usize,
    pub ga: &'a SteadyStateGa,
    /// Number of instances processed so far; drives GA activation.
    pub timestamp: u64,
    pub rng: &'a mut G,
}

/// What an update step changed in the population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Covering events.
    pub covered: usize,
    /// Offspring inserted by the GA.
    pub offspring: usize,
}

/// A credit-assignment algorithm.
pub trait UpdateStrategy: Send + Sync {
    /// Per-classifier statistics of this algorithm.
    type Payload: fmt::Debug + Send + Sync;

    /// Fresh statistics for a new classifier.
    fn create_payload(&self) -> Self::Payload;

    /// Fitness given to classifiers created by covering.
    fn initial_fitness(&self) -> f64;

    /// Subsumption eligibility thresholds.
    fn subsumption(&self) -> SubsumptionThresholds;

    /// Updates statistics and fitness of every member of one niche.
    ///
    /// `members` are the match-set entries taking part in this niche and
    /// `correct` the subset whose action is correct. Experience has already
    /// been incremented.
    fn update_niche(
        &self,
        population: &mut ClassifierSet<Self::Payload>,
        members: &SetView,
        correct: &SetView,
    );

    /// Value used by selection under `mode`.
    fn comparison_value(&self, mode: ComparisonMode, classifier: &Classifier<Self::Payload>) -> f64;

    /// Overrides the value returned by [`comparison_value`](Self::comparison_value).
    fn set_comparison_value(
        &self,
        mode: ComparisonMode,
        classifier: &mut Classifier<Self::Payload>,
        value: f64,
    );

    /// Statistics text for the persisted population.
    fn describe(&self, payload: &Self::Payload) -> String;

    /// Builds a classifier with fresh statistics.
    fn create_classifier(&self, chromosome: BitChromosome) -> Classifier<Self::Payload> {
        Classifier::new(chromosome, self.create_payload()).with_fitness(self.initial_fitness())
    }

    /// Copies a classifier's chromosome into a new classifier with fresh
    /// statistics.
    fn clone_classifier(&self, classifier: &Classifier<Self::Payload>) -> Classifier<Self::Payload> {
        classifier.offspring(self.create_payload(), self.initial_fitness())
    }

    /// Payload and fitness of a GA child of `a` and `b`.
    ///
    /// Resets to defaults unless a strategy interpolates its parents.
    fn offspring_payload(
        &self,
        _a: &Classifier<Self::Payload>,
        _b: &Classifier<Self::Payload>,
    ) -> (Self::Payload, f64) {
        (self.create_payload(), self.initial_fitness())
    }

    /// Recomputes the subsumption flag from fitness and experience.
    fn update_subsumption(&self, classifier: &mut Classifier<Self::Payload>) {
        let thresholds = self.subsumption();
        let eligible = classifier.fitness() > thresholds.fitness
            && classifier.experience() > thresholds.experience;
        classifier.set_subsumable(eligible);
    }

    /// Runs one credit-assignment step for an instance.
    ///
    /// For every niche of the instance: updates the members' statistics and
    /// subsumption flags, then, when `evolve` is set, either covers an empty
    /// correct set or hands the niche to the GA.
    fn update_set<R: Representation, G: Rng>(
        &self,
        population: &mut ClassifierSet<Self::Payload>,
        match_set: &SetView,
        evolve: bool,
        ctx: &mut UpdateContext<'_, R, G>,
    ) -> UpdateOutcome
    where
        Self: Sized,
    {
        let representation = ctx.representation;
        let instances = ctx.instances;
        let index = ctx.instance_index;
        let mut outcome = UpdateOutcome::default();

        for niche in representation.niches(instances, index) {
            let members =
                population.filter_view(match_set, |m| representation.advocates(m.chromosome(), niche));
            let correct =
                population.generate_correct_set(&members, instances, index, niche, representation);

            for &i in members.indices() {
                population.get_mut(i).increment_experience();
            }
            self.update_niche(population, &members, &correct);
            for &i in members.indices() {
                self.update_subsumption(population.get_mut(i));
            }

            if !evolve {
                continue;
            }

            if correct.is_empty() {
                let chromosome = representation.create_covering(instances, index, niche, ctx.rng);
                if !representation.is_match(instances.attributes(index), &chromosome) {
                    log::warn!("covering produced a rule that does not match instance {index}");
                }
                let classifier = self.create_classifier(chromosome).with_timestamp(ctx.timestamp);
                log::trace!(
                    "covering instance {index} ({niche:?}): {}",
                    representation.render(classifier.chromosome())
                );
                population.add_classifier(Macroclassifier::new(classifier, 1), true, representation);
                outcome.covered += 1;
            } else {
                let p = ctx.ga.config().match_set_run_probability;
                let niche_view = if p > 0.0 && ctx.rng.random_bool(p) {
                    members
                } else {
                    correct
                };
                outcome.offspring += ctx.ga.evolve(
                    population,
                    &niche_view,
                    self,
                    representation,
                    ctx.timestamp,
                    ctx.rng,
                );
            }
        }
        outcome
    }
}

/// Running mean while `count < 1/beta`, exponential moving average after.
pub(crate) fn moving_update(current: f64, target: f64, count: u64, beta: f64) -> f64 {
    let count = count.max(1) as f64;
    if count < 1.0 / beta {
        current + (target - current) / count
    } else {
        current + beta * (target - current)
    }
}

/// Deletion comparison value: fitness shared by the niche size estimate.
pub(crate) fn deletion_value(fitness: f64, niche_size: f64) -> f64 {
    fitness / niche_size.max(1.0)
}

/// Inverse of [`deletion_value`].
pub(crate) fn fitness_from_deletion_value(value: f64, niche_size: f64) -> f64 {
    value * niche_size.max(1.0)
}

/// Membership mask of a view over a population of `len` entries.
pub(crate) fn membership(view: &SetView, len: usize) -> Vec<bool> {
    let mut mask = vec![false; len];
    for &i in view.indices() {
        mask[i] = true;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{GaActivation, GaConfig};
    use crate::random::create_rng;
    use crate::representation::{MultiLabelRepresentation, TernaryRepresentation};

    #[test]
    fn test_moving_update_switches_to_ema() {
        // beta = 0.25: running mean for the first three updates
        let mut v = 0.0;
        v = moving_update(v, 3.0, 1, 0.25);
        assert!((v - 3.0).abs() < 1e-12);
        v = moving_update(v, 0.0, 2, 0.25);
        assert!((v - 1.5).abs() < 1e-12);
        v = moving_update(v, 1.5, 4, 0.25);
        assert!((v - 1.5).abs() < 1e-12);
        v = moving_update(v, 5.5, 5, 0.25);
        assert!((v - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_deletion_value_round_trip() {
        let v = deletion_value(0.9, 3.0);
        assert!((v - 0.3).abs() < 1e-12);
        assert!((fitness_from_deletion_value(v, 3.0) - 0.9).abs() < 1e-12);
        // niche estimates below one are coerced
        assert!((deletion_value(0.9, 0.0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_update_set_covers_empty_correct_set() {
        let repr = TernaryRepresentation::new(3, 2);
        let data = Instances::new(vec![vec![1.0, 0.0, 1.0, 1.0]], 1).unwrap();
        let ga = SteadyStateGa::new(GaConfig::default());
        let strategy = AccuracyUpdate::default();
        let mut rng = create_rng(3);
        let mut population = ClassifierSet::new();

        let match_set = population.generate_match_set(&data, 0, &repr);
        let mut ctx = UpdateContext {
            representation: &repr,
            instances: &data,
            instance_index: 0,
            ga: &ga,
            timestamp: 0,
            rng: &mut rng,
        };
        let outcome = strategy.update_set(&mut population, &match_set, true, &mut ctx);

        assert_eq!(outcome.covered, 1);
        assert_eq!(population.total_numerosity(), 1);
        let match_set = population.generate_match_set(&data, 0, &repr);
        assert_eq!(match_set.len(), 1);
        let correct =
            population.generate_correct_set(&match_set, &data, 0, crate::representation::Niche::Action, &repr);
        assert_eq!(correct.len(), 1);
    }

    #[test]
    fn test_update_set_without_evolution_only_updates() {
        let repr = TernaryRepresentation::new(1, 2);
        let data = Instances::new(vec![vec![1.0, 1.0]], 1).unwrap();
        let ga = SteadyStateGa::new(GaConfig::default());
        let strategy = AccuracyUpdate::default();
        let mut rng = create_rng(3);
        let mut population = ClassifierSet::new();
        // a0=# => 0 (wrong)
        population.add_classifier(
            Macroclassifier::new(strategy.create_classifier("000".parse().unwrap()), 1),
            true,
            &repr,
        );

        let match_set = population.generate_match_set(&data, 0, &repr);
        let mut ctx = UpdateContext {
            representation: &repr,
            instances: &data,
            instance_index: 0,
            ga: &ga,
            timestamp: 0,
            rng: &mut rng,
        };
        let outcome = strategy.update_set(&mut population, &match_set, false, &mut ctx);

        assert_eq!(outcome, UpdateOutcome::default());
        assert_eq!(population.len(), 1);
        assert_eq!(population.get(0).experience(), 1);
        assert_eq!(population.get(0).payload().match_appearances, 1);
        assert_eq!(population.get(0).payload().true_positives, 0);
    }

    #[test]
    fn test_update_set_runs_ga_on_correct_set() {
        let repr = TernaryRepresentation::new(2, 2);
        let data = Instances::new(vec![vec![1.0, 0.0, 1.0]], 1).unwrap();
        let ga = SteadyStateGa::new(
            GaConfig::default()
                .with_activation(GaActivation::Probability(1.0))
                .with_offspring_subsumption(false),
        );
        let strategy = AccuracyUpdate::default();
        let mut rng = create_rng(3);
        let mut population = ClassifierSet::new();
        population.add_classifier(
            Macroclassifier::new(strategy.create_classifier("11001".parse().unwrap()), 1),
            true,
            &repr,
        );

        let match_set = population.generate_match_set(&data, 0, &repr);
        let mut ctx = UpdateContext {
            representation: &repr,
            instances: &data,
            instance_index: 0,
            ga: &ga,
            timestamp: 10,
            rng: &mut rng,
        };
        let outcome = strategy.update_set(&mut population, &match_set, true, &mut ctx);

        assert_eq!(outcome.covered, 0);
        assert_eq!(outcome.offspring, 2);
        assert_eq!(population.total_numerosity(), 3);
        assert_eq!(population.get(0).timestamp(), 10);
    }

    #[test]
    fn test_multilabel_updates_each_label_niche() {
        let repr = MultiLabelRepresentation::new(1, 2).with_label_generalization_rate(0.0);
        let data = Instances::new(vec![vec![1.0, 1.0, 0.0]], 2).unwrap();
        let ga = SteadyStateGa::new(GaConfig::default());
        let strategy = AccuracyUpdate::default();
        let mut rng = create_rng(1);
        let mut population = ClassifierSet::new();
        // a0=#, l0=1, l1=1: right on label 0, wrong on label 1
        population.add_classifier(
            Macroclassifier::new(strategy.create_classifier("001111".parse().unwrap()), 1),
            true,
            &repr,
        );

        let match_set = population.generate_match_set(&data, 0, &repr);
        let mut ctx = UpdateContext {
            representation: &repr,
            instances: &data,
            instance_index: 0,
            ga: &ga,
            timestamp: 0,
            rng: &mut rng,
        };
        let outcome = strategy.update_set(&mut population, &match_set, true, &mut ctx);

        let first = population.get(0);
        assert_eq!(first.experience(), 2);
        assert_eq!(first.payload().match_appearances, 2);
        assert_eq!(first.payload().true_positives, 1);
        // label 1 had no correct rule and was covered
        assert_eq!(outcome.covered, 1);
    }
}
