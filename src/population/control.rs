//! Population control.
//!
//! - [`FixedSizeDeletion`]: keeps the total numerosity at or below a
//!   capacity during training
//! - [`PostProcessPruner`]: drops weak rules once training has finished

use super::ClassifierSet;
use crate::data::Instances;
use crate::ga::Selector;
use crate::representation::Representation;
use crate::update::UpdateStrategy;
use rand::Rng;

/// Capacity-bounded deletion.
///
/// When the population exceeds `capacity` micro-classifiers, every
/// dead-weight rule (tested against the whole instance array without a
/// single match) is removed first. Then single copies are deleted one at a
/// time, each victim chosen by `selector`, until the capacity is met.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedSizeDeletion {
    pub capacity: u32,
    pub selector: Selector,
}

impl FixedSizeDeletion {
    /// Deletion with the default selector: roulette over deletion values,
    /// lowest first.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            selector: Selector::deletion(),
        }
    }

    /// Sets the victim selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Enforces the capacity; returns the number of micro-classifiers
    /// removed.
    pub fn control<U: UpdateStrategy, G: Rng>(
        &self,
        population: &mut ClassifierSet<U::Payload>,
        instances: &Instances,
        strategy: &U,
        rng: &mut G,
    ) -> u32 {
        if population.total_numerosity() <= self.capacity {
            return 0;
        }

        let dead = population.retain(|m| !m.is_dead_weight(instances));
        let mut removed = dead;
        while population.total_numerosity() > self.capacity {
            let view = population.full_view();
            let victim = self.selector.select(population, &view, strategy, rng);
            removed += population.delete_classifier(victim, 1);
        }

        log::debug!(
            "population control removed {removed} classifiers ({dead} dead weight), {} remain",
            population.total_numerosity()
        );
        removed
    }
}

/// Threshold pruning after training.
///
/// A rule survives only if its experience, coverage and fitness all reach
/// their minimums. Survivors are then merged with
/// [`ClassifierSet::self_subsume`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PostProcessPruner {
    pub min_experience: u64,
    pub min_coverage: f64,
    pub min_fitness: f64,
}

impl PostProcessPruner {
    /// Creates a pruner with the given minimums.
    pub fn new(min_experience: u64, min_coverage: f64, min_fitness: f64) -> Self {
        Self {
            min_experience,
            min_coverage,
            min_fitness,
        }
    }

    /// Prunes `population` against `instances`; returns the number of
    /// micro-classifiers removed.
    pub fn prune<P, R: Representation>(
        &self,
        population: &mut ClassifierSet<P>,
        instances: &Instances,
        representation: &R,
    ) -> u32 {
        population.evaluate_coverage(instances, representation);
        let removed = population.retain(|m| {
            m.experience() >= self.min_experience
                && m.coverage(instances) >= self.min_coverage
                && m.fitness() >= self.min_fitness
        });
        let folded = population.self_subsume(representation);
        log::debug!(
            "post-processing removed {removed} classifiers and folded {folded} entries, {} remain",
            population.total_numerosity()
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ComparisonMode, Macroclassifier};
    use crate::ga::{Objective, Selection};
    use crate::random::create_rng;
    use crate::representation::TernaryRepresentation;
    use crate::update::{AccuracyPayload, AccuracyUpdate};

    fn data() -> Instances {
        Instances::new(vec![vec![1.0, 0.0, 1.0], vec![1.0, 1.0, 1.0]], 1).unwrap()
    }

    fn population(
        strategy: &AccuracyUpdate,
        rules: &[(&str, u32, f64)],
    ) -> ClassifierSet<AccuracyPayload> {
        let repr = TernaryRepresentation::new(2, 2);
        let mut set = ClassifierSet::new();
        for &(bits, n, fitness) in rules {
            let cl = strategy
                .create_classifier(bits.parse().unwrap())
                .with_fitness(fitness);
            set.add_classifier(Macroclassifier::new(cl, n), false, &repr);
        }
        set
    }

    #[test]
    fn test_deletion_floor() {
        let strategy = AccuracyUpdate::default();
        let mut set = population(
            &strategy,
            &[("11001", 4, 0.9), ("11000", 3, 0.1), ("00001", 3, 0.5)],
        );
        let mut rng = create_rng(42);

        let removed = FixedSizeDeletion::new(6).control(&mut set, &data(), &strategy, &mut rng);
        assert_eq!(removed, 4);
        assert_eq!(set.total_numerosity(), 6);
        let sum: u32 = set.iter().map(|m| m.numerosity()).sum();
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_under_capacity_is_untouched() {
        let strategy = AccuracyUpdate::default();
        let mut set = population(&strategy, &[("11001", 2, 0.9)]);
        let mut rng = create_rng(42);
        let removed = FixedSizeDeletion::new(2).control(&mut set, &data(), &strategy, &mut rng);
        assert_eq!(removed, 0);
        assert_eq!(set.total_numerosity(), 2);
    }

    #[test]
    fn test_dead_weight_goes_first() {
        let repr = TernaryRepresentation::new(2, 2);
        let strategy = AccuracyUpdate::default();
        // a0=0 never matches the data
        let mut set = population(&strategy, &[("10001", 3, 1.0), ("11001", 5, 0.1)]);
        let instances = data();
        set.evaluate_coverage(&instances, &repr);
        let mut rng = create_rng(42);

        let removed = FixedSizeDeletion::new(6).control(&mut set, &instances, &strategy, &mut rng);
        assert_eq!(removed, 3);
        assert_eq!(set.len(), 1);
        assert_eq!(set.total_numerosity(), 5);
    }

    #[test]
    fn test_best_selector_deletes_lowest_value() {
        let strategy = AccuracyUpdate::default();
        let mut set = population(&strategy, &[("11001", 1, 0.9), ("11000", 1, 0.1), ("00001", 1, 0.5)]);
        let serial = set.get(1).serial();
        let mut rng = create_rng(42);
        let deletion = FixedSizeDeletion::new(2).with_selector(Selector::new(
            Selection::Best,
            ComparisonMode::Deletion,
            Objective::Minimize,
        ));

        deletion.control(&mut set, &data(), &strategy, &mut rng);
        assert_eq!(set.len(), 2);
        assert!(set.position(serial).is_none());
    }

    #[test]
    fn test_pruner_thresholds() {
        let repr = TernaryRepresentation::new(2, 2);
        let strategy = AccuracyUpdate::default();
        let mut set = population(
            &strategy,
            &[("11001", 2, 0.9), ("11000", 1, 0.1), ("10001", 1, 0.9)],
        );
        for m in set.iter_mut() {
            m.increment_experience();
        }

        let removed = PostProcessPruner::new(1, 0.5, 0.5).prune(&mut set, &data(), &repr);
        // "11000" is too weak and "10001" never matches
        assert_eq!(removed, 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.total_numerosity(), 2);
    }

    #[test]
    fn test_pruner_merges_survivors() {
        let repr = TernaryRepresentation::new(2, 2);
        let strategy = AccuracyUpdate::default();
        let mut set = population(&strategy, &[("11001", 2, 0.9), ("11011", 1, 0.9)]);

        let removed = PostProcessPruner::default().prune(&mut set, &data(), &repr);
        assert_eq!(removed, 0);
        assert_eq!(set.len(), 1);
        assert_eq!(set.total_numerosity(), 3);
    }
}
