//! Classifiers and macroclassifiers.
//!
//! A [`Classifier`] is one rule: a chromosome, credit statistics, and a
//! per-instance match cache. A [`Macroclassifier`] stands for `numerosity`
//! identical copies of a classifier and is the unit stored in a
//! [`ClassifierSet`](crate::population::ClassifierSet).
//!
//! The payload type `P` holds the statistics of the configured
//! credit-assignment algorithm. It is chosen once, through
//! [`UpdateStrategy::Payload`](crate::update::UpdateStrategy::Payload).

mod macroclassifier;

pub use macroclassifier::Macroclassifier;

use crate::chromosome::BitChromosome;
use crate::data::Instances;
use crate::representation::Representation;
use crate::update::UpdateStrategy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Which question a comparison value answers.
///
/// The classifier has no opinion about these modes; it forwards them to the
/// update strategy, which decides what each one reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonMode {
    /// Value used when voting for a prediction.
    Exploitation,
    /// Value used when choosing GA parents.
    Exploration,
    /// Value used by population control; lower values are deleted first.
    Deletion,
}

/// Cached match results for one instance array generation.
#[derive(Debug, Clone, Default)]
struct MatchCache {
    generation: u64,
    results: HashMap<usize, bool>,
    covered: usize,
}

impl MatchCache {
    fn sync(&mut self, generation: u64) {
        if self.generation != generation {
            self.generation = generation;
            self.results.clear();
            self.covered = 0;
        }
    }

    fn reset(&mut self) {
        self.generation = 0;
        self.results.clear();
        self.covered = 0;
    }
}

/// A single condition/action rule with its credit statistics.
///
/// `Classifier` does not implement `Clone`: offspring are built through
/// [`offspring`](Self::offspring), which never carries statistics over.
#[derive(Debug)]
pub struct Classifier<P> {
    serial: u64,
    chromosome: BitChromosome,
    payload: P,
    fitness: f64,
    experience: u64,
    timestamp: u64,
    subsumable: bool,
    cache: MatchCache,
}

impl<P> Classifier<P> {
    /// Creates a classifier with zero fitness and experience.
    pub fn new(chromosome: BitChromosome, payload: P) -> Self {
        Self {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            chromosome,
            payload,
            fitness: 0.0,
            experience: 0,
            timestamp: 0,
            subsumable: false,
            cache: MatchCache::default(),
        }
    }

    /// Sets the initial fitness.
    pub fn with_fitness(mut self, fitness: f64) -> Self {
        self.fitness = fitness;
        self
    }

    /// Sets the initial GA timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builds a new classifier carrying a copy of this chromosome.
    ///
    /// The copy gets a new identity, zero experience, an empty match cache
    /// and the given payload and fitness.
    pub fn offspring(&self, payload: P, fitness: f64) -> Self {
        Classifier::new(self.chromosome.clone(), payload).with_fitness(fitness)
    }

    /// Unique identity of this classifier.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The rule's condition and action bits.
    pub fn chromosome(&self) -> &BitChromosome {
        &self.chromosome
    }

    /// Mutable access to the chromosome.
    ///
    /// Clears the match cache, since any cached result may be stale.
    pub fn chromosome_mut(&mut self) -> &mut BitChromosome {
        self.cache.reset();
        &mut self.chromosome
    }

    /// Statistics owned by the update strategy.
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Mutable access to the strategy statistics.
    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    /// Current fitness.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Overwrites the fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Number of updates this classifier has taken part in.
    pub fn experience(&self) -> u64 {
        self.experience
    }

    /// Counts one more update.
    pub fn increment_experience(&mut self) {
        self.experience += 1;
    }

    /// Time of the last GA run in a niche containing this classifier.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Stamps the classifier with the time of a GA run.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// Whether this classifier may absorb more specific ones.
    pub fn is_subsumable(&self) -> bool {
        self.subsumable
    }

    /// Set by the update strategy only.
    pub fn set_subsumable(&mut self, subsumable: bool) {
        self.subsumable = subsumable;
    }

    /// Tests instance `index` against this rule's condition.
    ///
    /// The representation is consulted at most once per instance and
    /// instance-array generation; later calls are answered from the cache.
    pub fn is_match<R: Representation>(
        &mut self,
        instances: &Instances,
        index: usize,
        representation: &R,
    ) -> bool {
        self.cache.sync(instances.generation());
        if let Some(&matched) = self.cache.results.get(&index) {
            return matched;
        }
        let matched = representation.is_match(instances.attributes(index), &self.chromosome);
        self.cache.results.insert(index, matched);
        if matched {
            self.cache.covered += 1;
        }
        matched
    }

    /// Matches a raw attribute vector without touching the cache.
    pub fn matches<R: Representation>(&self, attributes: &[f64], representation: &R) -> bool {
        representation.is_match(attributes, &self.chromosome)
    }

    /// Number of instances of `instances` already tested.
    pub fn checked_instances(&self, instances: &Instances) -> usize {
        if self.cache.generation == instances.generation() {
            self.cache.results.len()
        } else {
            0
        }
    }

    /// Number of tested instances of `instances` that matched.
    pub fn covered_instances(&self, instances: &Instances) -> usize {
        if self.cache.generation == instances.generation() {
            self.cache.covered
        } else {
            0
        }
    }

    /// Fraction of tested instances that matched (0 when none tested).
    pub fn coverage(&self, instances: &Instances) -> f64 {
        let checked = self.checked_instances(instances);
        if checked == 0 {
            0.0
        } else {
            self.covered_instances(instances) as f64 / checked as f64
        }
    }

    /// Fully tested against `instances` and never matched.
    pub fn is_dead_weight(&self, instances: &Instances) -> bool {
        !instances.is_empty()
            && self.checked_instances(instances) == instances.len()
            && self.covered_instances(instances) == 0
    }

    /// Structural equality as defined by the representation.
    pub fn equals<R: Representation>(&self, other: &Classifier<P>, representation: &R) -> bool {
        representation.are_equal(&self.chromosome, &other.chromosome)
    }

    /// Whether this rule is strictly more general than `other`.
    pub fn is_more_general<R: Representation>(
        &self,
        other: &Classifier<P>,
        representation: &R,
    ) -> bool {
        representation.is_more_general(&self.chromosome, &other.chromosome)
    }

    /// Comparison value under `mode`, as defined by the strategy.
    pub fn comparison_value<U>(&self, mode: ComparisonMode, strategy: &U) -> f64
    where
        U: UpdateStrategy<Payload = P>,
    {
        strategy.comparison_value(mode, self)
    }

    /// Overrides the comparison value under `mode`, as defined by the strategy.
    pub fn set_comparison_value<U>(&mut self, mode: ComparisonMode, value: f64, strategy: &U)
    where
        U: UpdateStrategy<Payload = P>,
    {
        strategy.set_comparison_value(mode, self, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::representation::{Niche, TernaryRepresentation};
    use crate::update::AccuracyUpdate;

    // Counts representation calls to prove the cache works.
    struct CountingRepr {
        inner: TernaryRepresentation,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl Representation for CountingRepr {
        fn chromosome_size(&self) -> usize {
            self.inner.chromosome_size()
        }
        fn attribute_count(&self) -> usize {
            self.inner.attribute_count()
        }
        fn label_count(&self) -> usize {
            1
        }
        fn is_match(&self, attributes: &[f64], chromosome: &BitChromosome) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.is_match(attributes, chromosome)
        }
        fn create_covering<G: rand::Rng>(
            &self,
            instances: &Instances,
            index: usize,
            niche: Niche,
            rng: &mut G,
        ) -> BitChromosome {
            self.inner.create_covering(instances, index, niche, rng)
        }
        fn is_more_general(&self, g: &BitChromosome, s: &BitChromosome) -> bool {
            self.inner.is_more_general(g, s)
        }
        fn are_equal(&self, a: &BitChromosome, b: &BitChromosome) -> bool {
            self.inner.are_equal(a, b)
        }
        fn fix_chromosome<G: rand::Rng>(&self, c: &mut BitChromosome, rng: &mut G) {
            self.inner.fix_chromosome(c, rng)
        }
        fn niches(&self, instances: &Instances, index: usize) -> Vec<Niche> {
            self.inner.niches(instances, index)
        }
        fn is_correct(&self, c: &BitChromosome, i: &Instances, idx: usize, n: Niche) -> bool {
            self.inner.is_correct(c, i, idx, n)
        }
        fn classify(&self, votes: &[crate::representation::Vote<'_>]) -> Vec<usize> {
            self.inner.classify(votes)
        }
        fn render(&self, c: &BitChromosome) -> String {
            self.inner.render(c)
        }
    }

    fn instances() -> Instances {
        Instances::new(
            vec![vec![1.0, 0.0, 1.0], vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]],
            1,
        )
        .unwrap()
    }

    // a0=1, a1=#, class 1
    fn rule() -> BitChromosome {
        "11001".parse().unwrap()
    }

    #[test]
    fn test_match_cache_single_call_per_instance() {
        let repr = CountingRepr {
            inner: TernaryRepresentation::new(2, 2),
            calls: Default::default(),
        };
        let data = instances();
        let mut cl = Classifier::new(rule(), ());

        for _ in 0..3 {
            assert!(cl.is_match(&data, 0, &repr));
            assert!(!cl.is_match(&data, 1, &repr));
        }
        assert_eq!(repr.calls.load(Ordering::Relaxed), 2);
        assert_eq!(cl.checked_instances(&data), 2);
        assert_eq!(cl.covered_instances(&data), 1);
        assert!((cl.coverage(&data) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cache_invalidated_by_new_generation() {
        let repr = CountingRepr {
            inner: TernaryRepresentation::new(2, 2),
            calls: Default::default(),
        };
        let train = instances();
        let test = train.subset(&[1, 0]);
        let mut cl = Classifier::new(rule(), ());

        assert!(cl.is_match(&train, 0, &repr));
        // index 0 of the test array is a different row
        assert!(!cl.is_match(&test, 0, &repr));
        assert_eq!(repr.calls.load(Ordering::Relaxed), 2);
        assert_eq!(cl.checked_instances(&train), 0);
        assert_eq!(cl.checked_instances(&test), 1);
    }

    #[test]
    fn test_dead_weight() {
        let repr = TernaryRepresentation::new(2, 2);
        let data = instances();
        // a0=0, a1=1: no row matches
        let mut dead = Classifier::new("10111".parse().unwrap(), ());
        for i in 0..data.len() {
            assert!(!dead.is_match(&data, i, &repr));
        }
        assert!(dead.is_dead_weight(&data));

        let mut alive = Classifier::new(rule(), ());
        alive.is_match(&data, 1, &repr);
        assert!(!alive.is_dead_weight(&data));
    }

    #[test]
    fn test_chromosome_mut_resets_cache() {
        let repr = TernaryRepresentation::new(2, 2);
        let data = instances();
        let mut cl = Classifier::new(rule(), ());
        assert!(cl.is_match(&data, 0, &repr));
        // a0 must now be 0
        cl.chromosome_mut().clear(1);
        assert!(!cl.is_match(&data, 0, &repr));
    }

    #[test]
    fn test_offspring_resets_statistics() {
        let repr = TernaryRepresentation::new(2, 2);
        let data = instances();
        let mut parent = Classifier::new(rule(), 7u32).with_fitness(0.8);
        parent.increment_experience();
        parent.is_match(&data, 0, &repr);

        let child = parent.offspring(0u32, 0.01);
        assert!(child.equals(&parent, &repr));
        assert_ne!(child.serial(), parent.serial());
        assert_eq!(child.experience(), 0);
        assert_eq!(*child.payload(), 0);
        assert_eq!(child.checked_instances(&data), 0);
        assert!((child.fitness() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_comparison_value_delegates() {
        let strategy = AccuracyUpdate::default();
        let mut cl = strategy.create_classifier(rule());
        cl.set_comparison_value(ComparisonMode::Exploration, 0.25, &strategy);
        assert!((cl.comparison_value(ComparisonMode::Exploration, &strategy) - 0.25).abs() < 1e-12);
        assert!((cl.fitness() - 0.25).abs() < 1e-12);
    }
}
