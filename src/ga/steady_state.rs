//! Steady-state, niche-scoped GA.
//!
//! Each activation breeds exactly two children from parents selected in
//! one niche and inserts them into the population. Nothing is replaced
//! here; population control trims the population afterwards.

use super::config::{GaActivation, GaConfig};
use super::operators::{bitwise_mutation, random_single_point_crossover};
use crate::classifier::{Classifier, Macroclassifier};
use crate::population::{ClassifierSet, SetView};
use crate::representation::Representation;
use crate::update::UpdateStrategy;
use rand::Rng;

/// Niche GA driver.
#[derive(Debug, Clone, Default)]
pub struct SteadyStateGa {
    config: GaConfig,
}

impl SteadyStateGa {
    /// Creates a GA driver with the given configuration.
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    /// The GA configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Whether the activation trigger fires for `niche` at `timestamp`.
    pub fn should_activate<P, G: Rng>(
        &self,
        population: &ClassifierSet<P>,
        niche: &SetView,
        timestamp: u64,
        rng: &mut G,
    ) -> bool {
        match self.config.activation {
            GaActivation::Probability(p) => rng.random_bool(p),
            GaActivation::Age(threshold) => {
                let total = niche.current_numerosity(population);
                if total == 0 {
                    return false;
                }
                let weighted: f64 = niche
                    .iter(population)
                    .map(|(_, m)| m.timestamp() as f64 * f64::from(m.numerosity()))
                    .sum();
                timestamp as f64 - weighted / f64::from(total) >= threshold as f64
            }
        }
    }

    /// Runs the GA on `niche` if the trigger fires.
    ///
    /// On firing, every niche member's timestamp is set to `timestamp` and
    /// two children are bred. Returns the number of children inserted.
    pub fn evolve<U, R, G>(
        &self,
        population: &mut ClassifierSet<U::Payload>,
        niche: &SetView,
        strategy: &U,
        representation: &R,
        timestamp: u64,
        rng: &mut G,
    ) -> usize
    where
        U: UpdateStrategy,
        R: Representation,
        G: Rng,
    {
        if niche.is_empty() || !self.should_activate(population, niche, timestamp, rng) {
            return 0;
        }
        for &i in niche.indices() {
            population.get_mut(i).set_timestamp(timestamp);
        }
        self.breed(population, niche, strategy, representation, timestamp, rng)
    }

    /// Breeds two children from parents selected in `niche`.
    ///
    /// With probability `crossover_rate` the parents are recombined at a
    /// random cut, otherwise their chromosomes are copied. Both children are
    /// mutated, repaired, and inserted at numerosity 1.
    ///
    /// # Panics
    /// Panics if `niche` is empty.
    pub fn breed<U, R, G>(
        &self,
        population: &mut ClassifierSet<U::Payload>,
        niche: &SetView,
        strategy: &U,
        representation: &R,
        timestamp: u64,
        rng: &mut G,
    ) -> usize
    where
        U: UpdateStrategy,
        R: Representation,
        G: Rng,
    {
        let parents = self
            .config
            .selector
            .select_many(population, niche, strategy, 2, rng);
        let (a, b) = (population.get(parents[0]), population.get(parents[1]));

        let (first, second) = if rng.random_bool(self.config.crossover_rate) {
            random_single_point_crossover(a.chromosome(), b.chromosome(), rng)
        } else {
            (a.chromosome().clone(), b.chromosome().clone())
        };

        let mut children = Vec::with_capacity(2);
        for mut chromosome in [first, second] {
            bitwise_mutation(&mut chromosome, self.config.mutation_rate, rng);
            representation.fix_chromosome(&mut chromosome, rng);
            let (payload, fitness) = strategy.offspring_payload(a, b);
            children.push(
                Classifier::new(chromosome, payload)
                    .with_fitness(fitness)
                    .with_timestamp(timestamp),
            );
        }

        let born = children.len();
        for child in children {
            log::trace!("GA offspring: {}", representation.render(child.chromosome()));
            population.add_classifier(
                Macroclassifier::new(child, 1),
                self.config.offspring_subsumption,
                representation,
            );
        }
        born
    }
}
