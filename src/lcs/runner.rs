//! The supervised training loop.
//!
//! [`Lcs`] owns a population, its update strategy, its GA and its RNG.
//! One training step is: build the match set → run credit assignment
//! (covering or GA per niche) → enforce the population capacity.

use super::config::LcsConfig;
use super::evaluation::{Evaluation, Tally};
use crate::classifier::ComparisonMode;
use crate::data::Instances;
use crate::error::{LcsError, Result};
use crate::ga::SteadyStateGa;
use crate::population::control::{FixedSizeDeletion, PostProcessPruner};
use crate::population::ClassifierSet;
use crate::random::rng_from_seed;
use crate::representation::{Representation, Vote};
use crate::update::{UpdateContext, UpdateOutcome, UpdateStrategy};
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Hook called between training passes.
///
/// Observers only read the population. Any `FnMut(usize, &ClassifierSet<P>)`
/// closure is an observer.
pub trait TrainingObserver<P> {
    /// Called after `pass` completed passes.
    fn on_pass(&mut self, pass: usize, population: &ClassifierSet<P>);
}

impl<P, F> TrainingObserver<P> for F
where
    F: FnMut(usize, &ClassifierSet<P>),
{
    fn on_pass(&mut self, pass: usize, population: &ClassifierSet<P>) {
        self(pass, population)
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainResult {
    /// Passes over the training instances.
    pub passes: usize,
    /// Final number of macroclassifiers.
    pub macroclassifiers: usize,
    /// Final total numerosity.
    pub numerosity: u32,
    /// Covering events.
    pub coverings: usize,
    /// Offspring inserted by the GA.
    pub offspring: usize,
}

/// A supervised learning classifier system.
///
/// # Usage
///
/// ```
/// use u_lcs::data::Instances;
/// use u_lcs::lcs::{Lcs, LcsConfig};
/// use u_lcs::representation::TernaryRepresentation;
/// use u_lcs::update::UcsUpdate;
///
/// // class = a0 AND a1
/// let rows = vec![
///     vec![0.0, 0.0, 0.0],
///     vec![0.0, 1.0, 0.0],
///     vec![1.0, 0.0, 0.0],
///     vec![1.0, 1.0, 1.0],
/// ];
/// let data = Instances::new(rows, 1).unwrap();
/// let config = LcsConfig::default().with_passes(20).with_seed(42);
/// let mut lcs = Lcs::new(config, TernaryRepresentation::new(2, 2), UcsUpdate::default()).unwrap();
/// let result = lcs.train(&data).unwrap();
/// assert_eq!(result.passes, 20);
/// ```
pub struct Lcs<R, U: UpdateStrategy> {
    config: LcsConfig,
    representation: R,
    strategy: U,
    population: ClassifierSet<U::Payload>,
    ga: SteadyStateGa,
    deletion: FixedSizeDeletion,
    rng: StdRng,
    timestamp: u64,
    observers: Vec<Box<dyn TrainingObserver<U::Payload>>>,
}

impl<R: Representation, U: UpdateStrategy> Lcs<R, U> {
    /// Creates an untrained system.
    ///
    /// # Errors
    /// Returns [`LcsError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: LcsConfig, representation: R, strategy: U) -> Result<Self> {
        config.validate()?;
        let ga = SteadyStateGa::new(config.ga.clone());
        let deletion = FixedSizeDeletion::new(config.population_capacity)
            .with_selector(config.deletion_selector);
        let rng = rng_from_seed(config.seed);
        Ok(Self {
            config,
            representation,
            strategy,
            population: ClassifierSet::new(),
            ga,
            deletion,
            rng,
            timestamp: 0,
            observers: Vec::new(),
        })
    }

    /// Registers an observer called every `callback_frequency` passes.
    pub fn add_observer<O>(&mut self, observer: O)
    where
        O: TrainingObserver<U::Payload> + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// The training configuration.
    pub fn config(&self) -> &LcsConfig {
        &self.config
    }

    /// The rule representation.
    pub fn representation(&self) -> &R {
        &self.representation
    }

    /// The credit-assignment strategy.
    pub fn strategy(&self) -> &U {
        &self.strategy
    }

    /// The current population.
    pub fn population(&self) -> &ClassifierSet<U::Payload> {
        &self.population
    }

    /// Mutable access to the population.
    pub fn population_mut(&mut self) -> &mut ClassifierSet<U::Payload> {
        &mut self.population
    }

    /// Instances processed so far.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Trains for `config.passes` full passes over `instances`.
    ///
    /// # Errors
    /// Returns [`LcsError::InvalidInstances`] for an empty array and
    /// [`LcsError::SizeMismatch`] if its shape does not fit the
    /// representation.
    pub fn train(&mut self, instances: &Instances) -> Result<TrainResult> {
        self.check_shape(instances)?;

        let mut result = TrainResult::default();
        for pass in 0..self.config.passes {
            for index in 0..instances.len() {
                let outcome = self.train_step(instances, index, true);
                result.coverings += outcome.covered;
                result.offspring += outcome.offspring;
            }
            result.passes = pass + 1;

            log::debug!(
                "pass {}: {} macroclassifiers, numerosity {}, mean fitness {:.4}",
                result.passes,
                self.population.len(),
                self.population.total_numerosity(),
                self.population.mean_fitness()
            );

            let every = self.config.callback_frequency;
            if every > 0 && result.passes % every == 0 {
                for observer in &mut self.observers {
                    observer.on_pass(result.passes, &self.population);
                }
            }
        }

        result.macroclassifiers = self.population.len();
        result.numerosity = self.population.total_numerosity();
        log::info!(
            "training finished after {} passes: {} macroclassifiers, numerosity {}, {} coverings, {} offspring",
            result.passes,
            result.macroclassifiers,
            result.numerosity,
            result.coverings,
            result.offspring
        );
        Ok(result)
    }

    /// Runs one training step on instance `index`.
    ///
    /// With `evolve == false` only the statistics are updated: no covering,
    /// no GA.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn train_step(&mut self, instances: &Instances, index: usize, evolve: bool) -> UpdateOutcome {
        let match_set = self
            .population
            .generate_match_set(instances, index, &self.representation);
        let mut ctx = UpdateContext {
            representation: &self.representation,
            instances,
            instance_index: index,
            ga: &self.ga,
            timestamp: self.timestamp,
            rng: &mut self.rng,
        };
        let outcome = self
            .strategy
            .update_set(&mut self.population, &match_set, evolve, &mut ctx);
        self.timestamp += 1;

        self.deletion
            .control(&mut self.population, instances, &self.strategy, &mut self.rng);
        outcome
    }

    /// Predicts the label set of an attribute vector.
    ///
    /// Matching rules vote with `exploitation value × numerosity`. The match
    /// cache is not used, so any vector may be classified.
    pub fn classify(&self, attributes: &[f64]) -> Vec<usize> {
        let votes = self.votes(attributes);
        self.representation.classify(&votes)
    }

    fn votes<'a>(&'a self, attributes: &[f64]) -> Vec<Vote<'a>> {
        self.population
            .iter()
            .filter(|m| m.matches(attributes, &self.representation))
            .map(|m| Vote {
                chromosome: m.chromosome(),
                weight: self.strategy.comparison_value(ComparisonMode::Exploitation, m)
                    * f64::from(m.numerosity()),
            })
            .collect()
    }

    /// Classifies every instance and compares against its labels.
    pub fn evaluate(&self, instances: &Instances) -> Evaluation {
        let label_count = self.representation.label_count();
        let mut tally = Tally::new(label_count);
        for index in 0..instances.len() {
            let votes = self.votes(instances.attributes(index));
            let predicted = self.representation.classify(&votes);
            let actual = if label_count <= 1 {
                vec![instances.label(index)]
            } else {
                instances.active_labels(index)
            };
            tally.record(&predicted, &actual, !votes.is_empty());
        }
        tally.finish()
    }

    /// Prunes the trained population; returns the number of
    /// micro-classifiers removed.
    pub fn post_process(&mut self, instances: &Instances, pruner: &PostProcessPruner) -> u32 {
        pruner.prune(&mut self.population, instances, &self.representation)
    }

    /// Writes the population in its text form.
    pub fn write_population<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.population
            .write_to(writer, &self.representation, &self.strategy)
    }

    /// Saves the population in its text form to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_population(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn check_shape(&self, instances: &Instances) -> Result<()> {
        if instances.is_empty() {
            return Err(LcsError::InvalidInstances("no training instances".into()));
        }
        if instances.attribute_count() != self.representation.attribute_count() {
            return Err(LcsError::SizeMismatch {
                expected: self.representation.attribute_count(),
                actual: instances.attribute_count(),
            });
        }
        if instances.label_count() != self.representation.label_count() {
            return Err(LcsError::SizeMismatch {
                expected: self.representation.label_count(),
                actual: instances.label_count(),
            });
        }
        Ok(())
    }
}
