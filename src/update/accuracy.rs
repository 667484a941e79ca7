//! Accuracy-based supervised update (AS-LCS).

use super::{
    deletion_value, fitness_from_deletion_value, membership, SubsumptionThresholds,
    UpdateStrategy,
};
use crate::classifier::{Classifier, ComparisonMode};
use crate::error::{LcsError, Result};
use crate::population::{ClassifierSet, SetView};

/// AS-LCS statistics of one classifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccuracyPayload {
    /// Correct-set memberships.
    pub true_positives: u64,
    /// Match-set memberships.
    pub match_appearances: u64,
    /// Running mean of the correct-set numerosity, over correct appearances.
    pub correct_set_size: f64,
}

impl Default for AccuracyPayload {
    fn default() -> Self {
        Self {
            true_positives: 0,
            match_appearances: 0,
            correct_set_size: 1.0,
        }
    }
}

impl AccuracyPayload {
    /// `tp / msa`, or 0 before the first match.
    pub fn accuracy(&self) -> f64 {
        if self.match_appearances == 0 {
            0.0
        } else {
            self.true_positives as f64 / self.match_appearances as f64
        }
    }
}

/// Accuracy-based update: fitness is `accuracy^n`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccuracyUpdate {
    /// Accuracy exponent `n`.
    pub accuracy_exponent: f64,
    /// Subsumption fitness threshold.
    pub subsumption_fitness: f64,
    /// Subsumption experience threshold.
    pub subsumption_experience: u64,
}

impl Default for AccuracyUpdate {
    fn default() -> Self {
        Self {
            accuracy_exponent: 10.0,
            subsumption_fitness: 0.99,
            subsumption_experience: 20,
        }
    }
}

impl AccuracyUpdate {
    /// Sets the accuracy exponent `n`.
    pub fn with_accuracy_exponent(mut self, n: f64) -> Self {
        self.accuracy_exponent = n;
        self
    }

    /// Sets the subsumption thresholds.
    pub fn with_subsumption(mut self, fitness: f64, experience: u64) -> Self {
        self.subsumption_fitness = fitness;
        self.subsumption_experience = experience;
        self
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<()> {
        if !(self.accuracy_exponent > 0.0) {
            return Err(LcsError::InvalidConfig(
                "accuracy exponent must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl UpdateStrategy for AccuracyUpdate {
    type Payload = AccuracyPayload;

    fn create_payload(&self) -> AccuracyPayload {
        AccuracyPayload::default()
    }

    fn initial_fitness(&self) -> f64 {
        1.0
    }

    fn subsumption(&self) -> SubsumptionThresholds {
        SubsumptionThresholds {
            fitness: self.subsumption_fitness,
            experience: self.subsumption_experience,
        }
    }

    fn update_niche(
        &self,
        population: &mut ClassifierSet<AccuracyPayload>,
        members: &SetView,
        correct: &SetView,
    ) {
        let in_correct = membership(correct, population.len());
        let correct_size = f64::from(correct.total_numerosity());

        for &i in members.indices() {
            let classifier = population.get_mut(i);
            let payload = classifier.payload_mut();
            payload.match_appearances += 1;
            if in_correct[i] {
                payload.true_positives += 1;
                payload.correct_set_size +=
                    (correct_size - payload.correct_set_size) / payload.true_positives as f64;
            }
            let fitness = payload.accuracy().powf(self.accuracy_exponent);
            classifier.set_fitness(fitness);
        }
    }

    fn comparison_value(&self, mode: ComparisonMode, classifier: &Classifier<AccuracyPayload>) -> f64 {
        match mode {
            ComparisonMode::Exploitation | ComparisonMode::Exploration => classifier.fitness(),
            ComparisonMode::Deletion => {
                deletion_value(classifier.fitness(), classifier.payload().correct_set_size)
            }
        }
    }

    fn set_comparison_value(
        &self,
        mode: ComparisonMode,
        classifier: &mut Classifier<AccuracyPayload>,
        value: f64,
    ) {
        let fitness = match mode {
            ComparisonMode::Exploitation | ComparisonMode::Exploration => value,
            ComparisonMode::Deletion => {
                fitness_from_deletion_value(value, classifier.payload().correct_set_size)
            }
        };
        classifier.set_fitness(fitness);
    }

    fn describe(&self, payload: &AccuracyPayload) -> String {
        format!(
            "tp={} msa={} cs={:.3}",
            payload.true_positives, payload.match_appearances, payload.correct_set_size
        )
    }
}
