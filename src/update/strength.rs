//! Strength-based supervised update (SS-LCS).

use super::{
    deletion_value, fitness_from_deletion_value, membership, SubsumptionThresholds,
    UpdateStrategy,
};
use crate::classifier::{Classifier, ComparisonMode};
use crate::error::{LcsError, Result};
use crate::population::{ClassifierSet, SetView};

/// SS-LCS statistics of one classifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrengthPayload {
    /// Accumulated reward minus penalties.
    pub strength: f64,
    pub true_positives: u64,
    pub match_appearances: u64,
    /// Running mean numerosity of the partition (correct or incorrect part
    /// of the niche) this classifier fell into.
    pub niche_size: f64,
}

impl Default for StrengthPayload {
    fn default() -> Self {
        Self {
            strength: 0.0,
            true_positives: 0,
            match_appearances: 0,
            niche_size: 1.0,
        }
    }
}

/// Strength-based update.
///
/// Each correct member gains `reward` divided by the correct set's
/// numerosity; incorrect members lose `penalty_rate * reward`, shared over
/// their niche size estimate. Fitness is strength per match appearance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrengthUpdate {
    pub reward: f64,
    pub penalty_rate: f64,
    pub subsumption_fitness: f64,
    pub subsumption_experience: u64,
}

impl Default for StrengthUpdate {
    fn default() -> Self {
        Self {
            reward: 1.0,
            penalty_rate: 0.5,
            subsumption_fitness: 0.5,
            subsumption_experience: 20,
        }
    }
}

impl StrengthUpdate {
    /// Sets the reward shared by a correct set.
    pub fn with_reward(mut self, reward: f64) -> Self {
        self.reward = reward;
        self
    }

    /// Sets the penalty rate.
    pub fn with_penalty_rate(mut self, rate: f64) -> Self {
        self.penalty_rate = rate.max(0.0);
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
        if !(self.reward > 0.0) {
            return Err(LcsError::InvalidConfig("reward must be positive".into()));
        }
        Ok(())
    }
}

impl UpdateStrategy for StrengthUpdate {
    type Payload = StrengthPayload;

    fn create_payload(&self) -> StrengthPayload {
        StrengthPayload::default()
    }

    fn initial_fitness(&self) -> f64 {
        0.0
    }

    fn subsumption(&self) -> SubsumptionThresholds {
        SubsumptionThresholds {
            fitness: self.subsumption_fitness,
            experience: self.subsumption_experience,
        }
    }

    fn update_niche(
        &self,
        population: &mut ClassifierSet<StrengthPayload>,
        members: &SetView,
        correct: &SetView,
    ) {
        let in_correct = membership(correct, population.len());
        let correct_size = f64::from(correct.total_numerosity());
        let incorrect_size = f64::from(members.total_numerosity() - correct.total_numerosity());

        for &i in members.indices() {
            let classifier = population.get_mut(i);
            let payload = classifier.payload_mut();
            payload.match_appearances += 1;
            let partition = if in_correct[i] {
                payload.true_positives += 1;
                payload.strength += self.reward / correct_size;
                correct_size
            } else {
                payload.strength -= self.penalty_rate * self.reward / payload.niche_size.max(1.0);
                incorrect_size
            };
            payload.niche_size +=
                (partition - payload.niche_size) / payload.match_appearances as f64;
            let fitness = payload.strength / payload.match_appearances as f64;
            classifier.set_fitness(fitness);
        }
    }

    fn comparison_value(&self, mode: ComparisonMode, classifier: &Classifier<StrengthPayload>) -> f64 {
        match mode {
            ComparisonMode::Exploitation | ComparisonMode::Exploration => classifier.fitness(),
            ComparisonMode::Deletion => {
                deletion_value(classifier.fitness(), classifier.payload().niche_size)
            }
        }
    }

    fn set_comparison_value(
        &self,
        mode: ComparisonMode,
        classifier: &mut Classifier<StrengthPayload>,
        value: f64,
    ) {
        let fitness = match mode {
            ComparisonMode::Exploitation | ComparisonMode::Exploration => value,
            ComparisonMode::Deletion => {
                fitness_from_deletion_value(value, classifier.payload().niche_size)
            }
        };
        classifier.set_fitness(fitness);
    }

    fn describe(&self, payload: &StrengthPayload) -> String {
        format!(
            "str={:.4} tp={} msa={} ns={:.3}",
            payload.strength, payload.true_positives, payload.match_appearances, payload.niche_size
        )
    }
}
