//! XCS update adapted to supervised classification.
//!
//! The environment pays `reward` to rules advocating the correct action and
//! nothing to the rest. Each rule tracks its payoff prediction, prediction
//! error and action-set size; fitness follows the rule's accuracy relative
//! to the other members of its action set.

use super::{
    deletion_value, fitness_from_deletion_value, membership, moving_update,
    SubsumptionThresholds, UpdateStrategy,
};
use crate::classifier::{Classifier, ComparisonMode};
use crate::error::{LcsError, Result};
use crate::population::{ClassifierSet, SetView};

/// XCS statistics of one classifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XcsPayload {
    pub prediction: f64,
    pub prediction_error: f64,
    pub action_set_size: f64,
}

/// XCS update.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XcsUpdate {
    /// Payoff of a correct action.
    pub reward: f64,
    /// Learning rate.
    pub beta: f64,
    /// Accuracy fall-off scale.
    pub alpha: f64,
    /// Error below which a rule counts as accurate (ε₀).
    pub error_threshold: f64,
    /// Accuracy fall-off exponent.
    pub nu: f64,
    pub initial_prediction: f64,
    pub initial_error: f64,
    pub initial_fitness: f64,
    /// Offspring average their parents' statistics instead of starting fresh.
    pub inherit_parameters: bool,
    pub subsumption_fitness: f64,
    pub subsumption_experience: u64,
}

impl Default for XcsUpdate {
    fn default() -> Self {
        Self {
            reward: 1000.0,
            beta: 0.2,
            alpha: 0.1,
            error_threshold: 10.0,
            nu: 5.0,
            initial_prediction: 10.0,
            initial_error: 0.0,
            initial_fitness: 0.01,
            inherit_parameters: false,
            subsumption_fitness: 0.9,
            subsumption_experience: 20,
        }
    }
}

impl XcsUpdate {
    /// Sets the payoff of a correct action.
    pub fn with_reward(mut self, reward: f64) -> Self {
        self.reward = reward;
        self
    }

    /// Sets the learning rate, clamped to 0.0–1.0.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta.clamp(0.0, 1.0);
        self
    }

    /// Sets the accuracy error threshold ε₀.
    pub fn with_error_threshold(mut self, e0: f64) -> Self {
        self.error_threshold = e0;
        self
    }

    /// Lets offspring average their parents' statistics.
    pub fn with_inherit_parameters(mut self, inherit: bool) -> Self {
        self.inherit_parameters = inherit;
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
        if !(self.beta > 0.0) {
            return Err(LcsError::InvalidConfig("beta must be in (0, 1]".into()));
        }
        if !(self.error_threshold > 0.0) {
            return Err(LcsError::InvalidConfig(
                "error threshold must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Predicted payoff as a fraction of `reward`, clamped to 0..=1.
    pub fn payoff_share(&self, payload: &XcsPayload) -> f64 {
        if self.reward > 0.0 {
            (payload.prediction / self.reward).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Accuracy `κ` of a rule with prediction error `error`.
    pub fn kappa(&self, error: f64) -> f64 {
        if error < self.error_threshold {
            1.0
        } else {
            self.alpha * (error / self.error_threshold).powf(-self.nu)
        }
    }
}

impl UpdateStrategy for XcsUpdate {
    type Payload = XcsPayload;

    fn create_payload(&self) -> XcsPayload {
        XcsPayload {
            prediction: self.initial_prediction,
            prediction_error: self.initial_error,
            action_set_size: 1.0,
        }
    }

    fn initial_fitness(&self) -> f64 {
        self.initial_fitness
    }

    fn subsumption(&self) -> SubsumptionThresholds {
        SubsumptionThresholds {
            fitness: self.subsumption_fitness,
            experience: self.subsumption_experience,
        }
    }

    fn update_niche(
        &self,
        population: &mut ClassifierSet<XcsPayload>,
        members: &SetView,
        correct: &SetView,
    ) {
        let in_correct = membership(correct, population.len());
        let correct_size = f64::from(correct.total_numerosity());
        let incorrect_size = f64::from(members.total_numerosity() - correct.total_numerosity());

        // Correct and incorrect members form separate action sets.
        let mut kappas = Vec::with_capacity(members.len());
        let mut sums = [0.0, 0.0];
        for &i in members.indices() {
            let classifier = population.get_mut(i);
            let experience = classifier.experience();
            let numerosity = f64::from(classifier.numerosity());
            let (payoff, set_size) = if in_correct[i] {
                (self.reward, correct_size)
            } else {
                (0.0, incorrect_size)
            };
            let payload = classifier.payload_mut();
            payload.prediction = moving_update(payload.prediction, payoff, experience, self.beta);
            payload.prediction_error = moving_update(
                payload.prediction_error,
                (payoff - payload.prediction).abs(),
                experience,
                self.beta,
            );
            payload.action_set_size =
                moving_update(payload.action_set_size, set_size, experience, self.beta);

            let kappa = self.kappa(payload.prediction_error);
            sums[usize::from(in_correct[i])] += kappa * numerosity;
            kappas.push(kappa);
        }

        for (&i, kappa) in members.indices().iter().zip(kappas) {
            let sum = sums[usize::from(in_correct[i])];
            let target = if sum > 0.0 { kappa / sum } else { 0.0 };
            let classifier = population.get_mut(i);
            let fitness = classifier.fitness() + self.beta * (target - classifier.fitness());
            classifier.set_fitness(fitness);
        }
    }

    /// Exploitation weighs fitness by the predicted share of the reward, so
    /// accurately wrong rules do not vote for their action.
    fn comparison_value(&self, mode: ComparisonMode, classifier: &Classifier<XcsPayload>) -> f64 {
        match mode {
            ComparisonMode::Exploitation => {
                classifier.fitness() * self.payoff_share(classifier.payload())
            }
            ComparisonMode::Exploration => classifier.fitness(),
            ComparisonMode::Deletion => {
                deletion_value(classifier.fitness(), classifier.payload().action_set_size)
            }
        }
    }

    /// An exploitation value cannot be set on a rule predicting no payoff;
    /// fitness is then set to the value as given.
    fn set_comparison_value(
        &self,
        mode: ComparisonMode,
        classifier: &mut Classifier<XcsPayload>,
        value: f64,
    ) {
        let fitness = match mode {
            ComparisonMode::Exploitation => {
                let share = self.payoff_share(classifier.payload());
                if share > 0.0 {
                    value / share
                } else {
                    value
                }
            }
            ComparisonMode::Exploration => value,
            ComparisonMode::Deletion => {
                fitness_from_deletion_value(value, classifier.payload().action_set_size)
            }
        };
        classifier.set_fitness(fitness);
    }

    fn offspring_payload(
        &self,
        a: &Classifier<XcsPayload>,
        b: &Classifier<XcsPayload>,
    ) -> (XcsPayload, f64) {
        if !self.inherit_parameters {
            return (self.create_payload(), self.initial_fitness());
        }
        let (pa, pb) = (a.payload(), b.payload());
        let payload = XcsPayload {
            prediction: (pa.prediction + pb.prediction) / 2.0,
            prediction_error: (pa.prediction_error + pb.prediction_error) / 2.0,
            action_set_size: (pa.action_set_size + pb.action_set_size) / 2.0,
        };
        (payload, (a.fitness() + b.fitness()) / 2.0 * 0.1)
    }

    fn describe(&self, payload: &XcsPayload) -> String {
        format!(
            "p={:.3} err={:.3} as={:.3}",
            payload.prediction, payload.prediction_error, payload.action_set_size
        )
    }
}
