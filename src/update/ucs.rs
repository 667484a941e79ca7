//! sUpervised Classifier System update.

use super::{
    deletion_value, fitness_from_deletion_value, membership, moving_update,
    SubsumptionThresholds, UpdateStrategy,
};
use crate::classifier::{Classifier, ComparisonMode};
use crate::error::{LcsError, Result};
use crate::population::{ClassifierSet, SetView};

/// UCS statistics of one classifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UcsPayload {
    pub true_positives: u64,
    pub match_appearances: u64,
    /// Correct-set size estimate.
    pub correct_set_size: f64,
}

impl Default for UcsPayload {
    fn default() -> Self {
        Self {
            true_positives: 0,
            match_appearances: 0,
            correct_set_size: 1.0,
        }
    }
}

impl UcsPayload {
    /// True positives per match-set appearance (0 before the first update).
    pub fn accuracy(&self) -> f64 {
        if self.match_appearances == 0 {
            0.0
        } else {
            self.true_positives as f64 / self.match_appearances as f64
        }
    }
}

/// UCS update: fitness tracks each rule's share of the correct set's
/// accuracy.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UcsUpdate {
    /// Accuracy above which a rule is considered fully accurate.
    pub acc0: f64,
    /// Accuracy fall-off scale below `acc0`.
    pub alpha: f64,
    /// Accuracy fall-off exponent.
    pub nu: f64,
    /// Learning rate.
    pub beta: f64,
    pub subsumption_fitness: f64,
    pub subsumption_experience: u64,
}

impl Default for UcsUpdate {
    fn default() -> Self {
        Self {
            acc0: 0.99,
            alpha: 0.1,
            nu: 10.0,
            beta: 0.2,
            subsumption_fitness: 0.99,
            subsumption_experience: 20,
        }
    }
}

impl UcsUpdate {
    /// Sets the accuracy threshold `acc0`.
    pub fn with_acc0(mut self, acc0: f64) -> Self {
        self.acc0 = acc0.clamp(0.0, 1.0);
        self
    }

    /// Sets the accuracy fall-off scale.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the accuracy fall-off exponent.
    pub fn with_nu(mut self, nu: f64) -> Self {
        self.nu = nu;
        self
    }

    /// Sets the learning rate.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta.clamp(0.0, 1.0);
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
        if !(self.acc0 > 0.0) {
            return Err(LcsError::InvalidConfig("acc0 must be in (0, 1]".into()));
        }
        Ok(())
    }

    /// Relative accuracy `κ` of a rule with accuracy `acc`.
    pub fn kappa(&self, acc: f64) -> f64 {
        if acc > self.acc0 {
            1.0
        } else {
            self.alpha * (acc / self.acc0).powf(self.nu)
        }
    }
}

impl UpdateStrategy for UcsUpdate {
    type Payload = UcsPayload;

    fn create_payload(&self) -> UcsPayload {
        UcsPayload::default()
    }

    fn initial_fitness(&self) -> f64 {
        0.01
    }

    fn subsumption(&self) -> SubsumptionThresholds {
        SubsumptionThresholds {
            fitness: self.subsumption_fitness,
            experience: self.subsumption_experience,
        }
    }

    fn update_niche(
        &self,
        population: &mut ClassifierSet<UcsPayload>,
        members: &SetView,
        correct: &SetView,
    ) {
        let in_correct = membership(correct, population.len());
        let correct_size = f64::from(correct.total_numerosity());

        let mut kappas = Vec::with_capacity(members.len());
        let mut kappa_sum = 0.0;
        for &i in members.indices() {
            let classifier = population.get_mut(i);
            let numerosity = f64::from(classifier.numerosity());
            let payload = classifier.payload_mut();
            payload.match_appearances += 1;
            let kappa = if in_correct[i] {
                payload.true_positives += 1;
                payload.correct_set_size = moving_update(
                    payload.correct_set_size,
                    correct_size,
                    payload.true_positives,
                    self.beta,
                );
                self.kappa(payload.accuracy()) * numerosity
            } else {
                0.0
            };
            kappa_sum += kappa;
            kappas.push(kappa);
        }

        for (&i, kappa) in members.indices().iter().zip(kappas) {
            let target = if kappa_sum > 0.0 { kappa / kappa_sum } else { 0.0 };
            let classifier = population.get_mut(i);
            let fitness = classifier.fitness() + self.beta * (target - classifier.fitness());
            classifier.set_fitness(fitness);
        }
    }

    fn comparison_value(&self, mode: ComparisonMode, classifier: &Classifier<UcsPayload>) -> f64 {
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
        classifier: &mut Classifier<UcsPayload>,
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

    fn describe(&self, payload: &UcsPayload) -> String {
        format!(
            "acc={:.4} tp={} msa={} cs={:.3}",
            payload.accuracy(),
            payload.true_positives,
            payload.match_appearances,
            payload.correct_set_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Macroclassifier;
    use crate::representation::TernaryRepresentation;

    #[test]
    fn test_kappa() {
        let ucs = UcsUpdate::default();
        assert_eq!(ucs.kappa(1.0), 1.0);
        assert!((ucs.kappa(0.99) - 0.1).abs() < 1e-12);
        assert!(ucs.kappa(0.5) < 0.001);
    }

    #[test]
    fn test_fitness_moves_towards_relative_accuracy() {
        let repr = TernaryRepresentation::new(2, 2);
        let ucs = UcsUpdate::default();
        let mut set = ClassifierSet::new();
        for (bits, n) in [("11001", 1), ("00001", 3), ("11000", 1)] {
            let cl = ucs.create_classifier(bits.parse().unwrap());
            set.add_classifier(Macroclassifier::new(cl, n), true, &repr);
        }
        let members = set.full_view();
        let mut correct = SetView::new();
        correct.push(0, 1);
        correct.push(1, 3);

        ucs.update_niche(&mut set, &members, &correct);

        // both correct rules are fully accurate; shares are 1/4 and 3/4
        let f0 = 0.01 + 0.2 * (0.25 - 0.01);
        let f1 = 0.01 + 0.2 * (0.75 - 0.01);
        let f2 = 0.01 + 0.2 * (0.0 - 0.01);
        assert!((set.get(0).fitness() - f0).abs() < 1e-12);
        assert!((set.get(1).fitness() - f1).abs() < 1e-12);
        assert!((set.get(2).fitness() - f2).abs() < 1e-12);
        assert!((set.get(0).payload().correct_set_size - 4.0).abs() < 1e-12);
        assert_eq!(set.get(2).payload().true_positives, 0);
        assert_eq!(set.get(2).payload().match_appearances, 1);
    }

    #[test]
    fn test_validate() {
        assert!(UcsUpdate::default().validate().is_ok());
        assert!(UcsUpdate::default().with_beta(0.0).validate().is_err());
    }
}
