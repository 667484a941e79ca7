//! Multi-label ternary representation with per-label niches.

use super::condition::TernaryCondition;
use super::{Niche, Representation, Vote};
use crate::chromosome::BitChromosome;
use crate::data::Instances;
use crate::error::{LcsError, Result};
use rand::Rng;

/// Boolean attributes with a ternary condition and a ternary consequent over
/// `label_count` binary labels.
///
/// Layout: the ternary condition (two bits per attribute) followed by two
/// bits per label (specific flag, value). A rule only takes part in the
/// credit assignment of labels it is specific on, so every instance is
/// decomposed into one [`Niche::Label`] per label.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiLabelRepresentation {
    /// Number of boolean attributes.
    pub attribute_count: usize,

    /// Number of binary labels.
    pub label_count: usize,

    /// Probability that covering turns an attribute into "don't care".
    pub generalization_rate: f64,

    /// Probability that covering leaves a label other than the covered one
    /// unspecified.
    pub label_generalization_rate: f64,
}

impl MultiLabelRepresentation {
    /// Creates a representation for `attribute_count` boolean attributes and `label_count` labels.
    pub fn new(attribute_count: usize, label_count: usize) -> Self {
        Self {
            attribute_count,
            label_count,
            generalization_rate: 0.33,
            label_generalization_rate: 0.5,
        }
    }

    /// Sets the probability that covering generalizes an attribute.
    pub fn with_generalization_rate(mut self, rate: f64) -> Self {
        self.generalization_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the probability that covering leaves another label unspecified.
    pub fn with_label_generalization_rate(mut self, rate: f64) -> Self {
        self.label_generalization_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Validates the representation parameters.
    pub fn validate(&self) -> Result<()> {
        if self.attribute_count == 0 {
            return Err(LcsError::InvalidConfig(
                "attribute_count must be at least 1".into(),
            ));
        }
        if self.label_count == 0 {
            return Err(LcsError::InvalidConfig(
                "label_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn condition(&self) -> TernaryCondition {
        TernaryCondition::new(self.attribute_count)
    }

    fn label_bit(&self, label: usize) -> usize {
        self.condition().bits() + 2 * label
    }

    /// Whether the rule states a value for `label`.
    pub fn is_label_specific(&self, chromosome: &BitChromosome, label: usize) -> bool {
        chromosome.get(self.label_bit(label))
    }

    /// The value the rule states for `label` (meaningless when not specific).
    pub fn label_value(&self, chromosome: &BitChromosome, label: usize) -> bool {
        chromosome.get(self.label_bit(label) + 1)
    }

    fn set_label(&self, chromosome: &mut BitChromosome, label: usize, value: Option<bool>) {
        let bit = self.label_bit(label);
        match value {
            Some(v) => {
                chromosome.set(bit);
                chromosome.assign(bit + 1, v);
            }
            None => {
                chromosome.clear(bit);
                chromosome.clear(bit + 1);
            }
        }
    }

    fn labels_equal(&self, a: &BitChromosome, b: &BitChromosome) -> bool {
        (0..self.label_count).all(|l| {
            let specific = self.is_label_specific(a, l);
            specific == self.is_label_specific(b, l)
                && (!specific || self.label_value(a, l) == self.label_value(b, l))
        })
    }
}

impl Representation for MultiLabelRepresentation {
    fn chromosome_size(&self) -> usize {
        self.condition().bits() + 2 * self.label_count
    }

    fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    fn label_count(&self) -> usize {
        self.label_count
    }

    fn is_match(&self, attributes: &[f64], chromosome: &BitChromosome) -> bool {
        self.condition().matches(chromosome, attributes)
    }

    fn create_covering<G: Rng>(
        &self,
        instances: &Instances,
        index: usize,
        niche: Niche,
        rng: &mut G,
    ) -> BitChromosome {
        let mut chromosome = BitChromosome::new(self.chromosome_size());
        self.condition().cover(
            &mut chromosome,
            instances.attributes(index),
            self.generalization_rate,
            rng,
        );
        for label in 0..self.label_count {
            let forced = niche == Niche::Label(label);
            let value = if forced || !rng.random_bool(self.label_generalization_rate) {
                Some(instances.is_label_active(index, label))
            } else {
                None
            };
            self.set_label(&mut chromosome, label, value);
        }
        // a rule covering the whole action must say something
        if (0..self.label_count).all(|l| !self.is_label_specific(&chromosome, l)) {
            let label = rng.random_range(0..self.label_count);
            self.set_label(
                &mut chromosome,
                label,
                Some(instances.is_label_active(index, label)),
            );
        }
        chromosome
    }

    fn is_more_general(&self, general: &BitChromosome, specific: &BitChromosome) -> bool {
        self.labels_equal(general, specific) && self.condition().more_general(general, specific)
    }

    fn are_equal(&self, a: &BitChromosome, b: &BitChromosome) -> bool {
        self.labels_equal(a, b) && self.condition().equal(a, b)
    }

    fn fix_chromosome<G: Rng>(&self, chromosome: &mut BitChromosome, rng: &mut G) {
        if (0..self.label_count).all(|l| !self.is_label_specific(chromosome, l)) {
            let label = rng.random_range(0..self.label_count);
            let value = rng.random_bool(0.5);
            self.set_label(chromosome, label, Some(value));
        }
    }

    fn niches(&self, _instances: &Instances, _index: usize) -> Vec<Niche> {
        (0..self.label_count).map(Niche::Label).collect()
    }

    fn advocates(&self, chromosome: &BitChromosome, niche: Niche) -> bool {
        match niche {
            Niche::Action => true,
            Niche::Label(l) => self.is_label_specific(chromosome, l),
        }
    }

    fn is_correct(
        &self,
        chromosome: &BitChromosome,
        instances: &Instances,
        index: usize,
        niche: Niche,
    ) -> bool {
        let label_ok = |l: usize| {
            self.is_label_specific(chromosome, l)
                && self.label_value(chromosome, l) == instances.is_label_active(index, l)
        };
        match niche {
            Niche::Label(l) => label_ok(l),
            Niche::Action => {
                let specific: Vec<usize> = (0..self.label_count)
                    .filter(|&l| self.is_label_specific(chromosome, l))
                    .collect();
                !specific.is_empty() && specific.into_iter().all(label_ok)
            }
        }
    }

    fn classify(&self, votes: &[Vote<'_>]) -> Vec<usize> {
        let mut support = vec![0.0f64; self.label_count];
        let mut against = vec![0.0f64; self.label_count];
        for vote in votes {
            for label in 0..self.label_count {
                if !self.is_label_specific(vote.chromosome, label) {
                    continue;
                }
                if self.label_value(vote.chromosome, label) {
                    support[label] += vote.weight;
                } else {
                    against[label] += vote.weight;
                }
            }
        }
        (0..self.label_count)
            .filter(|&l| support[l] > against[l])
            .collect()
    }

    fn render(&self, chromosome: &BitChromosome) -> String {
        let consequent: Vec<String> = (0..self.label_count)
            .filter(|&l| self.is_label_specific(chromosome, l))
            .map(|l| format!("l{l}={}", u8::from(self.label_value(chromosome, l))))
            .collect();
        format!(
            "IF {} THEN {}",
            self.condition().render(chromosome),
            consequent.join(", ")
        )
    }
}
