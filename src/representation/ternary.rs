//! Single-label ternary representation.

use super::condition::TernaryCondition;
use super::{Niche, Representation, Vote};
use crate::chromosome::BitChromosome;
use crate::data::Instances;
use crate::error::{LcsError, Result};
use rand::Rng;

/// Boolean attributes with a ternary (`0`, `1`, `#`) condition and a single
/// class label.
///
/// Layout: two bits per attribute (specific flag, value) followed by the
/// class index on `ceil(log2(class_count))` bits.
///
/// # Examples
///
/// ```
/// use u_lcs::representation::{Representation, TernaryRepresentation};
///
/// let repr = TernaryRepresentation::new(6, 2).with_generalization_rate(0.33);
/// assert_eq!(repr.chromosome_size(), 13);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TernaryRepresentation {
    /// Number of boolean attributes.
    pub attribute_count: usize,

    /// Number of classes.
    pub class_count: usize,

    /// Probability that covering turns an attribute into "don't care".
    pub generalization_rate: f64,
}

impl TernaryRepresentation {
    /// Creates a representation for `attribute_count` attributes and
    /// `class_count` classes.
    pub fn new(attribute_count: usize, class_count: usize) -> Self {
        Self {
            attribute_count,
            class_count,
            generalization_rate: 0.33,
        }
    }

    /// Sets the covering generalization rate.
    pub fn with_generalization_rate(mut self, rate: f64) -> Self {
        self.generalization_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Validates the representation parameters.
    pub fn validate(&self) -> Result<()> {
        if self.attribute_count == 0 {
            return Err(LcsError::InvalidConfig(
                "attribute_count must be at least 1".into(),
            ));
        }
        if self.class_count < 2 {
            return Err(LcsError::InvalidConfig(
                "class_count must be at least 2".into(),
            ));
        }
        Ok(())
    }

    fn condition(&self) -> TernaryCondition {
        TernaryCondition::new(self.attribute_count)
    }

    fn class_bits(&self) -> usize {
        (usize::BITS - self.class_count.saturating_sub(1).leading_zeros()) as usize
    }

    /// Decodes the advocated class.
    pub fn action(&self, chromosome: &BitChromosome) -> usize {
        chromosome.get_int(self.condition().bits(), self.class_bits()) as usize
    }

    fn set_action(&self, chromosome: &mut BitChromosome, class: usize) {
        chromosome.set_int(self.condition().bits(), self.class_bits(), class as u64);
    }
}

impl Representation for TernaryRepresentation {
    fn chromosome_size(&self) -> usize {
        self.condition().bits() + self.class_bits()
    }

    fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    fn label_count(&self) -> usize {
        1
    }

    fn is_match(&self, attributes: &[f64], chromosome: &BitChromosome) -> bool {
        self.condition().matches(chromosome, attributes)
    }

    fn create_covering<G: Rng>(
        &self,
        instances: &Instances,
        index: usize,
        _niche: Niche,
        rng: &mut G,
    ) -> BitChromosome {
        let mut chromosome = BitChromosome::new(self.chromosome_size());
        self.condition().cover(
            &mut chromosome,
            instances.attributes(index),
            self.generalization_rate,
            rng,
        );
        self.set_action(&mut chromosome, instances.label(index));
        chromosome
    }

    fn is_more_general(&self, general: &BitChromosome, specific: &BitChromosome) -> bool {
        self.action(general) == self.action(specific)
            && self.condition().more_general(general, specific)
    }

    fn are_equal(&self, a: &BitChromosome, b: &BitChromosome) -> bool {
        self.action(a) == self.action(b) && self.condition().equal(a, b)
    }

    fn fix_chromosome<G: Rng>(&self, chromosome: &mut BitChromosome, rng: &mut G) {
        if self.action(chromosome) >= self.class_count {
            let class = rng.random_range(0..self.class_count);
            self.set_action(chromosome, class);
        }
    }

    fn niches(&self, _instances: &Instances, _index: usize) -> Vec<Niche> {
        vec![Niche::Action]
    }

    fn is_correct(
        &self,
        chromosome: &BitChromosome,
        instances: &Instances,
        index: usize,
        _niche: Niche,
    ) -> bool {
        self.action(chromosome) == instances.label(index)
    }

    fn classify(&self, votes: &[Vote<'_>]) -> Vec<usize> {
        let mut totals = vec![None::<f64>; self.class_count];
        for vote in votes {
            let class = self.action(vote.chromosome);
            if let Some(slot) = totals.get_mut(class) {
                *slot = Some(slot.unwrap_or(0.0) + vote.weight);
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for (class, total) in totals.iter().enumerate() {
            match (*total, best) {
                (Some(total), Some((_, b))) if total > b => best = Some((class, total)),
                (Some(total), None) => best = Some((class, total)),
                _ => {}
            }
        }
        best.map(|(class, _)| vec![class]).unwrap_or_default()
    }

    fn render(&self, chromosome: &BitChromosome) -> String {
        format!(
            "IF {} THEN class={}",
            self.condition().render(chromosome),
            self.action(chromosome)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn data() -> Instances {
        Instances::new(
            vec![
                vec![1.0, 0.0, 1.0, 2.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_layout() {
        assert_eq!(TernaryRepresentation::new(3, 2).chromosome_size(), 7);
        assert_eq!(TernaryRepresentation::new(3, 3).chromosome_size(), 8);
        assert_eq!(TernaryRepresentation::new(3, 4).chromosome_size(), 8);
        assert_eq!(TernaryRepresentation::new(3, 5).chromosome_size(), 9);
    }

    #[test]
    fn test_covering_matches_and_is_correct() {
        let repr = TernaryRepresentation::new(3, 3).with_generalization_rate(0.5);
        let data = data();
        let mut rng = create_rng(1);
        for _ in 0..50 {
            let c = repr.create_covering(&data, 0, Niche::Action, &mut rng);
            assert_eq!(c.len(), repr.chromosome_size());
            assert!(repr.is_match(data.attributes(0), &c));
            assert!(repr.is_correct(&c, &data, 0, Niche::Action));
            assert_eq!(repr.action(&c), 2);
        }
    }

    #[test]
    fn test_generality_requires_same_action() {
        let repr = TernaryRepresentation::new(2, 2);
        // a0=#, a1=1 => 1
        let general: BitChromosome = "00111".parse().unwrap();
        // a0=0, a1=1 => 1
        let specific: BitChromosome = "10111".parse().unwrap();
        // a0=0, a1=1 => 0
        let other_action: BitChromosome = "10110".parse().unwrap();
        assert!(repr.is_more_general(&general, &specific));
        assert!(!repr.is_more_general(&general, &other_action));
        assert!(!repr.are_equal(&specific, &other_action));
    }

    #[test]
    fn test_fix_rerandomizes_out_of_range_class() {
        let repr = TernaryRepresentation::new(1, 3);
        let mut rng = create_rng(9);
        // class field holds 3 on two bits
        let mut c: BitChromosome = "1011".parse().unwrap();
        assert_eq!(repr.action(&c), 3);
        repr.fix_chromosome(&mut c, &mut rng);
        assert!(repr.action(&c) < 3);
        // condition untouched
        assert!(c.get(0));
        assert!(!c.get(1));
    }

    #[test]
    fn test_classify_weighted_vote() {
        let repr = TernaryRepresentation::new(1, 2);
        let zero: BitChromosome = "000".parse().unwrap();
        let one: BitChromosome = "001".parse().unwrap();
        let votes = [
            Vote { chromosome: &zero, weight: 0.4 },
            Vote { chromosome: &one, weight: 0.3 },
            Vote { chromosome: &one, weight: 0.3 },
        ];
        assert_eq!(repr.classify(&votes), vec![1]);
        assert!(repr.classify(&[]).is_empty());
    }

    #[test]
    fn test_render() {
        let repr = TernaryRepresentation::new(2, 2);
        let c: BitChromosome = "11001".parse().unwrap();
        assert_eq!(repr.render(&c), "IF a0=1 THEN class=1");
    }
}
