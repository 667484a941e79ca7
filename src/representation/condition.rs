//! Ternary condition encoding shared by the boolean representations.
//!
//! Attribute `i` occupies bits `2i` (specific flag) and `2i + 1` (value).
//! A clear specific flag means "don't care"; its value bit is ignored.

use crate::chromosome::BitChromosome;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TernaryCondition {
    attributes: usize,
}

impl TernaryCondition {
    pub(crate) fn new(attributes: usize) -> Self {
        Self { attributes }
    }

    pub(crate) fn bits(&self) -> usize {
        2 * self.attributes
    }

    #[inline]
    pub(crate) fn is_specific(&self, c: &BitChromosome, attribute: usize) -> bool {
        c.get(2 * attribute)
    }

    #[inline]
    pub(crate) fn value(&self, c: &BitChromosome, attribute: usize) -> bool {
        c.get(2 * attribute + 1)
    }

    pub(crate) fn specific_count(&self, c: &BitChromosome) -> usize {
        (0..self.attributes)
            .filter(|&i| self.is_specific(c, i))
            .count()
    }

    pub(crate) fn matches(&self, c: &BitChromosome, attributes: &[f64]) -> bool {
        (0..self.attributes)
            .all(|i| !self.is_specific(c, i) || self.value(c, i) == (attributes[i] > 0.5))
    }

    /// Writes a condition matching `attributes`, generalizing each attribute
    /// with probability `generalization_rate`.
    pub(crate) fn cover<G: Rng>(
        &self,
        c: &mut BitChromosome,
        attributes: &[f64],
        generalization_rate: f64,
        rng: &mut G,
    ) {
        for i in 0..self.attributes {
            if rng.random_bool(generalization_rate) {
                c.clear(2 * i);
                c.clear(2 * i + 1);
            } else {
                c.set(2 * i);
                c.assign(2 * i + 1, attributes[i] > 0.5);
            }
        }
    }

    pub(crate) fn equal(&self, a: &BitChromosome, b: &BitChromosome) -> bool {
        (0..self.attributes).all(|i| {
            let specific = self.is_specific(a, i);
            specific == self.is_specific(b, i) && (!specific || self.value(a, i) == self.value(b, i))
        })
    }

    /// Strict generality: every constraint of `general` appears in
    /// `specific`, and `specific` has at least one more.
    pub(crate) fn more_general(&self, general: &BitChromosome, specific: &BitChromosome) -> bool {
        let covers = (0..self.attributes).all(|i| {
            !self.is_specific(general, i)
                || (self.is_specific(specific, i) && self.value(general, i) == self.value(specific, i))
        });
        covers && self.specific_count(general) < self.specific_count(specific)
    }

    pub(crate) fn render(&self, c: &BitChromosome) -> String {
        let terms: Vec<String> = (0..self.attributes)
            .filter(|&i| self.is_specific(c, i))
            .map(|i| format!("a{i}={}", u8::from(self.value(c, i))))
            .collect();
        if terms.is_empty() {
            "TRUE".to_string()
        } else {
            terms.join(" AND ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    // attribute pairs written as (specific, value)
    fn cond(pairs: &[(bool, bool)]) -> BitChromosome {
        let bits: Vec<bool> = pairs.iter().flat_map(|&(s, v)| [s, v]).collect();
        BitChromosome::from_bits(&bits)
    }

    #[test]
    fn test_matches_respects_dont_care() {
        let tc = TernaryCondition::new(3);
        let c = cond(&[(true, true), (false, true), (true, false)]);
        assert!(tc.matches(&c, &[1.0, 0.0, 0.0]));
        assert!(tc.matches(&c, &[1.0, 1.0, 0.0]));
        assert!(!tc.matches(&c, &[0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_equal_ignores_dont_care_value() {
        let tc = TernaryCondition::new(2);
        let a = cond(&[(false, true), (true, true)]);
        let b = cond(&[(false, false), (true, true)]);
        assert!(tc.equal(&a, &b));
        let c = cond(&[(true, false), (true, true)]);
        assert!(!tc.equal(&a, &c));
    }

    #[test]
    fn test_more_general_is_strict() {
        let tc = TernaryCondition::new(2);
        let general = cond(&[(false, false), (true, true)]);
        let specific = cond(&[(true, false), (true, true)]);
        assert!(tc.more_general(&general, &specific));
        assert!(!tc.more_general(&specific, &general));
        assert!(!tc.more_general(&general, &general));

        let conflicting = cond(&[(true, false), (true, false)]);
        assert!(!tc.more_general(&general, &conflicting));
    }

    #[test]
    fn test_cover_always_matches() {
        let tc = TernaryCondition::new(6);
        let mut rng = create_rng(5);
        let attributes = [1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        for _ in 0..100 {
            let mut c = BitChromosome::new(tc.bits());
            tc.cover(&mut c, &attributes, 0.4, &mut rng);
            assert!(tc.matches(&c, &attributes));
        }
    }

    #[test]
    fn test_render() {
        let tc = TernaryCondition::new(3);
        let c = cond(&[(true, true), (false, false), (true, false)]);
        assert_eq!(tc.render(&c), "a0=1 AND a2=0");
        assert_eq!(tc.render(&BitChromosome::new(6)), "TRUE");
    }
}
