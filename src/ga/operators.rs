//! Genetic operators for bit chromosomes.
//!
//! # Crossover Operators
//!
//! - [`single_point_crossover`]: exchange the suffixes of two parents at a
//!   given cut point
//! - [`random_single_point_crossover`]: the same at a uniformly random cut
//!
//! # Mutation Operators
//!
//! - [`bitwise_mutation`]: flip every bit independently with a fixed rate
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*

use crate::chromosome::BitChromosome;
use rand::Rng;

// ============================================================================
// Crossover operators
// ============================================================================

/// Single-point crossover at cut `pos`.
///
/// Returns `A[..pos] + B[pos..]` and `B[..pos] + A[pos..]`. `pos` may be
/// `0` or `len`, in which case the children are copies of the parents.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or `pos > len`.
pub fn single_point_crossover(
    a: &BitChromosome,
    b: &BitChromosome,
    pos: usize,
) -> (BitChromosome, BitChromosome) {
    let n = a.len();
    assert_eq!(n, b.len(), "parents must have equal length");
    assert!(pos <= n, "cut point {pos} out of range for length {n}");

    let mut first = a.clone();
    let mut second = b.clone();
    first.splice(pos, &b.sub_chromosome(pos, n - pos));
    second.splice(pos, &a.sub_chromosome(pos, n - pos));
    (first, second)
}

/// Single-point crossover at a cut drawn uniformly from `[0, len]`.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn random_single_point_crossover<R: Rng>(
    a: &BitChromosome,
    b: &BitChromosome,
    rng: &mut R,
) -> (BitChromosome, BitChromosome) {
    let pos = rng.random_range(0..=a.len());
    single_point_crossover(a, b, pos)
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Flips each bit independently with probability `rate`.
///
/// Returns the number of flipped bits.
pub fn bitwise_mutation<R: Rng>(chromosome: &mut BitChromosome, rate: f64, rng: &mut R) -> usize {
    if rate <= 0.0 {
        return 0;
    }
    let rate = rate.min(1.0);
    let mut flipped = 0;
    for i in 0..chromosome.len() {
        if rng.random_bool(rate) {
            chromosome.invert(i);
            flipped += 1;
        }
    }
    flipped
}

// ============================================================================
// Tests
// ============================================================================
