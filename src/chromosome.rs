//! Fixed-length bit chromosome.
//!
//! [`BitChromosome`] is the genetic material of every classifier. It carries
//! no semantics of its own: a [`Representation`](crate::representation::Representation)
//! decides which bits form the condition and which form the action.
//!
//! Bits are packed into `u64` words. Bits past `len` are kept at zero, so the
//! derived `PartialEq` and `Hash` are plain bitwise comparisons.

use crate::error::LcsError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

const WORD_BITS: usize = 64;

/// A fixed-length vector of bits.
///
/// # Examples
///
/// ```
/// use u_lcs::chromosome::BitChromosome;
///
/// let mut c = BitChromosome::new(8);
/// c.set(0);
/// c.set_int(4, 3, 5);
/// assert_eq!(c.to_string(), "10001010");
/// assert_eq!(c.get_int(4, 3), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitChromosome {
    words: Vec<u64>,
    len: usize,
}

impl BitChromosome {
    /// Creates an all-zero chromosome of `len` bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Creates a chromosome from a slice of booleans (index 0 first).
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut chromosome = Self::new(bits.len());
        for (i, &bit) in bits.iter().enumerate() {
            chromosome.assign(i, bit);
        }
        chromosome
    }

    /// Creates a chromosome with every bit drawn uniformly at random.
    pub fn random<R: Rng>(len: usize, rng: &mut R) -> Self {
        let mut chromosome = Self::new(len);
        for i in 0..len {
            chromosome.assign(i, rng.random_bool(0.5));
        }
        chromosome
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-length chromosome.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "bit index {index} out of range for chromosome of length {}",
            self.len
        );
    }

    /// Reads one bit.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.check_index(index);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Sets one bit to 1.
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.check_index(index);
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    /// Sets one bit to 0.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        self.check_index(index);
        self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
    }

    /// Sets one bit to `value`.
    #[inline]
    pub fn assign(&mut self, index: usize, value: bool) {
        if value {
            self.set(index);
        } else {
            self.clear(index);
        }
    }

    /// Flips one bit.
    #[inline]
    pub fn invert(&mut self, index: usize) {
        self.check_index(index);
        self.words[index / WORD_BITS] ^= 1 << (index % WORD_BITS);
    }

    /// Reads the unsigned integer stored in `width` bits starting at `offset`.
    ///
    /// The least significant bit of the integer lives at `offset`.
    ///
    /// # Panics
    /// Panics if `width > 64` or the range exceeds the chromosome.
    pub fn get_int(&self, offset: usize, width: usize) -> u64 {
        assert!(width <= 64, "integer width {width} exceeds 64 bits");
        assert!(
            offset + width <= self.len,
            "integer range {offset}..{} out of range for chromosome of length {}",
            offset + width,
            self.len
        );
        (0..width).fold(0u64, |acc, j| acc | (u64::from(self.get(offset + j)) << j))
    }

    /// Stores `value` in `width` bits starting at `offset`.
    ///
    /// Values that do not fit are clamped to `2^width - 1`.
    ///
    /// # Panics
    /// Panics if `width > 64` or the range exceeds the chromosome.
    pub fn set_int(&mut self, offset: usize, width: usize, value: u64) {
        assert!(width <= 64, "integer width {width} exceeds 64 bits");
        assert!(
            offset + width <= self.len,
            "integer range {offset}..{} out of range for chromosome of length {}",
            offset + width,
            self.len
        );
        let max = if width == 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        let value = value.min(max);
        for j in 0..width {
            self.assign(offset + j, (value >> j) & 1 == 1);
        }
    }

    /// Copies `len` bits starting at `from` into a new chromosome.
    pub fn sub_chromosome(&self, from: usize, len: usize) -> Self {
        assert!(
            from + len <= self.len,
            "sub-range {from}..{} out of range for chromosome of length {}",
            from + len,
            self.len
        );
        let mut out = Self::new(len);
        for j in 0..len {
            out.assign(j, self.get(from + j));
        }
        out
    }

    /// Overwrites the bits starting at `at` with the whole of `other`.
    pub fn splice(&mut self, at: usize, other: &BitChromosome) {
        assert!(
            at + other.len <= self.len,
            "splice range {at}..{} out of range for chromosome of length {}",
            at + other.len,
            self.len
        );
        for j in 0..other.len {
            self.assign(at + j, other.get(j));
        }
    }

    /// Number of bits set to 1.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the bits, index 0 first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl fmt::Display for BitChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitChromosome {
    type Err = LcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(LcsError::InvalidChromosome(format!(
                    "unexpected character {other:?} in bit string"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_bits(&bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_single_bit_ops() {
        let mut c = BitChromosome::new(70);
        assert_eq!(c.len(), 70);
        assert_eq!(c.count_ones(), 0);

        c.set(0);
        c.set(69);
        assert!(c.get(0));
        assert!(c.get(69));
        assert!(!c.get(35));

        c.invert(35);
        assert!(c.get(35));
        c.clear(35);
        assert!(!c.get(35));

        c.assign(64, true);
        assert_eq!(c.count_ones(), 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let c = BitChromosome::new(4);
        c.get(4);
    }

    #[test]
    fn test_int_codec() {
        let mut c = BitChromosome::new(16);
        c.set_int(3, 5, 19);
        assert_eq!(c.get_int(3, 5), 19);
        assert!(!c.get(2));
        assert!(!c.get(8));
    }

    #[test]
    fn test_int_codec_clamps() {
        let mut c = BitChromosome::new(8);
        c.set_int(0, 3, 100);
        assert_eq!(c.get_int(0, 3), 7);
        assert_eq!(c.get_int(3, 5), 0);
    }

    #[test]
    fn test_int_codec_full_word() {
        let mut c = BitChromosome::new(80);
        c.set_int(10, 64, u64::MAX - 1);
        assert_eq!(c.get_int(10, 64), u64::MAX - 1);
    }

    #[test]
    fn test_sub_and_splice() {
        let a: BitChromosome = "1100110011".parse().unwrap();
        let sub = a.sub_chromosome(2, 5);
        assert_eq!(sub.to_string(), "00110");

        let mut b = BitChromosome::new(10);
        b.splice(5, &sub);
        assert_eq!(b.to_string(), "0000000110");
    }

    #[test]
    fn test_parse_and_display() {
        let c: BitChromosome = "0110".parse().unwrap();
        assert_eq!(c.len(), 4);
        assert!(!c.get(0));
        assert!(c.get(1));
        assert_eq!(c.to_string(), "0110");
        assert!("01x0".parse::<BitChromosome>().is_err());
    }

    #[test]
    fn test_equality_is_bitwise() {
        let a: BitChromosome = "101".parse().unwrap();
        let mut b = BitChromosome::new(3);
        b.set(0);
        b.set(2);
        assert_eq!(a, b);
        b.invert(1);
        assert_ne!(a, b);
        // different lengths never compare equal
        assert_ne!(BitChromosome::new(3), BitChromosome::new(4));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut rng = create_rng(11);
        let a = BitChromosome::random(40, &mut rng);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.invert(17);
        assert_ne!(a, b);
    }
}
