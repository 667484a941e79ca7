//! Selection over classifier sets.
//!
//! Selection picks macroclassifiers from a view of the population, by
//! their comparison value under a [`ComparisonMode`]. The GA uses it to pick
//! parents and population control uses it to pick deletion victims.
//!
//! Every scheme is numerosity-aware: a macroclassifier standing for `n`
//! copies competes as `n` micro-classifiers.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Butz, Sastry & Goldberg (2003), "Tournament Selection in XCS"

use crate::classifier::ComparisonMode;
use crate::population::{ClassifierSet, SetView};
use crate::update::UpdateStrategy;
use rand::Rng;

const EPSILON: f64 = 1e-10;

/// Selection scheme.
///
/// # Examples
///
/// ```
/// use u_lcs::ga::Selection;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
///
/// // Roulette wheel (value-proportionate)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Draw `k` micro-classifiers uniformly, keep the best.
    ///
    /// Ties go to the participant drawn first.
    ///
    /// # Complexity
    /// O(k log n) per selection
    Tournament(usize),

    /// Value-proportionate selection.
    ///
    /// Weights are `numerosity × value` when maximizing and
    /// `numerosity / value` when minimizing. Non-positive values are
    /// clamped to a tiny epsilon.
    ///
    /// # Complexity
    /// O(n) per selection
    Roulette,

    /// Deterministic arg-max (or arg-min) of `value × numerosity`.
    ///
    /// Ties go to the more experienced classifier, then to the first found.
    Best,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Roulette
    }
}

/// Direction of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Objective {
    #[default]
    Maximize,
    Minimize,
}

impl Objective {
    /// Whether `a` is strictly better than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Objective::Maximize => a > b,
            Objective::Minimize => a < b,
        }
    }
}

/// One selectable entry: a population index and what selection reads from
/// it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub numerosity: u32,
    pub value: f64,
    pub experience: u64,
}

/// A selection scheme bound to a comparison mode and an objective.
///
/// # Examples
///
/// ```
/// use u_lcs::classifier::ComparisonMode;
/// use u_lcs::ga::{Objective, Selection, Selector};
///
/// let parents = Selector::new(Selection::Tournament(4), ComparisonMode::Exploration, Objective::Maximize);
/// let victims = Selector::deletion();
/// assert_eq!(victims.objective, Objective::Minimize);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector {
    pub selection: Selection,
    pub mode: ComparisonMode,
    pub objective: Objective,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(Selection::Roulette, ComparisonMode::Exploration, Objective::Maximize)
    }
}

impl Selector {
    /// Creates a selector from its three parts.
    pub fn new(selection: Selection, mode: ComparisonMode, objective: Objective) -> Self {
        Self {
            selection,
            mode,
            objective,
        }
    }

    /// Roulette over deletion values, lowest first.
    pub fn deletion() -> Self {
        Self::new(Selection::Roulette, ComparisonMode::Deletion, Objective::Minimize)
    }

    /// Reads the candidates of `view` under this selector's mode.
    pub fn candidates<U: UpdateStrategy>(
        &self,
        population: &ClassifierSet<U::Payload>,
        view: &SetView,
        strategy: &U,
    ) -> Vec<Candidate> {
        view.iter(population)
            .map(|(index, m)| Candidate {
                index,
                numerosity: m.numerosity(),
                value: strategy.comparison_value(self.mode, m),
                experience: m.experience(),
            })
            .collect()
    }

    /// Selects one member of `view`; returns its population index.
    ///
    /// # Panics
    /// Panics if `view` is empty.
    pub fn select<U: UpdateStrategy, G: Rng>(
        &self,
        population: &ClassifierSet<U::Payload>,
        view: &SetView,
        strategy: &U,
        rng: &mut G,
    ) -> usize {
        let candidates = self.candidates(population, view, strategy);
        let chosen = self.select_from(&candidates, rng);
        candidates[chosen].index
    }

    /// Selects `count` members of `view` independently, with replacement.
    ///
    /// # Panics
    /// Panics if `view` is empty and `count > 0`.
    pub fn select_many<U: UpdateStrategy, G: Rng>(
        &self,
        population: &ClassifierSet<U::Payload>,
        view: &SetView,
        strategy: &U,
        count: usize,
        rng: &mut G,
    ) -> Vec<usize> {
        let candidates = self.candidates(population, view, strategy);
        (0..count)
            .map(|_| candidates[self.select_from(&candidates, rng)].index)
            .collect()
    }

    /// Selects a position in `candidates`.
    ///
    /// # Panics
    /// Panics if `candidates` is empty.
    pub fn select_from<G: Rng>(&self, candidates: &[Candidate], rng: &mut G) -> usize {
        assert!(!candidates.is_empty(), "cannot select from empty set");

        match self.selection {
            Selection::Tournament(k) => tournament(candidates, k, self.objective, rng),
            Selection::Roulette => roulette(candidates, self.objective, rng),
            Selection::Best => best(candidates, self.objective),
        }
    }
}

/// Maps micro-classifier index `micro` to the position of its owner.
fn owner_of(cumulative: &[u64], micro: u64) -> usize {
    cumulative.partition_point(|&end| end <= micro)
}

fn cumulative_numerosity(candidates: &[Candidate]) -> Vec<u64> {
    candidates
        .iter()
        .scan(0u64, |acc, c| {
            *acc += u64::from(c.numerosity);
            Some(*acc)
        })
        .collect()
}

/// Tournament over explicit micro-classifier participants.
///
/// `participants` are micro indices in `[0, Σ numerosity)`. Returns the
/// position of the winning candidate.
///
/// # Panics
/// Panics if `participants` is empty or an index is out of range.
pub fn tournament_with_participants(
    candidates: &[Candidate],
    participants: &[u64],
    objective: Objective,
) -> usize {
    assert!(!participants.is_empty(), "tournament needs participants");
    let cumulative = cumulative_numerosity(candidates);
    let total = cumulative.last().copied().unwrap_or(0);

    let mut winner: Option<usize> = None;
    for &micro in participants {
        assert!(micro < total, "micro index {micro} out of range for {total} classifiers");
        let pos = owner_of(&cumulative, micro);
        winner = match winner {
            Some(w) if !objective.is_better(candidates[pos].value, candidates[w].value) => Some(w),
            _ => Some(pos),
        };
    }
    winner.unwrap_or(0)
}

fn tournament<G: Rng>(candidates: &[Candidate], k: usize, objective: Objective, rng: &mut G) -> usize {
    let total: u64 = candidates.iter().map(|c| u64::from(c.numerosity)).sum();
    if total == 0 {
        return rng.random_range(0..candidates.len());
    }
    let participants: Vec<u64> = (0..k.max(1)).map(|_| rng.random_range(0..total)).collect();
    tournament_with_participants(candidates, &participants, objective)
}

fn roulette<G: Rng>(candidates: &[Candidate], objective: Objective, rng: &mut G) -> usize {
    let n = candidates.len();
    if n == 1 {
        return 0;
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|c| {
            let num = f64::from(c.numerosity);
            let value = if c.value.is_nan() { 0.0 } else { c.value };
            match objective {
                Objective::Maximize => num * value.max(EPSILON),
                Objective::Minimize => num / value.max(EPSILON),
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

fn best(candidates: &[Candidate], objective: Objective) -> usize {
    let score = |c: &Candidate| c.value * f64::from(c.numerosity);
    let mut winner = 0;
    for (i, c) in candidates.iter().enumerate().skip(1) {
        let w = &candidates[winner];
        let (a, b) = (score(c), score(w));
        if objective.is_better(a, b) || (a == b && c.experience > w.experience) {
            winner = i;
        }
    }
    winner
}
