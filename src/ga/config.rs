//! GA configuration.
//!
//! [`GaConfig`] holds all parameters of the steady-state, niche-scoped GA.

use super::selection::{Selection, Selector};
use crate::error::{LcsError, Result};

/// When the GA runs on a niche.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GaActivation {
    /// Fires when the niche's numerosity-weighted mean timestamp lags the
    /// current timestamp by at least this many instances.
    Age(u64),
    /// Fires with this probability on every eligible niche.
    Probability(f64),
}

impl Default for GaActivation {
    fn default() -> Self {
        GaActivation::Age(25)
    }
}

/// Configuration for the steady-state GA.
///
/// # Defaults
///
/// ```
/// use u_lcs::ga::{GaActivation, GaConfig};
///
/// let config = GaConfig::default();
/// assert_eq!(config.crossover_rate, 0.8);
/// assert_eq!(config.activation, GaActivation::Age(25));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_lcs::ga::{GaActivation, GaConfig};
///
/// let config = GaConfig::default()
///     .with_activation(GaActivation::Probability(0.1))
///     .with_tournament_size(4)
///     .with_mutation_rate(0.02);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Probability of single-point crossover per breeding (0.0–1.0).
    ///
    /// When crossover is not applied, the children are copies of the
    /// parents.
    pub crossover_rate: f64,

    /// Per-bit flip probability (0.0–1.0).
    pub mutation_rate: f64,

    /// Activation trigger.
    pub activation: GaActivation,

    /// Probability of breeding over the whole match set instead of the
    /// correct set (0.0–1.0).
    pub match_set_run_probability: f64,

    /// Parent selection.
    pub selector: Selector,

    /// Whether offspring may be absorbed by equal or more general members
    /// on insertion.
    pub offspring_subsumption: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            crossover_rate: 0.8,
            mutation_rate: 0.04,
            activation: GaActivation::default(),
            match_set_run_probability: 0.0,
            selector: Selector::default(),
            offspring_subsumption: true,
        }
    }
}

impl GaConfig {
    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the activation trigger. Probabilities are clamped to 0.0–1.0.
    pub fn with_activation(mut self, activation: GaActivation) -> Self {
        self.activation = match activation {
            GaActivation::Probability(p) => GaActivation::Probability(p.clamp(0.0, 1.0)),
            age => age,
        };
        self
    }

    /// Sets the match-set run probability.
    pub fn with_match_set_run_probability(mut self, p: f64) -> Self {
        self.match_set_run_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the parent selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Convenience builder for tournament parent selection.
    ///
    /// Keeps the selector's mode and objective.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.selector.selection = Selection::Tournament(k);
        self
    }

    /// Enables or disables subsumption of offspring on insertion.
    pub fn with_offspring_subsumption(mut self, enabled: bool) -> Self {
        self.offspring_subsumption = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Selection::Tournament(0) = self.selector.selection {
            return Err(LcsError::InvalidConfig(
                "tournament size must be at least 1".into(),
            ));
        }
        if let GaActivation::Probability(p) = self.activation {
            if !(0.0..=1.0).contains(&p) {
                return Err(LcsError::InvalidConfig(
                    "activation probability must be in [0, 1]".into(),
                ));
            }
        }
        if self.crossover_rate.is_nan() || self.mutation_rate.is_nan() {
            return Err(LcsError::InvalidConfig("rates must be numbers".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ComparisonMode;
    use crate::ga::Objective;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.crossover_rate, 0.8);
        assert_eq!(config.mutation_rate, 0.04);
        assert_eq!(config.activation, GaActivation::Age(25));
        assert_eq!(config.selector.selection, Selection::Roulette);
        assert_eq!(config.selector.mode, ComparisonMode::Exploration);
        assert_eq!(config.selector.objective, Objective::Maximize);
        assert!(config.offspring_subsumption);
    }

    #[test]
    fn test_builder() {
        let config = GaConfig::default()
            .with_tournament_size(5)
            .with_activation(GaActivation::Probability(0.3))
            .with_offspring_subsumption(false);
        assert_eq!(config.selector.selection, Selection::Tournament(5));
        assert_eq!(config.activation, GaActivation::Probability(0.3));
        assert!(!config.offspring_subsumption);
    }

    #[test]
    fn test_clamp_rates() {
        let config = GaConfig::default()
            .with_crossover_rate(1.5)
            .with_mutation_rate(-0.1)
            .with_match_set_run_probability(2.0)
            .with_activation(GaActivation::Probability(-1.0));
        assert_eq!(config.crossover_rate, 1.0);
        assert_eq!(config.mutation_rate, 0.0);
        assert_eq!(config.match_set_run_probability, 1.0);
        assert_eq!(config.activation, GaActivation::Probability(0.0));
    }

    #[test]
    fn test_validate_ok() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_tournament() {
        let config = GaConfig::default().with_tournament_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unclamped_probability() {
        let mut config = GaConfig::default();
        config.activation = GaActivation::Probability(1.5);
        assert!(config.validate().is_err());
    }
}
