//! Training configuration.

use crate::error::{LcsError, Result};
use crate::ga::{GaConfig, Selector};

/// Configuration of an [`Lcs`](super::Lcs) training run.
///
/// # Defaults
///
/// ```
/// use u_lcs::lcs::LcsConfig;
///
/// let config = LcsConfig::default();
/// assert_eq!(config.passes, 100);
/// assert_eq!(config.population_capacity, 1000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_lcs::ga::GaConfig;
/// use u_lcs::lcs::LcsConfig;
///
/// let config = LcsConfig::default()
///     .with_passes(50)
///     .with_population_capacity(400)
///     .with_seed(42)
///     .with_ga(GaConfig::default().with_tournament_size(4));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LcsConfig {
    /// Full passes over the training instances.
    pub passes: usize,

    /// Observers run after every `callback_frequency` passes.
    ///
    /// Set to 0 to never call observers.
    pub callback_frequency: usize,

    /// Maximum total numerosity kept by population control.
    pub population_capacity: u32,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Genetic algorithm parameters.
    pub ga: GaConfig,

    /// Victim selection for population control.
    pub deletion_selector: Selector,
}

impl Default for LcsConfig {
    fn default() -> Self {
        Self {
            passes: 100,
            callback_frequency: 10,
            population_capacity: 1000,
            seed: None,
            ga: GaConfig::default(),
            deletion_selector: Selector::deletion(),
        }
    }
}

impl LcsConfig {
    /// Sets the number of passes.
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    /// Sets the observer frequency (0 to disable).
    pub fn with_callback_frequency(mut self, every: usize) -> Self {
        self.callback_frequency = every;
        self
    }

    /// Sets the population capacity.
    pub fn with_population_capacity(mut self, capacity: u32) -> Self {
        self.population_capacity = capacity;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the GA parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the deletion selector.
    pub fn with_deletion_selector(mut self, selector: Selector) -> Self {
        self.deletion_selector = selector;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.passes == 0 {
            return Err(LcsError::InvalidConfig("passes must be at least 1".into()));
        }
        if self.population_capacity == 0 {
            return Err(LcsError::InvalidConfig(
                "population_capacity must be at least 1".into(),
            ));
        }
        self.ga.validate()
    }
}
