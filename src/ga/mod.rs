//! Steady-state genetic algorithm over classifier niches.
//!
//! The GA never sees a whole population at once. The update step hands it
//! one niche (a correct set, occasionally a match set); if the activation
//! trigger fires, two parents are selected from that niche, recombined,
//! mutated, repaired by the representation, and the two children are
//! inserted into the population.
//!
//! # Key Types
//!
//! - [`GaConfig`]: operator rates, activation trigger, parent selector
//! - [`SteadyStateGa`]: activation and breeding
//! - [`Selector`]: numerosity-aware selection, shared with population control
//!
//! # Submodules
//!
//! - [`operators`]: single-point crossover and bitwise mutation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Wilson (1995), "Classifier Fitness Based on Accuracy"
//! - Butz & Wilson (2001), "An Algorithmic Description of XCS"

mod config;
pub mod operators;
mod selection;
mod steady_state;

pub use config::{GaActivation, GaConfig};
pub use selection::{tournament_with_participants, Candidate, Objective, Selection, Selector};
pub use steady_state::SteadyStateGa;
