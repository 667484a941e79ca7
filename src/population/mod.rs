//! Populations of macroclassifiers.
//!
//! [`ClassifierSet`] owns the macroclassifiers and keeps the total
//! numerosity in step with every mutation. Match sets, correct sets and GA
//! niches are [`SetView`]s: index lists into the owning set, never copies.
//!
//! # Submodules
//!
//! - [`control`]: fixed-capacity deletion and post-training pruning

pub mod control;
mod set;
mod view;

pub use set::ClassifierSet;
pub use view::SetView;
