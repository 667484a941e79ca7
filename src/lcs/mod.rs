//! Supervised training, classification and evaluation.
//!
//! # Key Types
//!
//! - [`LcsConfig`]: passes, population capacity, GA and deletion parameters
//! - [`Lcs`]: owns a population and runs the training loop
//! - [`TrainingObserver`]: hook called between passes
//! - [`Evaluation`]: classification quality, also produced per fold by
//!   [`cross_validate`]

mod config;
mod evaluation;
mod runner;

pub use config::LcsConfig;
pub use evaluation::{cross_validate, Evaluation};
pub use runner::{Lcs, TrainResult, TrainingObserver};
