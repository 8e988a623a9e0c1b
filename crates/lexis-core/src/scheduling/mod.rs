//! Scheduling algorithms.
//!
//! Two interchangeable policies compute a sense's next review time:
//! a continuous half-life model ([`HalfLifeModel`]) and a discrete
//! stage ladder ([`StageScheduler`]). Which one runs is a process-wide
//! setting read through [`AlgorithmSettings`].

mod algorithm;
mod memory_model;
mod stage;

pub use algorithm::{Algorithm, AlgorithmInfo, AlgorithmSettings, ALGORITHM_SETTING_KEY};
pub use memory_model::HalfLifeModel;
pub use stage::StageScheduler;
