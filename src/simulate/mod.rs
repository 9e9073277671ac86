//! Synthetic responses for exercising regression code.

mod rlm;

pub use rlm::{generate, generate_from_design, Sigma, SimulationSpec};
