//! Operation traits for random generation.
//!
//! Implementations are in the backend-specific modules (cpu/).

mod random_engine;

pub use random_engine::{FillParams, RandomEngineKernels};
