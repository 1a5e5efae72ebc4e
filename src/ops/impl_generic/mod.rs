//! Generic implementations of composite operations.
//!
//! Backend-agnostic orchestration shared by every runtime. Backends only
//! provide the raw fills through [`RandomEngineKernels`](crate::ops::RandomEngineKernels).
//!
//! ```text
//! impl_generic/random_engine.rs
//!     ├── generate_impl<R, C>()
//!     └── init_mersenne_state_impl<R, C>()
//!             │
//!             └── C::fill_uniform / fill_normal / init_mersenne_state
//! ```

mod random_engine;

pub use random_engine::{
    FillPlan, generate_impl, init_mersenne_state_impl, supported_dtypes, words_consumed,
    words_per_value,
};
