//! # randstream
//!
//! **Parallel random number engines for device-resident tensors.**
//!
//! randstream fills tensors of any numeric dtype with uniform or normal
//! values from reproducible, parallel-friendly engines, with the same API on
//! every runtime.
//!
//! ## Engines
//!
//! - **Philox4x32-10** and **Threefry2x32-16**: counter-based. Output is a
//!   pure function of `(seed, counter)`, so requests can be split, resumed
//!   and generated out of order.
//! - **Mersenne**: 32 Mersenne-Twister streams with per-stream recursion and
//!   tempering tables. The caller owns the stream state.
//!
//! ## Dtypes
//!
//! Uniform: `f32 f64 i8 u8 i16 u16 i32 u32 i64 u64` and both complex types.
//! Normal: `f32 f64` and both complex types. Complex outputs are filled as
//! interleaved real/imaginary component values.
//!
//! ## Quick Start
//!
//! ```rust
//! use randstream::prelude::*;
//!
//! let device = CpuRuntime::default_device();
//! let client = CpuRuntime::default_client(&device);
//!
//! let mut engine = RandomEngine::<CpuRuntime>::new(&client, RandomEngineType::Philox4x32_10, 42)?;
//! let u = engine.uniform(&[2, 3], DType::F32)?;
//! let z = engine.normal(&[4], DType::Complex64)?;
//! assert_eq!(u.shape(), &[2, 3]);
//! assert_eq!(z.numel(), 4);
//! # Ok::<(), randstream::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Multi-threaded CPU kernels

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod dtype;
pub mod error;
pub mod ops;
pub mod random;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{Complex64, Complex128, DType};
    pub use crate::error::{Error, Result};
    pub use crate::random::{Distribution, RandomEngine, RandomEngineType};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
}

/// Default runtime based on enabled features
#[cfg(feature = "cpu")]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
