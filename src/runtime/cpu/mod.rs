//! CPU runtime implementation
//!
//! The CPU runtime uses standard heap allocation and provides the reference
//! kernel backend for every random engine. Kernels run to completion before
//! the launching call returns, so synchronization points are no-ops.

mod client;
mod device;
pub(crate) mod helpers;
pub(crate) mod kernels;
mod runtime;

pub use crate::tensor::Tensor;
pub use client::CpuClient;
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
