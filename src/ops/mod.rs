//! Random generation operations
//!
//! This module defines the kernel backend trait and the generic orchestration
//! built on top of it.
//!
//! # Design
//!
//! The kernel backend is a trait implemented by each runtime's client. It
//! fills raw buffers from fully resolved parameters and knows nothing about
//! tensors, shapes or complex types. Validation, allocation and the complex
//! doubling rule live once in [`impl_generic`].
//!
//! ```text
//! random::generate
//!   └── impl_generic::generate_impl<R, C>()
//!         ├── validate dtype / distribution / state
//!         ├── Tensor::try_empty
//!         ├── FillPlan::resolve (complex → component dtype, 2 × numel)
//!         └── C: RandomEngineKernels<R>
//!               ├── fill_uniform
//!               ├── fill_normal
//!               └── init_mersenne_state
//! ```
//!
//! # Implementing a New Backend
//!
//! Implement [`RandomEngineKernels`] for the runtime's client. Methods that
//! are left at their default report an unsupported-backend error, so a
//! backend can offer the counter engines without the Mersenne path.
//!
//! ```ignore
//! impl RandomEngineKernels<CudaRuntime> for CudaClient {
//!     fn fill_uniform(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
//!         // launch the kernel for out.dtype over out.len values
//!     }
//! }
//! ```

#[cfg(feature = "cpu")]
pub(crate) mod cpu;
pub mod impl_generic;
pub(crate) mod traits;

pub use traits::{FillParams, RandomEngineKernels};
