//! Kernel backend for random engines.
//!
//! A backend fills one raw buffer of real-typed values per call. Complex
//! outputs arrive already resolved to their component dtype with the value
//! count doubled, so a backend never sees a complex dtype.

use crate::error::{Error, Result};
use crate::random::{CounterRequest, MersenneBuffers};
use crate::runtime::{Runtime, RuntimeClient};
use crate::tensor::RawBuffer;

/// Fully resolved generator parameters for one fill
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FillParams {
    /// Counter-based engine, starting at word `counter`
    Counter(CounterRequest),
    /// Mersenne streams, advancing `state` in place
    Mersenne {
        /// Stream parameter tables
        tables: MersenneBuffers,
        /// `MT_STATE_LENGTH` words of `U32` state
        state: RawBuffer,
    },
}

/// Random engine kernels provided by a runtime client
///
/// `out.dtype` is always a real dtype and `out.len` the number of real values
/// to write. Methods left at their default report
/// [`Error::UnsupportedBackend`].
pub trait RandomEngineKernels<R: Runtime>: RuntimeClient<R> {
    /// Fill `out` with uniform values
    ///
    /// Floats land in `[0, 1)`, integers cover their full range.
    fn fill_uniform(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
        let _ = (out, params);
        Err(Error::unsupported_backend(
            R::name(),
            "RandomEngineKernels::fill_uniform",
        ))
    }

    /// Fill `out` with standard normal values (`F32`/`F64` only)
    fn fill_normal(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
        let _ = (out, params);
        Err(Error::unsupported_backend(
            R::name(),
            "RandomEngineKernels::fill_normal",
        ))
    }

    /// Write the initial Mersenne state for `seed` into `state`
    fn init_mersenne_state(
        &self,
        state: RawBuffer,
        recursion_table: RawBuffer,
        seed: u64,
    ) -> Result<()> {
        let _ = (state, recursion_table, seed);
        Err(Error::unsupported_backend(
            R::name(),
            "RandomEngineKernels::init_mersenne_state",
        ))
    }
}
