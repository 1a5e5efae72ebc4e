//! Random number engines
//!
//! Two generation protocols share one dispatch entry point, [`generate`]:
//!
//! - **Counter-based** (Philox4x32-10, Threefry2x32-16): stateless. Word `p`
//!   of a stream is a pure function of `(engine, seed, p)`, so any slice of the
//!   sequence can be produced independently and in parallel.
//! - **Explicit state** (Mersenne): 32 Mersenne-Twister streams, each with its
//!   own recursion and tempering tables. The caller owns the
//!   [`MersenneState`] and passes it mutably into every call.
//!
//! Most callers use the stateful [`RandomEngine`] or the process-wide default
//! engine in [`default`], which track the counter/state between calls.
//!
//! # Example
//!
//! ```
//! use randstream::prelude::*;
//! use randstream::random::{CounterEngine, CounterRequest, Distribution, EngineRequest, generate};
//!
//! let device = CpuRuntime::default_device();
//! let client = CpuRuntime::default_client(&device);
//!
//! let request = EngineRequest::Counter(CounterRequest {
//!     engine: CounterEngine::Philox4x32_10,
//!     seed: 42,
//!     counter: 0,
//! });
//! let t: Tensor<CpuRuntime> = generate(&client, &[4, 4], DType::F32, Distribution::Uniform, request)?;
//! assert_eq!(t.numel(), 16);
//! # Ok::<(), randstream::error::Error>(())
//! ```

#[cfg(feature = "cpu")]
pub mod default;
mod engine;
mod mersenne;

pub use engine::{EngineConfig, RandomEngine};
pub use mersenne::{
    MT_MAX_STREAMS, MT_N, MT_STATE_LENGTH, MT_TABLE_LENGTH, MT_TABLE_WIDTH, MersenneBuffers,
    MersenneParams, MersenneState,
};
pub(crate) use mersenne::check_u32_table;

use crate::dtype::DType;
use crate::error::Result;
use crate::ops::RandomEngineKernels;
use crate::ops::impl_generic::{generate_impl, init_mersenne_state_impl};
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use std::fmt;

pub use crate::ops::impl_generic::{FillPlan, words_consumed, words_per_value};

/// Engine family selector
///
/// The numeric codes are stable and match the values used at interop
/// boundaries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RandomEngineType {
    /// Philox4x32 with 10 rounds (counter-based)
    #[default]
    Philox4x32_10 = 100,
    /// Threefry2x32 with 16 rounds (counter-based)
    Threefry2x32_16 = 200,
    /// 32-stream Mersenne Twister with per-stream parameter tables
    Mersenne = 300,
}

impl RandomEngineType {
    /// All engine types
    pub const ALL: [RandomEngineType; 3] = [
        RandomEngineType::Philox4x32_10,
        RandomEngineType::Threefry2x32_16,
        RandomEngineType::Mersenne,
    ];

    /// Stable numeric code
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Look up an engine type by its numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.code() == code)
    }

    /// The counter-based engine this type selects, if any
    #[inline]
    pub const fn counter_engine(self) -> Option<CounterEngine> {
        match self {
            Self::Philox4x32_10 => Some(CounterEngine::Philox4x32_10),
            Self::Threefry2x32_16 => Some(CounterEngine::Threefry2x32_16),
            Self::Mersenne => None,
        }
    }

    /// Returns true for engines that need explicit stream state
    #[inline]
    pub const fn is_stateful(self) -> bool {
        matches!(self, Self::Mersenne)
    }
}

impl From<CounterEngine> for RandomEngineType {
    fn from(engine: CounterEngine) -> Self {
        match engine {
            CounterEngine::Philox4x32_10 => Self::Philox4x32_10,
            CounterEngine::Threefry2x32_16 => Self::Threefry2x32_16,
        }
    }
}

impl fmt::Display for RandomEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Philox4x32_10 => "philox4x32-10",
            Self::Threefry2x32_16 => "threefry2x32-16",
            Self::Mersenne => "mersenne",
        };
        write!(f, "{name}")
    }
}

/// Counter-based engines
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CounterEngine {
    /// Philox4x32-10: four words per block
    Philox4x32_10,
    /// Threefry2x32-16: two words per block
    Threefry2x32_16,
}

/// Output distribution
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// Floats in `[0, 1)`, integers over the full range of the type
    Uniform,
    /// Standard normal (mean 0, variance 1); floating-point types only
    Normal,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Parameters of a counter-based generation call
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CounterRequest {
    /// Engine to run
    pub engine: CounterEngine,
    /// Key of the stream
    pub seed: u64,
    /// Index of the first 32-bit word to consume
    pub counter: u64,
}

/// Parameters of an explicit-state generation call
pub struct ExplicitStateRequest<'a, R: Runtime> {
    /// Per-stream recursion and tempering tables
    pub params: &'a MersenneParams<R>,
    /// Stream state, advanced in place
    pub state: &'a mut MersenneState<R>,
}

/// Generation request, tagged by protocol
pub enum EngineRequest<'a, R: Runtime> {
    /// Stateless seed/counter generation
    Counter(CounterRequest),
    /// Mersenne generation from caller-owned state
    ExplicitState(ExplicitStateRequest<'a, R>),
}

impl<R: Runtime> EngineRequest<'_, R> {
    /// Engine type this request runs
    pub fn engine_type(&self) -> RandomEngineType {
        match self {
            Self::Counter(req) => req.engine.into(),
            Self::ExplicitState(_) => RandomEngineType::Mersenne,
        }
    }
}

impl<R: Runtime> fmt::Debug for EngineRequest<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counter(req) => f.debug_tuple("Counter").field(req).finish(),
            Self::ExplicitState(_) => f.write_str("ExplicitState"),
        }
    }
}

/// Generate a tensor of random values
///
/// Validates `dtype` against `distribution`, allocates the output and fills
/// it through the client's kernel backend. Complex dtypes are filled as
/// `2 × numel` interleaved component values.
///
/// Counter requests consume `words_consumed(dtype, distribution, numel)`
/// words starting at `counter`; nothing is advanced here. Explicit-state
/// requests advance `state` in place.
pub fn generate<R, C>(
    client: &C,
    shape: &[usize],
    dtype: DType,
    distribution: Distribution,
    request: EngineRequest<'_, R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    C: RandomEngineKernels<R>,
{
    generate_impl(client, shape, dtype, distribution, request)
}

/// Generate uniformly distributed values
pub fn uniform_distribution<R, C>(
    client: &C,
    shape: &[usize],
    dtype: DType,
    request: EngineRequest<'_, R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    C: RandomEngineKernels<R>,
{
    generate_impl(client, shape, dtype, Distribution::Uniform, request)
}

/// Generate standard normal values
pub fn normal_distribution<R, C>(
    client: &C,
    shape: &[usize],
    dtype: DType,
    request: EngineRequest<'_, R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    C: RandomEngineKernels<R>,
{
    generate_impl(client, shape, dtype, Distribution::Normal, request)
}

/// Build the initial state of all Mersenne streams
///
/// `recursion_table` must be a `U32` tensor of [`MT_TABLE_LENGTH`] entries.
pub fn init_mersenne_state<R, C>(
    client: &C,
    seed: u64,
    recursion_table: &Tensor<R>,
) -> Result<MersenneState<R>>
where
    R: Runtime,
    C: RandomEngineKernels<R>,
{
    init_mersenne_state_impl(client, seed, recursion_table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_codes() {
        assert_eq!(RandomEngineType::Philox4x32_10.code(), 100);
        assert_eq!(RandomEngineType::Threefry2x32_16.code(), 200);
        assert_eq!(RandomEngineType::Mersenne.code(), 300);
        assert_eq!(
            RandomEngineType::from_code(200),
            Some(RandomEngineType::Threefry2x32_16)
        );
        assert_eq!(RandomEngineType::from_code(7), None);
    }

    #[test]
    fn test_default_engine_is_philox() {
        assert_eq!(RandomEngineType::default(), RandomEngineType::Philox4x32_10);
    }

    #[test]
    fn test_counter_engine_mapping() {
        for ty in RandomEngineType::ALL {
            match ty.counter_engine() {
                Some(engine) => assert_eq!(RandomEngineType::from(engine), ty),
                None => assert!(ty.is_stateful()),
            }
        }
    }
}
