//! Generic orchestration of random engine requests.
//!
//! Argument indices in reported errors count the caller-visible arguments
//! after the client: `generate(shape = 0, dtype = 1, distribution = 2,
//! request = 3)` and `init_mersenne_state(seed = 0, recursion_table = 1)`.

use crate::dtype::{DType, DTypeSet};
use crate::error::{Error, Result};
use crate::ops::{FillParams, RandomEngineKernels};
use crate::random::{
    Distribution, EngineRequest, MT_STATE_LENGTH, MT_TABLE_LENGTH, MersenneState,
    check_u32_table,
};
use crate::runtime::{Runtime, RuntimeClient};
use crate::tensor::{RawBuffer, Tensor};

/// How a tensor of `numel` elements is presented to a kernel backend
///
/// Complex elements are filled as interleaved real/imaginary component
/// values: the component dtype with twice the element count. Every other
/// dtype passes through unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FillPlan {
    /// Real dtype the backend writes
    pub dtype: DType,
    /// Number of real values the backend writes
    pub count: usize,
}

impl FillPlan {
    /// Resolve the real dtype and value count for an output tensor
    #[inline]
    pub const fn resolve(dtype: DType, numel: usize) -> Self {
        match dtype.complex_component_dtype() {
            Some(component) => Self {
                dtype: component,
                count: 2 * numel,
            },
            None => Self {
                dtype,
                count: numel,
            },
        }
    }
}

/// Dtypes accepted by a distribution
pub const fn supported_dtypes(distribution: Distribution) -> DTypeSet {
    match distribution {
        Distribution::Uniform => DTypeSet::NUMERIC.union(DTypeSet::COMPLEX),
        Distribution::Normal => DTypeSet::FLOATS.union(DTypeSet::COMPLEX),
    }
}

/// 32-bit words consumed per real value
///
/// Uniform values take one word, or two for 64-bit types. Normal values take
/// a uniform pair. Complex dtypes count per component.
#[inline]
pub const fn words_per_value(dtype: DType, distribution: Distribution) -> usize {
    let real = match dtype.complex_component_dtype() {
        Some(component) => component,
        None => dtype,
    };
    let uniform = if real.size_in_bytes() == 8 { 2 } else { 1 };
    match distribution {
        Distribution::Uniform => uniform,
        Distribution::Normal => 2 * uniform,
    }
}

/// Counter words consumed by generating `numel` elements of `dtype`
///
/// Resuming at `counter + words_consumed(..)` continues the stream exactly
/// where the previous call stopped.
#[inline]
pub const fn words_consumed(dtype: DType, distribution: Distribution, numel: usize) -> u64 {
    let plan = FillPlan::resolve(dtype, numel);
    (plan.count as u64).wrapping_mul(words_per_value(dtype, distribution) as u64)
}

/// Validate, allocate and fill a tensor of random values
///
/// Nothing is allocated when validation fails. An explicit-state request
/// advances the state only when the fill succeeds.
pub fn generate_impl<R, C>(
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
    const OP: &str = "random::generate";

    if !supported_dtypes(distribution).contains(dtype) {
        return Err(Error::type_mismatch(OP, 1, dtype));
    }
    if let EngineRequest::ExplicitState(req) = &request {
        check_u32_table(OP, 3, req.state.tensor(), MT_STATE_LENGTH)?;
    }

    let engine = request.engine_type();
    let out = Tensor::<R>::try_empty(shape, dtype, client.device())?;
    let plan = FillPlan::resolve(dtype, out.numel());

    tracing::debug!(
        %engine,
        %dtype,
        %distribution,
        real_dtype = %plan.dtype,
        count = plan.count,
        "random fill"
    );

    if plan.count == 0 {
        return Ok(out);
    }

    let params = match request {
        EngineRequest::Counter(req) => FillParams::Counter(req),
        EngineRequest::ExplicitState(req) => FillParams::Mersenne {
            tables: req.params.buffers(),
            state: req.state.as_raw_mut(),
        },
    };
    let raw = RawBuffer::new(out.storage().ptr(), plan.count, plan.dtype);

    match distribution {
        Distribution::Uniform => client.fill_uniform(raw, &params)?,
        Distribution::Normal => client.fill_normal(raw, &params)?,
    }

    Ok(out)
}

/// Allocate and initialise the state of all Mersenne streams
pub fn init_mersenne_state_impl<R, C>(
    client: &C,
    seed: u64,
    recursion_table: &Tensor<R>,
) -> Result<MersenneState<R>>
where
    R: Runtime,
    C: RandomEngineKernels<R>,
{
    check_u32_table(
        "random::init_mersenne_state",
        1,
        recursion_table,
        MT_TABLE_LENGTH,
    )?;

    let state = Tensor::<R>::try_empty(&[MT_STATE_LENGTH], DType::U32, client.device())?;
    tracing::debug!(seed, "initialising mersenne state");

    client.init_mersenne_state(
        state.storage().as_raw(),
        recursion_table.storage().as_raw(),
        seed,
    )?;

    Ok(MersenneState::from_tensor_unchecked(state))
}
