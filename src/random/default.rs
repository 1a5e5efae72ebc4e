//! Process-wide default random engine
//!
//! The default engine runs on [`DefaultRuntime`](crate::DefaultRuntime) and
//! starts as Philox4x32-10 with seed 0. Every function locks the engine for
//! the duration of the call, so concurrent callers draw disjoint parts of
//! the sequence.

use super::{CounterEngine, RandomEngine, RandomEngineType};
use crate::DefaultRuntime;
use crate::dtype::DType;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use parking_lot::Mutex;
use std::sync::OnceLock;

static DEFAULT_ENGINE: OnceLock<Mutex<RandomEngine<DefaultRuntime>>> = OnceLock::new();

fn engine() -> &'static Mutex<RandomEngine<DefaultRuntime>> {
    DEFAULT_ENGINE.get_or_init(|| {
        let device = DefaultRuntime::default_device();
        let client = DefaultRuntime::default_client(&device);
        Mutex::new(RandomEngine::counter_based(
            &client,
            CounterEngine::Philox4x32_10,
            0,
        ))
    })
}

/// Run `f` with exclusive access to the default engine
pub fn with_default_engine<T>(f: impl FnOnce(&mut RandomEngine<DefaultRuntime>) -> T) -> T {
    f(&mut engine().lock())
}

/// Uniform values from the default engine
pub fn randu(shape: &[usize], dtype: DType) -> Result<Tensor<DefaultRuntime>> {
    engine().lock().uniform(shape, dtype)
}

/// Standard normal values from the default engine
pub fn randn(shape: &[usize], dtype: DType) -> Result<Tensor<DefaultRuntime>> {
    engine().lock().normal(shape, dtype)
}

/// Reseed the default engine
pub fn set_seed(seed: u64) -> Result<()> {
    engine().lock().set_seed(seed)
}

/// Seed of the default engine
pub fn get_seed() -> u64 {
    engine().lock().seed()
}

/// Switch the family of the default engine
pub fn set_default_engine_type(engine_type: RandomEngineType) -> Result<()> {
    engine().lock().set_type(engine_type)
}

/// Family of the default engine
pub fn default_engine_type() -> RandomEngineType {
    engine().lock().engine_type()
}
