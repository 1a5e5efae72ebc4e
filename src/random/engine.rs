//! Stateful random engine

use super::{
    CounterEngine, CounterRequest, Distribution, EngineRequest, ExplicitStateRequest,
    MersenneParams, MersenneState, RandomEngineType, init_mersenne_state, words_consumed,
};
use crate::dtype::DType;
use crate::error::{Error, ErrorCode, Result};
use crate::ops::RandomEngineKernels;
use crate::ops::impl_generic::generate_impl;
use crate::runtime::{Runtime, RuntimeClient};
use crate::tensor::Tensor;
use std::fmt;

/// Construction parameters for a [`RandomEngine`]
pub struct EngineConfig<R: Runtime> {
    /// Engine family
    pub engine_type: RandomEngineType,
    /// Initial seed
    pub seed: u64,
    /// Mersenne tables; the reference set is used when `None`
    pub mersenne_params: Option<MersenneParams<R>>,
}

impl<R: Runtime> Default for EngineConfig<R> {
    fn default() -> Self {
        Self {
            engine_type: RandomEngineType::default(),
            seed: 0,
            mersenne_params: None,
        }
    }
}

impl<R: Runtime> fmt::Debug for EngineConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("engine_type", &self.engine_type)
            .field("seed", &self.seed)
            .field("mersenne_params", &self.mersenne_params.is_some())
            .finish()
    }
}

struct MersenneStreams<R: Runtime> {
    params: MersenneParams<R>,
    state: MersenneState<R>,
}

/// Random engine that tracks its position between calls
///
/// Counter-based engines advance the counter by the words each call
/// consumed, so consecutive calls continue one stream. The Mersenne engine
/// advances its stream state in place. A failed call advances nothing.
///
/// # Example
///
/// ```
/// use randstream::prelude::*;
/// use randstream::random::{RandomEngine, RandomEngineType};
///
/// let device = CpuRuntime::default_device();
/// let client = CpuRuntime::default_client(&device);
///
/// let mut engine = RandomEngine::<CpuRuntime>::new(&client, RandomEngineType::Threefry2x32_16, 42)?;
/// let a = engine.uniform(&[8], DType::F32)?;
/// assert_eq!(engine.counter(), 8);
///
/// engine.set_seed(42)?;
/// let b = engine.uniform(&[8], DType::F32)?;
/// assert_eq!(a.to_vec::<f32>(), b.to_vec::<f32>());
/// # Ok::<(), randstream::error::Error>(())
/// ```
pub struct RandomEngine<R: Runtime> {
    client: R::Client,
    engine_type: RandomEngineType,
    seed: u64,
    counter: u64,
    mersenne: Option<MersenneStreams<R>>,
}

impl<R: Runtime> RandomEngine<R>
where
    R::Client: RandomEngineKernels<R>,
{
    /// Create an engine of the given type
    ///
    /// A Mersenne engine uses [`MersenneParams::reference`] and initialises
    /// its state from `seed`.
    pub fn new(client: &R::Client, engine_type: RandomEngineType, seed: u64) -> Result<Self> {
        Self::from_config(
            client,
            EngineConfig {
                engine_type,
                seed,
                mersenne_params: None,
            },
        )
    }

    /// Create a counter-based engine
    pub fn counter_based(client: &R::Client, engine: CounterEngine, seed: u64) -> Self {
        Self {
            client: client.clone(),
            engine_type: engine.into(),
            seed,
            counter: 0,
            mersenne: None,
        }
    }

    /// Create a Mersenne engine from caller-supplied parameter tables
    pub fn with_mersenne_params(
        client: &R::Client,
        params: MersenneParams<R>,
        seed: u64,
    ) -> Result<Self> {
        Self::from_config(
            client,
            EngineConfig {
                engine_type: RandomEngineType::Mersenne,
                seed,
                mersenne_params: Some(params),
            },
        )
    }

    /// Create an engine from a configuration
    ///
    /// Parameter tables in the configuration are kept even for counter-based
    /// engines and used if the engine later switches to Mersenne.
    pub fn from_config(client: &R::Client, config: EngineConfig<R>) -> Result<Self> {
        let mersenne = match config.mersenne_params {
            Some(params) => Some(MersenneStreams::new(client, params, config.seed)?),
            None if config.engine_type.is_stateful() => {
                let params = MersenneParams::reference(client.device())?;
                Some(MersenneStreams::new(client, params, config.seed)?)
            }
            None => None,
        };

        tracing::debug!(engine = %config.engine_type, seed = config.seed, "random engine created");

        Ok(Self {
            client: client.clone(),
            engine_type: config.engine_type,
            seed: config.seed,
            counter: 0,
            mersenne,
        })
    }

    /// Engine family
    #[inline]
    pub fn engine_type(&self) -> RandomEngineType {
        self.engine_type
    }

    /// Current seed
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next counter word of a counter-based engine
    #[inline]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Mersenne parameter tables, if the engine has any
    pub fn mersenne_params(&self) -> Option<&MersenneParams<R>> {
        self.mersenne.as_ref().map(|m| &m.params)
    }

    /// Mersenne stream state, if the engine has any
    pub fn mersenne_state(&self) -> Option<&MersenneState<R>> {
        self.mersenne.as_ref().map(|m| &m.state)
    }

    /// Switch the engine family
    ///
    /// Switching to Mersenne initialises the reference streams from the
    /// current seed unless the engine already owns stream state. Counter-based
    /// types keep the seed and counter.
    pub fn set_type(&mut self, engine_type: RandomEngineType) -> Result<()> {
        if engine_type.is_stateful() && self.mersenne.is_none() {
            let params = MersenneParams::reference(self.client.device())?;
            self.mersenne = Some(MersenneStreams::new(&self.client, params, self.seed)?);
        }
        self.engine_type = engine_type;
        Ok(())
    }

    /// Reset the seed
    ///
    /// The counter returns to zero and Mersenne state is re-initialised.
    pub fn set_seed(&mut self, seed: u64) -> Result<()> {
        if let Some(streams) = &mut self.mersenne {
            streams.state = init_mersenne_state(&self.client, seed, streams.params.recursion_table())?;
        }
        self.seed = seed;
        self.counter = 0;
        Ok(())
    }

    /// Generate uniform values and advance the engine
    pub fn uniform(&mut self, shape: &[usize], dtype: DType) -> Result<Tensor<R>> {
        self.generate(shape, dtype, Distribution::Uniform)
    }

    /// Generate standard normal values and advance the engine
    pub fn normal(&mut self, shape: &[usize], dtype: DType) -> Result<Tensor<R>> {
        self.generate(shape, dtype, Distribution::Normal)
    }

    /// Generate values of any distribution and advance the engine
    pub fn generate(
        &mut self,
        shape: &[usize],
        dtype: DType,
        distribution: Distribution,
    ) -> Result<Tensor<R>> {
        match self.engine_type.counter_engine() {
            Some(engine) => {
                let request = EngineRequest::Counter(CounterRequest {
                    engine,
                    seed: self.seed,
                    counter: self.counter,
                });
                let out = generate_impl(&self.client, shape, dtype, distribution, request)?;
                self.counter = self
                    .counter
                    .wrapping_add(words_consumed(dtype, distribution, out.numel()));
                Ok(out)
            }
            None => {
                let streams = self.mersenne.as_mut().ok_or_else(|| {
                    Error::generic("mersenne engine has no stream state", ErrorCode::Internal)
                })?;
                let request = EngineRequest::ExplicitState(ExplicitStateRequest {
                    params: &streams.params,
                    state: &mut streams.state,
                });
                generate_impl(&self.client, shape, dtype, distribution, request)
            }
        }
    }
}

impl<R: Runtime> MersenneStreams<R>
where
    R::Client: RandomEngineKernels<R>,
{
    fn new(client: &R::Client, params: MersenneParams<R>, seed: u64) -> Result<Self> {
        let state = init_mersenne_state(client, seed, params.recursion_table())?;
        Ok(Self { params, state })
    }
}

impl<R: Runtime> fmt::Debug for RandomEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomEngine")
            .field("backend", &R::name())
            .field("engine_type", &self.engine_type)
            .field("seed", &self.seed)
            .field("counter", &self.counter)
            .field("has_mersenne_state", &self.mersenne.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn client() -> <CpuRuntime as Runtime>::Client {
        CpuRuntime::default_client(&CpuDevice::new())
    }

    #[test]
    fn test_counter_advances_by_words() {
        let client = client();
        let mut engine =
            RandomEngine::<CpuRuntime>::new(&client, RandomEngineType::Philox4x32_10, 1).unwrap();
        engine.uniform(&[10], DType::F32).unwrap();
        assert_eq!(engine.counter(), 10);
        engine.uniform(&[10], DType::F64).unwrap();
        assert_eq!(engine.counter(), 30);
        engine.normal(&[2], DType::Complex64).unwrap();
        assert_eq!(engine.counter(), 38);
    }

    #[test]
    fn test_failed_call_does_not_advance() {
        let client = client();
        let mut engine =
            RandomEngine::<CpuRuntime>::new(&client, RandomEngineType::Philox4x32_10, 1).unwrap();
        engine.uniform(&[4], DType::U8).unwrap();
        assert!(engine.normal(&[4], DType::U8).is_err());
        assert_eq!(engine.counter(), 4);
    }

    #[test]
    fn test_set_seed_resets_counter() {
        let client = client();
        let mut engine =
            RandomEngine::<CpuRuntime>::new(&client, RandomEngineType::Threefry2x32_16, 5).unwrap();
        engine.uniform(&[16], DType::I32).unwrap();
        engine.set_seed(6).unwrap();
        assert_eq!(engine.seed(), 6);
        assert_eq!(engine.counter(), 0);
    }

    #[test]
    fn test_set_type_to_mersenne_creates_state() {
        let client = client();
        let mut engine =
            RandomEngine::<CpuRuntime>::new(&client, RandomEngineType::Philox4x32_10, 3).unwrap();
        assert!(engine.mersenne_state().is_none());

        engine.set_type(RandomEngineType::Mersenne).unwrap();
        assert!(engine.mersenne_state().is_some());
        let before = engine.mersenne_state().unwrap().to_vec().unwrap();
        engine.uniform(&[100], DType::F32).unwrap();
        let after = engine.mersenne_state().unwrap().to_vec().unwrap();
        assert_ne!(before, after);
        assert_eq!(engine.counter(), 0);
    }

    #[test]
    fn test_mersenne_set_seed_replays() {
        let client = client();
        let mut engine =
            RandomEngine::<CpuRuntime>::new(&client, RandomEngineType::Mersenne, 11).unwrap();
        let a: Vec<u32> = engine.uniform(&[64], DType::U32).unwrap().to_vec();
        engine.set_seed(11).unwrap();
        let b: Vec<u32> = engine.uniform(&[64], DType::U32).unwrap().to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::<CpuRuntime>::default();
        assert_eq!(config.engine_type, RandomEngineType::Philox4x32_10);
        assert_eq!(config.seed, 0);
        assert!(config.mersenne_params.is_none());
    }
}
