//! Common test utilities
#![allow(dead_code)]

use parking_lot::Mutex;
use randstream::dtype::DType;
use randstream::error::Result;
use randstream::ops::{FillParams, RandomEngineKernels};
use randstream::random::{CounterEngine, CounterRequest, EngineRequest};
use randstream::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use randstream::runtime::{Runtime, RuntimeClient};
use randstream::tensor::RawBuffer;
use std::sync::Arc;

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    init_tracing();
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Install a log subscriber honouring `RUST_LOG`, once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Counter request on the Philox engine
pub fn philox<'a>(seed: u64, counter: u64) -> EngineRequest<'a, CpuRuntime> {
    EngineRequest::Counter(CounterRequest {
        engine: CounterEngine::Philox4x32_10,
        seed,
        counter,
    })
}

/// Counter request on the Threefry engine
pub fn threefry<'a>(seed: u64, counter: u64) -> EngineRequest<'a, CpuRuntime> {
    EngineRequest::Counter(CounterRequest {
        engine: CounterEngine::Threefry2x32_16,
        seed,
        counter,
    })
}

/// Sample mean and population variance
pub fn mean_and_variance(data: &[f64]) -> (f64, f64) {
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Backend call observed by [`RecordingClient`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecordedFill {
    pub normal: bool,
    pub len: usize,
    pub dtype: DType,
}

/// CPU client that records every fill before delegating to the CPU kernels
#[derive(Clone, Debug)]
pub struct RecordingClient {
    inner: CpuClient,
    fills: Arc<Mutex<Vec<RecordedFill>>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        let (inner, _) = create_cpu_client();
        Self {
            inner,
            fills: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fills(&self) -> Vec<RecordedFill> {
        self.fills.lock().clone()
    }

    fn record(&self, normal: bool, out: &RawBuffer) {
        self.fills.lock().push(RecordedFill {
            normal,
            len: out.len,
            dtype: out.dtype,
        });
    }
}

impl RuntimeClient<CpuRuntime> for RecordingClient {
    fn device(&self) -> &CpuDevice {
        self.inner.device()
    }

    fn synchronize(&self) {
        self.inner.synchronize()
    }
}

impl RandomEngineKernels<CpuRuntime> for RecordingClient {
    fn fill_uniform(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
        self.record(false, &out);
        self.inner.fill_uniform(out, params)
    }

    fn fill_normal(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
        self.record(true, &out);
        self.inner.fill_normal(out, params)
    }

    fn init_mersenne_state(&self, state: RawBuffer, table: RawBuffer, seed: u64) -> Result<()> {
        self.inner.init_mersenne_state(state, table, seed)
    }
}

/// Backend offering only the counter-based engines
#[derive(Clone, Debug)]
pub struct CounterOnlyClient {
    inner: CpuClient,
}

impl CounterOnlyClient {
    pub fn new() -> Self {
        let (inner, _) = create_cpu_client();
        Self { inner }
    }
}

impl RuntimeClient<CpuRuntime> for CounterOnlyClient {
    fn device(&self) -> &CpuDevice {
        self.inner.device()
    }

    fn synchronize(&self) {}
}

impl RandomEngineKernels<CpuRuntime> for CounterOnlyClient {
    fn fill_uniform(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
        self.inner.fill_uniform(out, params)
    }
}
