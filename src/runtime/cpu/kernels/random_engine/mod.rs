//! Random engine kernels for CPU
//!
//! Every engine reduces to a source of 32-bit words; values are then built
//! from consecutive words by [`RandomElement`] / [`NormalElement`].
//!
//! # Algorithms
//!
//! - `philox`: Philox4x32-10 (Salmon et al. 2011)
//! - `threefry`: Threefry2x32-16 (Salmon et al. 2011)
//! - `mersenne`: 32-stream Mersenne Twister with table-driven recursion and tempering

mod convert;
mod mersenne;
mod philox;
mod threefry;

pub use convert::{NormalElement, RandomElement};
pub use mersenne::{MersenneTables, mersenne_init_kernel};

use crate::random::CounterEngine;
use std::f64::consts::PI;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Values produced per independent block of a counter-based fill
const VALUES_PER_BLOCK: usize = 4096;

/// Box-Muller transform: convert two uniform values to two standard normal values
///
/// Normal generation keeps only the cosine branch, so every value owns its
/// uniform pair.
#[inline(always)]
pub(crate) fn box_muller(u1: f64, u2: f64) -> (f64, f64) {
    // Clamp to avoid log(0) and ensure valid range
    let u1 = u1.clamp(1e-10, 1.0 - 1e-10);

    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;

    (r * theta.cos(), r * theta.sin())
}

#[inline]
fn counter_words(engine: CounterEngine, seed: u64, first: u64, out: &mut [u32]) {
    match engine {
        CounterEngine::Philox4x32_10 => philox::philox_words(seed, first, out),
        CounterEngine::Threefry2x32_16 => threefry::threefry_words(seed, first, out),
    }
}

/// Fill `out` from the counter stream, `words_per_value` words per value
///
/// Blocks are independent, so the split across threads does not affect the
/// result.
fn fill_counter<T, F>(
    out: &mut [T],
    words_per_value: usize,
    engine: CounterEngine,
    seed: u64,
    counter: u64,
    convert: F,
) where
    T: Send,
    F: Fn(&[u32]) -> T + Sync,
{
    let fill_block = |(b, block): (usize, &mut [T])| {
        let offset = (b * VALUES_PER_BLOCK * words_per_value) as u64;
        let mut words = vec![0u32; block.len() * words_per_value];
        counter_words(engine, seed, counter.wrapping_add(offset), &mut words);

        for (v, w) in block.iter_mut().zip(words.chunks_exact(words_per_value)) {
            *v = convert(w);
        }
    };

    #[cfg(feature = "rayon")]
    out.par_chunks_mut(VALUES_PER_BLOCK)
        .enumerate()
        .for_each(fill_block);

    #[cfg(not(feature = "rayon"))]
    out.chunks_mut(VALUES_PER_BLOCK)
        .enumerate()
        .for_each(fill_block);
}

/// Convert a flat word buffer into values, `words_per_value` words each
fn fill_from_words<T, F>(out: &mut [T], words: &[u32], words_per_value: usize, convert: F)
where
    T: Send,
    F: Fn(&[u32]) -> T + Sync,
{
    #[cfg(feature = "rayon")]
    out.par_iter_mut()
        .zip(words.par_chunks_exact(words_per_value))
        .for_each(|(v, w)| *v = convert(w));

    #[cfg(not(feature = "rayon"))]
    out.iter_mut()
        .zip(words.chunks_exact(words_per_value))
        .for_each(|(v, w)| *v = convert(w));
}

/// Generate uniform values from a counter-based engine
///
/// Value `i` consumes words `[counter + i * T::WORDS, counter + (i + 1) * T::WORDS)`.
///
/// # Safety
/// - `out` must be a valid pointer to `n` elements
pub unsafe fn counter_uniform_kernel<T: RandomElement>(
    out: *mut T,
    n: usize,
    engine: CounterEngine,
    seed: u64,
    counter: u64,
) {
    let out_slice = std::slice::from_raw_parts_mut(out, n);
    fill_counter(out_slice, T::WORDS, engine, seed, counter, T::from_words);
}

/// Generate standard normal values from a counter-based engine
///
/// Value `i` consumes `2 * T::WORDS` words: one uniform pair.
///
/// # Safety
/// - `out` must be a valid pointer to `n` elements
pub unsafe fn counter_normal_kernel<T: NormalElement>(
    out: *mut T,
    n: usize,
    engine: CounterEngine,
    seed: u64,
    counter: u64,
) {
    let out_slice = std::slice::from_raw_parts_mut(out, n);
    fill_counter(
        out_slice,
        2 * T::WORDS,
        engine,
        seed,
        counter,
        T::from_normal_words,
    );
}

/// Generate uniform values from the Mersenne streams
///
/// # Safety
/// - `out` must be a valid pointer to `n` elements
/// - `state` must be a valid pointer to `MT_STATE_LENGTH` u32 values, not aliased by `out`
pub unsafe fn mersenne_uniform_kernel<T: RandomElement>(
    out: *mut T,
    n: usize,
    tables: &MersenneTables<'_>,
    state: *mut u32,
) {
    let out_slice = std::slice::from_raw_parts_mut(out, n);
    let state = std::slice::from_raw_parts_mut(state, crate::random::MT_STATE_LENGTH);
    let words = mersenne::mersenne_words(tables, state, n * T::WORDS);
    fill_from_words(out_slice, &words, T::WORDS, T::from_words);
}

/// Generate standard normal values from the Mersenne streams
///
/// # Safety
/// - `out` must be a valid pointer to `n` elements
/// - `state` must be a valid pointer to `MT_STATE_LENGTH` u32 values, not aliased by `out`
pub unsafe fn mersenne_normal_kernel<T: NormalElement>(
    out: *mut T,
    n: usize,
    tables: &MersenneTables<'_>,
    state: *mut u32,
) {
    let out_slice = std::slice::from_raw_parts_mut(out, n);
    let state = std::slice::from_raw_parts_mut(state, crate::random::MT_STATE_LENGTH);
    let words = mersenne::mersenne_words(tables, state, n * 2 * T::WORDS);
    fill_from_words(out_slice, &words, 2 * T::WORDS, T::from_normal_words);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_philox_uniform_range() {
        let mut out = vec![0.0f32; 1000];
        unsafe {
            counter_uniform_kernel(out.as_mut_ptr(), 1000, CounterEngine::Philox4x32_10, 42, 0)
        };
        assert!(out.iter().all(|&x| (0.0..1.0).contains(&x)));
    }

    #[test]
    fn test_threefry_uniform_range() {
        let mut out = vec![0.0f64; 1000];
        unsafe {
            counter_uniform_kernel(out.as_mut_ptr(), 1000, CounterEngine::Threefry2x32_16, 42, 0)
        };
        assert!(out.iter().all(|&x| (0.0..1.0).contains(&x)));
    }

    #[test]
    fn test_blocks_match_single_pass() {
        // Spans several blocks with an unaligned counter
        let n = 3 * VALUES_PER_BLOCK + 17;
        let mut out = vec![0u64; n];
        unsafe { counter_uniform_kernel(out.as_mut_ptr(), n, CounterEngine::Philox4x32_10, 3, 5) };

        let mut words = vec![0u32; 2 * n];
        philox::philox_words(3, 5, &mut words);
        let expected: Vec<u64> = words.chunks_exact(2).map(u64::from_words).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_counter_offsets_compose() {
        let mut whole = vec![0u32; 100];
        let mut head = vec![0u32; 40];
        let mut tail = vec![0u32; 60];
        unsafe {
            counter_uniform_kernel(whole.as_mut_ptr(), 100, CounterEngine::Threefry2x32_16, 8, 0);
            counter_uniform_kernel(head.as_mut_ptr(), 40, CounterEngine::Threefry2x32_16, 8, 0);
            counter_uniform_kernel(tail.as_mut_ptr(), 60, CounterEngine::Threefry2x32_16, 8, 40);
        }
        head.extend(tail);
        assert_eq!(whole, head);
    }

    #[test]
    fn test_philox_normal_statistics() {
        let mut out = vec![0.0f64; 10000];
        unsafe {
            counter_normal_kernel(out.as_mut_ptr(), 10000, CounterEngine::Philox4x32_10, 42, 0)
        };

        let mean: f64 = out.iter().sum::<f64>() / 10000.0;
        let variance: f64 = out.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / 10000.0;

        assert!((mean - 0.0).abs() < 0.05, "mean = {}", mean);
        assert!((variance - 1.0).abs() < 0.1, "variance = {}", variance);
    }

    #[test]
    fn test_box_muller_clamps_zero() {
        let (z0, z1) = box_muller(0.0, 0.25);
        assert!(z0.is_finite() && z1.is_finite());
    }
}
