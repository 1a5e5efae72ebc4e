//! 32-stream Mersenne Twister with per-stream parameter tables
//!
//! Each stream runs its own recursion over `MT_N` words of state. The
//! recursion and tempering steps finish with a 16-entry table lookup, so every
//! stream gets a distinct generator from the same code path.

use crate::random::{MT_MAX_STREAMS, MT_N, MT_STATE_LENGTH, MT_TABLE_LENGTH, MT_TABLE_WIDTH};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Borrowed view of a Mersenne parameter set
#[derive(Copy, Clone, Debug)]
pub struct MersenneTables<'a> {
    /// Recurrence offsets, one per stream
    pub pos: &'a [u32],
    /// Left shifts, one per stream
    pub sh1: &'a [u32],
    /// Right shifts, one per stream
    pub sh2: &'a [u32],
    /// Upper-bits mask
    pub mask: u32,
    /// Recursion lookup table, `MT_TABLE_WIDTH` entries per stream
    pub recursion: &'a [u32],
    /// Tempering lookup table, `MT_TABLE_WIDTH` entries per stream
    pub temper: &'a [u32],
}

impl MersenneTables<'_> {
    /// Returns true when every table has the length the kernels index into
    pub fn has_valid_lengths(&self) -> bool {
        self.pos.len() == MT_MAX_STREAMS
            && self.sh1.len() == MT_MAX_STREAMS
            && self.sh2.len() == MT_MAX_STREAMS
            && self.recursion.len() == MT_TABLE_LENGTH
            && self.temper.len() == MT_TABLE_LENGTH
    }
}

/// Parameters of one stream
struct StreamParams<'a> {
    pos: usize,
    sh1: u32,
    sh2: u32,
    mask: u32,
    recursion: &'a [u32],
    temper: &'a [u32],
}

impl<'a> StreamParams<'a> {
    fn new(tables: &MersenneTables<'a>, s: usize) -> Self {
        let lut = s * MT_TABLE_WIDTH..(s + 1) * MT_TABLE_WIDTH;
        Self {
            pos: tables.pos[s] as usize % MT_N,
            sh1: tables.sh1[s],
            sh2: tables.sh2[s],
            mask: tables.mask,
            recursion: &tables.recursion[lut.clone()],
            temper: &tables.temper[lut],
        }
    }

    #[inline(always)]
    fn recursion(&self, x1: u32, x2: u32, y: u32) -> u32 {
        let mut x = (x1 & self.mask) ^ x2;
        x ^= x.wrapping_shl(self.sh1);
        let y = x ^ y.wrapping_shr(self.sh2);
        y ^ self.recursion[(y & 0x0f) as usize]
    }

    #[inline(always)]
    fn temper(&self, v: u32, t: u32) -> u32 {
        let mut t = t;
        t ^= t >> 16;
        t ^= t >> 8;
        v ^ self.temper[(t & 0x0f) as usize]
    }
}

/// Initialise all streams from a seed and the recursion table
///
/// # Safety
/// - `state` must be a valid pointer to `MT_STATE_LENGTH` u32 values
/// - `recursion_table` must be a valid pointer to `MT_TABLE_LENGTH` u32 values
pub unsafe fn mersenne_init_kernel(state: *mut u32, recursion_table: *const u32, seed: u64) {
    let state = std::slice::from_raw_parts_mut(state, MT_STATE_LENGTH);
    let table = std::slice::from_raw_parts(recursion_table, MT_TABLE_LENGTH);
    let folded_seed = (seed as u32) ^ ((seed >> 32) as u32);

    for (words, t) in state
        .chunks_exact_mut(MT_N)
        .zip(table.chunks_exact(MT_TABLE_WIDTH))
    {
        let hidden = t[4] ^ (t[8] << 16);

        let mut fill = hidden;
        fill = fill.wrapping_add(fill >> 16);
        fill = fill.wrapping_add(fill >> 8);
        fill &= 0xff;
        fill |= fill << 8;
        fill |= fill << 16;

        words.fill(fill);
        words[0] = folded_seed;
        words[1] = hidden;
        for i in 1..MT_N {
            let prev = words[i - 1];
            words[i] ^= 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
    }
}

/// Produce `out.len()` tempered words from one stream and advance its state
///
/// The state is left linearised: oldest word first.
fn stream_words(params: &StreamParams<'_>, state: &mut [u32], out: &mut [u32]) {
    let mut idx = 0;
    for w in out.iter_mut() {
        let r = params.recursion(
            state[idx],
            state[(idx + 1) % MT_N],
            state[(idx + params.pos) % MT_N],
        );
        state[idx] = r;
        *w = params.temper(r, state[(idx + params.pos + MT_N - 1) % MT_N]);
        idx = (idx + 1) % MT_N;
    }
    state.rotate_left(idx);
}

/// Generate `total` words, split across the streams in contiguous chunks
///
/// Stream `s` produces words `[s * chunk, (s + 1) * chunk)` of the result with
/// `chunk = ceil(total / MT_MAX_STREAMS)`. Streams past the end of the budget
/// are left untouched.
pub(crate) fn mersenne_words(
    tables: &MersenneTables<'_>,
    state: &mut [u32],
    total: usize,
) -> Vec<u32> {
    let mut words = vec![0u32; total];
    if total == 0 {
        return words;
    }
    let chunk = total.div_ceil(MT_MAX_STREAMS);

    let run = |(s, (stream, out)): (usize, (&mut [u32], &mut [u32]))| {
        stream_words(&StreamParams::new(tables, s), stream, out);
    };

    #[cfg(feature = "rayon")]
    state
        .par_chunks_mut(MT_N)
        .zip(words.par_chunks_mut(chunk))
        .enumerate()
        .for_each(run);

    #[cfg(not(feature = "rayon"))]
    state
        .chunks_mut(MT_N)
        .zip(words.chunks_mut(chunk))
        .enumerate()
        .for_each(run);

    words
}
