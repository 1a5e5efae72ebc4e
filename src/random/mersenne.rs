//! Mersenne-Twister stream parameters and state

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{RawBuffer, Tensor};
use std::fmt;

/// Words of state per stream
pub const MT_N: usize = 351;

/// Number of independent streams
pub const MT_MAX_STREAMS: usize = 32;

/// Total state words across all streams
pub const MT_STATE_LENGTH: usize = MT_N * MT_MAX_STREAMS;

/// Entries per stream in the recursion and tempering tables
pub const MT_TABLE_WIDTH: usize = 16;

/// Total entries of a recursion or tempering table
pub const MT_TABLE_LENGTH: usize = MT_TABLE_WIDTH * MT_MAX_STREAMS;

/// Upper-bits mask of the reference parameter set
const REFERENCE_MASK: u32 = 0xfff8_0000;

/// Seed of the generator that derives the reference tables
const REFERENCE_SEED: u64 = 0x2545_F491_4F6C_DD1D;

#[track_caller]
pub(crate) fn check_u32_table<R: Runtime>(
    op: &'static str,
    arg_index: usize,
    table: &Tensor<R>,
    len: usize,
) -> Result<()> {
    if table.dtype() != DType::U32 {
        return Err(Error::type_mismatch(op, arg_index, table.dtype()));
    }
    if table.numel() != len || !table.is_contiguous() {
        return Err(Error::dimension(
            op,
            arg_index,
            format!("{len} contiguous entries, got {}", table.numel()),
        ));
    }
    Ok(())
}

/// Per-stream recursion and tempering parameters
///
/// Immutable after construction. Lengths and dtypes are checked here; whether
/// the tables form a valid Mersenne-Twister parameter set is the caller's
/// responsibility.
pub struct MersenneParams<R: Runtime> {
    pos: Tensor<R>,
    sh1: Tensor<R>,
    sh2: Tensor<R>,
    mask: u32,
    recursion_table: Tensor<R>,
    temper_table: Tensor<R>,
}

impl<R: Runtime> MersenneParams<R> {
    /// Assemble parameters from device tables
    ///
    /// `pos`, `sh1` and `sh2` need [`MT_MAX_STREAMS`] entries; the recursion
    /// and tempering tables need [`MT_TABLE_LENGTH`] entries. All tables are
    /// `U32`. Failures carry the index of the offending argument.
    pub fn new(
        pos: Tensor<R>,
        sh1: Tensor<R>,
        sh2: Tensor<R>,
        mask: u32,
        recursion_table: Tensor<R>,
        temper_table: Tensor<R>,
    ) -> Result<Self> {
        const OP: &str = "MersenneParams::new";
        check_u32_table(OP, 0, &pos, MT_MAX_STREAMS)?;
        check_u32_table(OP, 1, &sh1, MT_MAX_STREAMS)?;
        check_u32_table(OP, 2, &sh2, MT_MAX_STREAMS)?;
        check_u32_table(OP, 4, &recursion_table, MT_TABLE_LENGTH)?;
        check_u32_table(OP, 5, &temper_table, MT_TABLE_LENGTH)?;

        Ok(Self {
            pos,
            sh1,
            sh2,
            mask,
            recursion_table,
            temper_table,
        })
    }

    /// Built-in deterministic parameter set
    ///
    /// Recursion and tempering tables are the XOR-span of four parameter
    /// words per stream, like dynamically created tables. Use this when no
    /// externally created parameters are available.
    pub fn reference(device: &R::Device) -> Result<Self> {
        let mut rng = SplitMix64(REFERENCE_SEED);

        let mut pos = Vec::with_capacity(MT_MAX_STREAMS);
        let mut sh1 = Vec::with_capacity(MT_MAX_STREAMS);
        let mut sh2 = Vec::with_capacity(MT_MAX_STREAMS);
        let mut recursion = Vec::with_capacity(MT_TABLE_LENGTH);
        let mut temper = Vec::with_capacity(MT_TABLE_LENGTH);

        for _ in 0..MT_MAX_STREAMS {
            pos.push(1 + (rng.next_u32() % (MT_N as u32 - 2)));
            sh1.push(1 + (rng.next_u32() % 31));
            sh2.push(1 + (rng.next_u32() % 31));

            let rec_basis: [u32; 4] = std::array::from_fn(|_| rng.next_u32());
            let tmp_basis: [u32; 4] = std::array::from_fn(|_| rng.next_u32());
            recursion.extend(span_table(&rec_basis));
            temper.extend(span_table(&tmp_basis));
        }

        Self::new(
            Tensor::try_from_slice(&pos, &[MT_MAX_STREAMS], device)?,
            Tensor::try_from_slice(&sh1, &[MT_MAX_STREAMS], device)?,
            Tensor::try_from_slice(&sh2, &[MT_MAX_STREAMS], device)?,
            REFERENCE_MASK,
            Tensor::try_from_slice(&recursion, &[MT_TABLE_LENGTH], device)?,
            Tensor::try_from_slice(&temper, &[MT_TABLE_LENGTH], device)?,
        )
    }

    /// Recurrence offsets, one per stream
    pub fn pos(&self) -> &Tensor<R> {
        &self.pos
    }

    /// Left shifts, one per stream
    pub fn sh1(&self) -> &Tensor<R> {
        &self.sh1
    }

    /// Right shifts, one per stream
    pub fn sh2(&self) -> &Tensor<R> {
        &self.sh2
    }

    /// Upper-bits mask shared by all streams
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Recursion lookup table
    pub fn recursion_table(&self) -> &Tensor<R> {
        &self.recursion_table
    }

    /// Tempering lookup table
    pub fn temper_table(&self) -> &Tensor<R> {
        &self.temper_table
    }

    pub(crate) fn buffers(&self) -> MersenneBuffers {
        MersenneBuffers {
            pos: self.pos.storage().as_raw(),
            sh1: self.sh1.storage().as_raw(),
            sh2: self.sh2.storage().as_raw(),
            mask: self.mask,
            recursion_table: self.recursion_table.storage().as_raw(),
            temper_table: self.temper_table.storage().as_raw(),
        }
    }
}

impl<R: Runtime> Clone for MersenneParams<R> {
    /// Tables are immutable, so clones share storage
    fn clone(&self) -> Self {
        Self {
            pos: self.pos.clone(),
            sh1: self.sh1.clone(),
            sh2: self.sh2.clone(),
            mask: self.mask,
            recursion_table: self.recursion_table.clone(),
            temper_table: self.temper_table.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for MersenneParams<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MersenneParams")
            .field("mask", &format_args!("0x{:08x}", self.mask))
            .finish_non_exhaustive()
    }
}

/// Device view of a parameter set, passed to kernel backends
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MersenneBuffers {
    /// Recurrence offsets
    pub pos: RawBuffer,
    /// Left shifts
    pub sh1: RawBuffer,
    /// Right shifts
    pub sh2: RawBuffer,
    /// Upper-bits mask
    pub mask: u32,
    /// Recursion lookup table
    pub recursion_table: RawBuffer,
    /// Tempering lookup table
    pub temper_table: RawBuffer,
}

/// State of all Mersenne streams
///
/// Stream `s` owns words `[s * MT_N, (s + 1) * MT_N)`, oldest word first.
/// Generation takes the state by `&mut`, so a state is never advanced by two
/// calls at once. The state is the only owner of its storage; cloning is
/// explicit through [`MersenneState::try_clone`] because the storage is
/// written in place.
pub struct MersenneState<R: Runtime> {
    words: Tensor<R>,
}

impl<R: Runtime> MersenneState<R> {
    /// Wrap an existing `U32` tensor of [`MT_STATE_LENGTH`] words
    ///
    /// The tensor must not share storage with any other tensor. Use
    /// [`MersenneState::try_clone`] or a fresh upload to obtain one.
    pub fn from_tensor(words: Tensor<R>) -> Result<Self> {
        check_u32_table("MersenneState::from_tensor", 0, &words, MT_STATE_LENGTH)?;
        if !words.storage().is_unique() {
            return Err(Error::InvalidArgument {
                arg: "words",
                reason: "state storage is shared with another tensor".to_string(),
            });
        }
        Ok(Self { words })
    }

    pub(crate) fn from_tensor_unchecked(words: Tensor<R>) -> Self {
        Self { words }
    }

    pub(crate) fn tensor(&self) -> &Tensor<R> {
        &self.words
    }

    /// Copy the state words to the host
    pub fn to_vec(&self) -> Result<Vec<u32>> {
        self.words.try_to_vec()
    }

    /// Deep copy into fresh device storage
    pub fn try_clone(&self) -> Result<Self> {
        let words = self.to_vec()?;
        Ok(Self {
            words: Tensor::try_from_slice(&words, &[MT_STATE_LENGTH], self.words.device())?,
        })
    }

    pub(crate) fn as_raw_mut(&mut self) -> RawBuffer {
        self.words.storage().as_raw()
    }
}

impl<R: Runtime> fmt::Debug for MersenneState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MersenneState")
            .field("words", &self.words.numel())
            .finish()
    }
}

/// Table whose entry `i` is the XOR of the basis words selected by the bits of `i`
fn span_table(basis: &[u32; 4]) -> [u32; MT_TABLE_WIDTH] {
    std::array::from_fn(|i| {
        basis
            .iter()
            .enumerate()
            .filter(|(bit, _)| i & (1 << bit) != 0)
            .fold(0, |acc, (_, &b)| acc ^ b)
    })
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}
