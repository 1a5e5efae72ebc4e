//! Conversion from raw 32-bit words to typed values

use super::box_muller;
use crate::dtype::Element;

/// Element types that can be built from uniformly random words
pub trait RandomElement: Element {
    /// Words consumed per uniform value
    const WORDS: usize;

    /// Build a uniform value from exactly `WORDS` words
    ///
    /// Floats land in `[0, 1)`; integers cover their full range.
    fn from_words(words: &[u32]) -> Self;
}

/// Floating-point element types with a normal distribution
pub trait NormalElement: RandomElement {
    /// Uniform `[0, 1)` value in f64 from `WORDS` words, at this type's resolution
    fn unit_f64(words: &[u32]) -> f64;

    /// Narrow a normal sample to this type
    fn from_f64(v: f64) -> Self;

    /// Build a normal value from `2 * WORDS` words
    #[inline]
    fn from_normal_words(words: &[u32]) -> Self {
        let (w1, w2) = words.split_at(Self::WORDS);
        let (z, _) = box_muller(Self::unit_f64(w1), Self::unit_f64(w2));
        Self::from_f64(z)
    }
}

#[inline(always)]
fn join(words: &[u32]) -> u64 {
    (words[0] as u64) | ((words[1] as u64) << 32)
}

macro_rules! impl_random_narrow {
    ($($ty:ty => $via:ty),* $(,)?) => {
        $(
            impl RandomElement for $ty {
                const WORDS: usize = 1;

                #[inline]
                fn from_words(words: &[u32]) -> Self {
                    words[0] as $via as $ty
                }
            }
        )*
    };
}

impl_random_narrow!(
    u8 => u8,
    i8 => u8,
    u16 => u16,
    i16 => u16,
    u32 => u32,
    i32 => u32,
);

impl RandomElement for u64 {
    const WORDS: usize = 2;

    #[inline]
    fn from_words(words: &[u32]) -> Self {
        join(words)
    }
}

impl RandomElement for i64 {
    const WORDS: usize = 2;

    #[inline]
    fn from_words(words: &[u32]) -> Self {
        join(words) as i64
    }
}

impl RandomElement for f32 {
    const WORDS: usize = 1;

    #[inline]
    fn from_words(words: &[u32]) -> Self {
        // Top 24 bits fill the mantissa exactly
        (words[0] >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }
}

impl NormalElement for f32 {
    #[inline]
    fn unit_f64(words: &[u32]) -> f64 {
        (words[0] >> 8) as f64 / (1u64 << 24) as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl RandomElement for f64 {
    const WORDS: usize = 2;

    #[inline]
    fn from_words(words: &[u32]) -> Self {
        Self::unit_f64(words)
    }
}

impl NormalElement for f64 {
    #[inline]
    fn unit_f64(words: &[u32]) -> f64 {
        (join(words) >> 11) as f64 / (1u64 << 53) as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}
