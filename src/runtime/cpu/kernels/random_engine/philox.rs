//! Philox4x32-10 word source
//!
//! 10-round Feistel cipher from Salmon et al. "Parallel Random Numbers: As Easy as 1, 2, 3" (2011).
//! Word `p` of a stream is lane `p % 4` of the block encrypted from counter `p / 4`.

const PHILOX_M4X32_0: u32 = 0xD2511F53;
const PHILOX_M4X32_1: u32 = 0xCD9E8D57;
const PHILOX_W32_0: u32 = 0x9E3779B9;
const PHILOX_W32_1: u32 = 0xBB67AE85;

/// Philox4x32 round function
#[inline(always)]
fn philox_round(ctr: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let prod0 = (ctr[0] as u64).wrapping_mul(PHILOX_M4X32_0 as u64);
    let prod1 = (ctr[2] as u64).wrapping_mul(PHILOX_M4X32_1 as u64);

    [
        ((prod1 >> 32) as u32) ^ ctr[1] ^ key[0],
        prod1 as u32,
        ((prod0 >> 32) as u32) ^ ctr[3] ^ key[1],
        prod0 as u32,
    ]
}

/// Philox4x32-10: 10-round Feistel cipher
#[inline(always)]
pub(crate) fn philox4x32_10(ctr: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let mut c = ctr;
    let mut k = key;

    for _ in 0..10 {
        c = philox_round(c, k);
        k[0] = k[0].wrapping_add(PHILOX_W32_0);
        k[1] = k[1].wrapping_add(PHILOX_W32_1);
    }

    c
}

/// Write words `[first, first + out.len())` of the stream keyed by `seed`
pub(crate) fn philox_words(seed: u64, first: u64, out: &mut [u32]) {
    let key = [seed as u32, (seed >> 32) as u32];
    let mut block = None;
    let mut lanes = [0u32; 4];

    for (j, w) in out.iter_mut().enumerate() {
        let p = first.wrapping_add(j as u64);
        let b = p / 4;
        if block != Some(b) {
            lanes = philox4x32_10([b as u32, (b >> 32) as u32, 0, 0], key);
            block = Some(b);
        }
        *w = lanes[(p % 4) as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_answer_zero() {
        assert_eq!(
            philox4x32_10([0; 4], [0; 2]),
            [0x6627e8d5, 0xe169c58d, 0xbc57ac4c, 0x9b00dbd8]
        );
    }

    #[test]
    fn test_words_follow_blocks() {
        let mut words = [0u32; 8];
        philox_words(7, 0, &mut words);
        assert_eq!(words[..4], philox4x32_10([0, 0, 0, 0], [7, 0]));
        assert_eq!(words[4..], philox4x32_10([1, 0, 0, 0], [7, 0]));
    }

    #[test]
    fn test_unaligned_start() {
        let mut all = [0u32; 16];
        philox_words(99, 0, &mut all);
        let mut tail = [0u32; 13];
        philox_words(99, 3, &mut tail);
        assert_eq!(&all[3..], &tail[..]);
    }
}
