//! Threefry2x32-16 word source
//!
//! 16-round Threefish-based cipher from Salmon et al. "Parallel Random Numbers: As Easy as 1, 2, 3" (2011).
//! Word `p` of a stream is lane `p % 2` of the block encrypted from counter `p / 2`.

const THREEFRY_ROTATION: [u32; 8] = [13, 15, 26, 6, 17, 29, 16, 24];

const THREEFRY_PARITY32: u32 = 0x1BD11BDA;

const THREEFRY_ROUNDS: usize = 16;

/// Threefry2x32-16: 16-round Threefish cipher
#[inline(always)]
pub(crate) fn threefry2x32_16(ctr: [u32; 2], key: [u32; 2]) -> [u32; 2] {
    let ks = [key[0], key[1], key[0] ^ key[1] ^ THREEFRY_PARITY32];

    let mut x = [ctr[0].wrapping_add(ks[0]), ctr[1].wrapping_add(ks[1])];

    for r in 0..THREEFRY_ROUNDS {
        // MIX
        x[0] = x[0].wrapping_add(x[1]);
        x[1] = x[1].rotate_left(THREEFRY_ROTATION[r % 8]) ^ x[0];

        // Inject key every 4 rounds
        if (r + 1) % 4 == 0 {
            let s = (r + 1) / 4;
            x[0] = x[0].wrapping_add(ks[s % 3]);
            x[1] = x[1].wrapping_add(ks[(s + 1) % 3]).wrapping_add(s as u32);
        }
    }

    x
}

/// Write words `[first, first + out.len())` of the stream keyed by `seed`
pub(crate) fn threefry_words(seed: u64, first: u64, out: &mut [u32]) {
    let key = [seed as u32, (seed >> 32) as u32];
    let mut block = None;
    let mut lanes = [0u32; 2];

    for (j, w) in out.iter_mut().enumerate() {
        let p = first.wrapping_add(j as u64);
        let b = p / 2;
        if block != Some(b) {
            lanes = threefry2x32_16([b as u32, (b >> 32) as u32], key);
            block = Some(b);
        }
        *w = lanes[(p % 2) as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_changes_output() {
        let a = threefry2x32_16([0, 0], [0, 0]);
        let b = threefry2x32_16([0, 0], [1, 0]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_counter_changes_output() {
        let a = threefry2x32_16([0, 0], [42, 0]);
        let b = threefry2x32_16([1, 0], [42, 0]);
        let c = threefry2x32_16([0, 1], [42, 0]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_unaligned_start() {
        let mut all = [0u32; 10];
        threefry_words(5, 0, &mut all);
        let mut tail = [0u32; 9];
        threefry_words(5, 1, &mut tail);
        assert_eq!(&all[1..], &tail[..]);
    }
}
