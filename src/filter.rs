//! Batched selection kernel.
//!
//! Filter masks produced by `WHERE` evaluation tend to come in long runs of
//! all-pass or all-reject. The mask is therefore scanned [`FILTER_BATCH`]
//! bytes at a time and each batch is classified first: empty batches are
//! skipped, full batches are copied with a single `extend_from_slice`, and
//! only mixed batches fall back to a per-row scan.

/// Mask bytes classified per batch. Matches one 128-bit SIMD word.
pub const FILTER_BATCH: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum BatchMask {
    /// No row selected.
    Empty,
    /// Every row selected.
    Full,
    Mixed,
}

#[cfg(not(feature = "nightly"))]
const LOW_BITS: u64 = 0x0101_0101_0101_0101;
#[cfg(not(feature = "nightly"))]
const HIGH_BITS: u64 = 0x8080_8080_8080_8080;

/// True when at least one byte of `word` is zero.
#[cfg(not(feature = "nightly"))]
#[inline(always)]
fn has_zero_byte(word: u64) -> bool {
    word.wrapping_sub(LOW_BITS) & !word & HIGH_BITS != 0
}

#[cfg(not(feature = "nightly"))]
#[inline(always)]
fn classify(batch: &[u8; FILTER_BATCH]) -> BatchMask {
    let word = u128::from_ne_bytes(*batch);
    let (lo, hi) = (word as u64, (word >> 64) as u64);

    if lo | hi == 0 {
        BatchMask::Empty
    } else if !has_zero_byte(lo) && !has_zero_byte(hi) {
        BatchMask::Full
    } else {
        BatchMask::Mixed
    }
}

#[cfg(feature = "nightly")]
#[inline(always)]
fn classify(batch: &[u8; FILTER_BATCH]) -> BatchMask {
    use std::simd::{cmp::SimdPartialEq, u8x16};

    let selected = u8x16::from_array(*batch).simd_ne(u8x16::splat(0));
    if !selected.any() {
        BatchMask::Empty
    } else if selected.all() {
        BatchMask::Full
    } else {
        BatchMask::Mixed
    }
}

/// Appends to `out` every `data[i]` whose `mask[i]` is nonzero, in order.
///
/// `data` and `mask` must have equal length; the caller checks this.
pub(crate) fn filter_into<T: Copy>(data: &[T], mask: &[u8], out: &mut Vec<T>) {
    debug_assert_eq!(data.len(), mask.len());

    let mut values = data.chunks_exact(FILTER_BATCH);
    let (batches, tail) = mask.as_chunks::<FILTER_BATCH>();

    for (values, flags) in (&mut values).zip(batches) {
        match classify(flags) {
            BatchMask::Empty => {}
            BatchMask::Full => out.extend_from_slice(values),
            BatchMask::Mixed => scalar_filter(values, flags, out),
        }
    }

    scalar_filter(values.remainder(), tail, out);
}

#[inline(always)]
fn scalar_filter<T: Copy>(values: &[T], flags: &[u8], out: &mut Vec<T>) {
    for (&value, &flag) in values.iter().zip(flags) {
        if flag != 0 {
            out.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn naive(data: &[u32], mask: &[u8]) -> Vec<u32> {
        data.iter()
            .zip(mask)
            .filter(|(_, f)| **f != 0)
            .map(|(v, _)| *v)
            .collect()
    }

    fn run(data: &[u32], mask: &[u8]) -> Vec<u32> {
        let mut out = Vec::new();
        filter_into(data, mask, &mut out);
        out
    }

    #[test]
    fn classify_batches() {
        assert_eq!(classify(&[0; 16]), BatchMask::Empty);
        assert_eq!(classify(&[1; 16]), BatchMask::Full);
        assert_eq!(classify(&[0xFF; 16]), BatchMask::Full);

        let mut one_hole = [7u8; 16];
        one_hole[15] = 0;
        assert_eq!(classify(&one_hole), BatchMask::Mixed);

        let mut one_set = [0u8; 16];
        one_set[3] = 0x80;
        assert_eq!(classify(&one_set), BatchMask::Mixed);
    }

    #[test]
    fn classify_reads_both_halves() {
        let mut batch = [0u8; 16];
        batch[8] = 1;
        assert_eq!(classify(&batch), BatchMask::Mixed);

        let mut batch = [1u8; 16];
        batch[0] = 0;
        assert_eq!(classify(&batch), BatchMask::Mixed);

        let data: Vec<u32> = (0..16).collect();
        let mut mask = [0u8; 16];
        mask[12] = 1;
        assert_eq!(run(&data, &mask), vec![12]);
    }

    #[test]
    fn classify_every_single_zero_position() {
        for pos in 0..FILTER_BATCH {
            let mut batch = [0x01u8; 16];
            batch[pos] = 0;
            assert_eq!(classify(&batch), BatchMask::Mixed, "zero at {pos}");
        }
    }

    #[test]
    fn classify_high_bytes_without_false_zero() {
        // 0x01 followed by 0x00 borrows across bytes in the SWAR test; make
        // sure bytes above a real zero are not misreported either way.
        let batch = [0x00, 0x01, 0x80, 0xFF, 0x01, 0x01, 0x01, 0x01, 1, 1, 1, 1, 1, 1, 1, 1];
        assert_eq!(classify(&batch), BatchMask::Mixed);
        let batch = [0x01, 0x80, 0xFF, 0x02, 0x01, 0x01, 0x01, 0x01, 1, 1, 1, 1, 1, 1, 1, 1];
        assert_eq!(classify(&batch), BatchMask::Full);
    }

    #[test]
    fn empty_input() {
        assert!(run(&[], &[]).is_empty());
    }

    #[test]
    fn all_rejected_and_all_selected() {
        let data: Vec<u32> = (0..100).collect();
        assert!(run(&data, &[0; 100]).is_empty());
        assert_eq!(run(&data, &[1; 100]), data);
    }

    #[test]
    fn remainder_only() {
        let data: Vec<u32> = (0..15).collect();
        let mask: Vec<u8> = (0..15).map(|i| (i % 2) as u8).collect();
        assert_eq!(run(&data, &mask), naive(&data, &mask));
    }

    #[test]
    fn matches_naive_on_random_masks() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for len in [0usize, 1, 15, 16, 17, 31, 32, 33, 100, 1000, 4099] {
            let data: Vec<u32> = (0..len).map(|_| rng.random()).collect();
            for density in [0u32, 5, 50, 95, 100] {
                let mask: Vec<u8> = (0..len)
                    .map(|_| {
                        if rng.random_range(0..100) < density {
                            rng.random_range(1..=255)
                        } else {
                            0
                        }
                    })
                    .collect();
                assert_eq!(run(&data, &mask), naive(&data, &mask), "len {len}");
            }
        }
    }

    #[test]
    fn matches_naive_on_runs() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let len = 2000;
        let data: Vec<u32> = (0..len).collect();
        let mut mask = Vec::with_capacity(len as usize);
        let mut on = false;
        while mask.len() < len as usize {
            let run_len = rng.random_range(1..70);
            mask.extend(std::iter::repeat_n(on as u8, run_len));
            on = !on;
        }
        mask.truncate(len as usize);
        assert_eq!(run(&data, &mask), naive(&data, &mask));
    }
}
