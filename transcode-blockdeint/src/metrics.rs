//! Block metric engine: SAD and variance over 8x4 field blocks.
//!
//! Both metrics work on one field's share of an 8x8 frame block, i.e. eight
//! samples wide and four field rows tall. The variance formula is a fixed
//! integer contract, so every backend must reproduce it exactly.

/// Width of a metric block.
pub const METRIC_WD: usize = 8;
/// Height of a metric block (field rows).
pub const METRIC_HT: usize = 4;

const METRIC_N: u32 = (METRIC_WD * METRIC_HT) as u32;

/// Sum of absolute differences between two 8x4 blocks.
///
/// Each slice must hold `3 * stride + 8` bytes.
pub fn sad_8x4(src: &[u8], src_stride: usize, reference: &[u8], ref_stride: usize) -> u32 {
    let mut sad = 0u32;
    for row in 0..METRIC_HT {
        let a = &src[row * src_stride..row * src_stride + METRIC_WD];
        let b = &reference[row * ref_stride..row * ref_stride + METRIC_WD];
        sad += a
            .iter()
            .zip(b)
            .map(|(&a, &b)| a.abs_diff(b) as u32)
            .sum::<u32>();
    }
    sad
}

/// Variance of an 8x4 block: `(n * sum(x^2) - sum(x)^2) / n^2` with `n = 32`,
/// truncating.
pub fn variance_8x4(src: &[u8], stride: usize) -> u32 {
    let mut sum = 0u32;
    let mut sum_sq = 0u32;
    for row in 0..METRIC_HT {
        for &px in &src[row * stride..row * stride + METRIC_WD] {
            let px = px as u32;
            sum += px;
            sum_sq += px * px;
        }
    }
    variance_from_sums(sum, sum_sq)
}

/// Finish the variance from the block sum and sum of squares.
#[inline]
pub(crate) fn variance_from_sums(sum: u32, sum_sq: u32) -> u32 {
    (METRIC_N * sum_sq - sum * sum) / (METRIC_N * METRIC_N)
}
