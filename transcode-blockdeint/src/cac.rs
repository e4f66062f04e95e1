//! Combing-artifact detection on 8x8 frame blocks.
//!
//! The block is read as two 4-wide halves. For each half the detector
//! compares "adjacent" energy (top field row against the neighbouring
//! bottom field row) with "alternate" energy (a field against itself two
//! frame rows away). Weaving a block that moved between fields makes the
//! adjacent term dominate.
//!
//! The thresholds, shifts and bias below are fixed constants of the
//! algorithm; every backend computes the same [`CombSums`] and shares the
//! decision in [`is_combed`].

/// Width of one detector half.
const SUB_BLK_WD: usize = 4;
/// Field rows per half.
const SUB_BLK_HT: usize = 4;

/// Per-sample noise gate for adjacent differences.
const RSUM_CSUM_THRESH_PER_PEL: u32 = 5;
/// Gate applied to 4-sample row sums.
const RSUM_THRESH: u32 = RSUM_CSUM_THRESH_PER_PEL * SUB_BLK_WD as u32;
/// Column terms are per-sample averages; scale them to row-sum units.
const CSUM_SHIFT: u32 = 2;
/// Multiplicative bias on the alternate energy (`alt >> shift`).
const SAD_BIAS_MULT_SHIFT: u32 = 4;
/// Additive bias on the alternate energy (half of it is applied).
const SAD_BIAS_ADDITIVE: u32 = 64;

/// Row and column sums of one 4x8 detector half.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CombSums {
    /// 4-sample sums of each top field row.
    pub top_rows: [u32; SUB_BLK_HT],
    /// 4-sample sums of each bottom field row.
    pub bot_rows: [u32; SUB_BLK_HT],
    /// Per column, sums of top field rows {0, 1} and {2, 3}.
    pub top_pairs: [[u32; SUB_BLK_WD]; 2],
    /// Per column, sums of bottom field rows {0, 1} and {2, 3}.
    pub bot_pairs: [[u32; SUB_BLK_WD]; 2],
}

impl CombSums {
    /// Gather the sums of the 4x8 half whose top-left samples are `top[0]`
    /// and `bot[0]`.
    pub fn gather(top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> Self {
        let mut sums = Self::default();
        for row in 0..SUB_BLK_HT {
            let t = &top[row * top_stride..row * top_stride + SUB_BLK_WD];
            let b = &bot[row * bot_stride..row * bot_stride + SUB_BLK_WD];
            let pair = row / 2;
            for col in 0..SUB_BLK_WD {
                sums.top_rows[row] += t[col] as u32;
                sums.bot_rows[row] += b[col] as u32;
                sums.top_pairs[pair][col] += t[col] as u32;
                sums.bot_pairs[pair][col] += b[col] as u32;
            }
        }
        sums
    }
}

/// Decide whether a 4x8 half shows combing.
pub(crate) fn is_combed(sums: &CombSums) -> bool {
    let mut adj = 0u32;
    let mut alt = 0u32;

    let (t, b) = (&sums.top_rows, &sums.bot_rows);

    // Row based: top/bottom neighbours are adjacent, same-field rows alternate.
    for row in 0..SUB_BLK_HT {
        let diff = t[row].abs_diff(b[row]);
        if diff >= RSUM_THRESH {
            adj += diff;
        }
    }
    for row in 0..SUB_BLK_HT - 1 {
        let diff = b[row].abs_diff(t[row + 1]);
        if diff >= RSUM_THRESH {
            adj += diff;
        }
        alt += t[row].abs_diff(t[row + 1]);
        alt += b[row].abs_diff(b[row + 1]);
    }

    // Column based, on 4-row box averages of each field.
    for col in 0..SUB_BLK_WD {
        let top_avg = (sums.top_pairs[0][col] + sums.top_pairs[1][col] + 2) >> 2;
        let bot_avg = (sums.bot_pairs[0][col] + sums.bot_pairs[1][col] + 2) >> 2;
        let diff = top_avg.abs_diff(bot_avg);
        if diff >= RSUM_CSUM_THRESH_PER_PEL {
            adj += diff << CSUM_SHIFT;
        }

        let top_upper = (sums.top_pairs[0][col] + 1) >> 1;
        let top_lower = (sums.top_pairs[1][col] + 1) >> 1;
        let bot_upper = (sums.bot_pairs[0][col] + 1) >> 1;
        let bot_lower = (sums.bot_pairs[1][col] + 1) >> 1;
        alt += (top_upper.abs_diff(top_lower) + bot_upper.abs_diff(bot_lower)) << CSUM_SHIFT;
    }

    alt += (alt >> SAD_BIAS_MULT_SHIFT) + (SAD_BIAS_ADDITIVE >> 1);

    alt < adj
}

/// Detect combing in one 4x8 half.
pub fn cac_4x8(top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool {
    is_combed(&CombSums::gather(top, top_stride, bot, bot_stride))
}

/// Detect combing in an 8x8 frame block given its two 8x4 fields.
///
/// Each slice must hold `3 * stride + 8` bytes. Stops at the first combed
/// half.
pub fn cac_8x8(top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool {
    cac_4x8(top, top_stride, bot, bot_stride)
        || cac_4x8(&top[SUB_BLK_WD..], top_stride, &bot[SUB_BLK_WD..], bot_stride)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split an 8x8 frame block (row-major, stride 8) into its two fields.
    fn fields(frame: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
        let mut top = [0u8; 32];
        let mut bot = [0u8; 32];
        for row in 0..4 {
            top[row * 8..row * 8 + 8].copy_from_slice(&frame[row * 16..row * 16 + 8]);
            bot[row * 8..row * 8 + 8].copy_from_slice(&frame[row * 16 + 8..row * 16 + 16]);
        }
        (top, bot)
    }

    #[test]
    fn test_combed_block() {
        let top = [50u8; 32];
        let bot = [200u8; 32];
        assert!(cac_8x8(&top, 8, &bot, 8));
    }

    #[test]
    fn test_flat_block_is_clean() {
        let flat = [128u8; 32];
        assert!(!cac_8x8(&flat, 8, &flat, 8));
    }

    #[test]
    fn test_vertical_gradient_is_clean() {
        let mut frame = [0u8; 64];
        for y in 0..8 {
            frame[y * 8..y * 8 + 8].fill((y * 10) as u8);
        }
        let (top, bot) = fields(&frame);
        assert!(!cac_8x8(&top, 8, &bot, 8));
    }

    #[test]
    fn test_small_differences_are_gated() {
        // 4 levels per sample stays under the per-sample noise gate.
        let top = [100u8; 32];
        let bot = [104u8; 32];
        assert!(!cac_8x8(&top, 8, &bot, 8));
    }

    #[test]
    fn test_combing_in_right_half_only() {
        let mut top = [80u8; 32];
        let bot = [80u8; 32];
        for row in 0..4 {
            top[row * 8 + 4..row * 8 + 8].fill(220);
        }
        assert!(!cac_4x8(&top, 8, &bot, 8));
        assert!(cac_8x8(&top, 8, &bot, 8));
    }

    #[test]
    fn test_deterministic() {
        let top: Vec<u8> = (0..32).map(|i| (i * 37 % 256) as u8).collect();
        let bot: Vec<u8> = (0..32).map(|i| (i * 91 % 256) as u8).collect();
        let first = cac_8x8(&top, 8, &bot, 8);
        for _ in 0..4 {
            assert_eq!(cac_8x8(&top, 8, &bot, 8), first);
        }
        let swapped = cac_8x8(&bot, 8, &top, 8);
        assert_eq!(cac_8x8(&bot, 8, &top, 8), swapped);
    }

    #[test]
    fn test_gather_sums() {
        let top: Vec<u8> = (0..32).map(|i| i as u8).collect();
        let bot = [1u8; 32];
        let sums = CombSums::gather(&top, 8, &bot, 8);
        assert_eq!(sums.top_rows, [6, 38, 70, 102]);
        assert_eq!(sums.bot_rows, [4; 4]);
        assert_eq!(sums.top_pairs[0], [8, 10, 12, 14]);
        assert_eq!(sums.top_pairs[1], [40, 42, 44, 46]);
        assert_eq!(sums.bot_pairs, [[2; 4]; 2]);
    }
}
