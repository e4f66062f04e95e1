//! Edge-adaptive spatial interpolation of the missing field rows.
//!
//! The filter reads five consecutive rows of the current field and produces
//! the four rows of the opposite parity that sit between them. Each 4-wide
//! half of the block picks one of three edge directions (90, 45 or 135
//! degrees) and averages along it.

/// Width of the interpolated block.
pub const FILTER_WD: usize = 8;
/// Rows produced by the filter.
pub const FILTER_HT: usize = 4;
/// Source field rows read by the filter.
pub const FILTER_SRC_ROWS: usize = FILTER_HT + 1;

const SUB_BLK_WD: usize = 4;

/// Bias on the vertical (90 degree) difference.
const EDGE_BIAS_0: u32 = 5;
/// Bias on the diagonal differences.
const EDGE_BIAS_1: u32 = 7;

/// Horizontal shift along the detected edge.
///
/// Row `k` of the source is read at `+shift` and row `k + 1` at `-shift`.
pub(crate) fn edge_shift(diff_90: u32, diff_135: u32, diff_45: u32) -> isize {
    let diff_90 = diff_90 * EDGE_BIAS_0;
    let diff_135 = diff_135 * EDGE_BIAS_1;
    let diff_45 = diff_45 * EDGE_BIAS_1;

    if diff_45 <= diff_135 && diff_45 <= diff_90 {
        1
    } else if diff_135 <= diff_90 {
        -1
    } else {
        0
    }
}

/// Interpolate an 8x4 block of missing rows.
///
/// `src[0]` is the sample one column left of the block in the first of five
/// current-field rows spaced `src_stride` apart; the filter reads columns
/// `0..=9` of each row, so `src` must hold `4 * src_stride + 10` bytes.
/// Output row `k` lies between source rows `k` and `k + 1` and is written
/// to `out[k * out_stride..][..8]`.
pub fn spatial_filter(src: &[u8], src_stride: usize, out: &mut [u8], out_stride: usize) {
    for half in 0..2 {
        let base = half * SUB_BLK_WD + 1;

        let mut diff = [0u32; 3];
        for k in 0..FILTER_HT {
            let r1 = &src[k * src_stride..];
            let r2 = &src[(k + 1) * src_stride..];
            for c in base..base + SUB_BLK_WD {
                diff[0] += r1[c].abs_diff(r2[c]) as u32;
                diff[1] += r1[c - 1].abs_diff(r2[c + 1]) as u32;
                diff[2] += r1[c + 1].abs_diff(r2[c - 1]) as u32;
            }
        }

        let shift = edge_shift(diff[0], diff[1], diff[2]);

        for k in 0..FILTER_HT {
            let r1 = &src[k * src_stride..];
            let r2 = &src[(k + 1) * src_stride..];
            let dst = &mut out[k * out_stride + half * SUB_BLK_WD..][..SUB_BLK_WD];
            for (i, px) in dst.iter_mut().enumerate() {
                let c = base + i;
                let a = r1[c.wrapping_add_signed(shift)] as u32;
                let b = r2[c.wrapping_add_signed(-shift)] as u32;
                *px = ((a + b + 1) >> 1) as u8;
            }
        }
    }
}
