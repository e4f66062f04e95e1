//! AArch64 block primitives using NEON.
//!
//! All functions in this module are unsafe because they use NEON
//! intrinsics. NEON is part of the AArch64 baseline, but the backend is
//! still only exposed after the runtime check.

use std::arch::aarch64::*;

use super::{Backend, BlockOps};
use crate::cac::{self, CombSums};
use crate::metrics::variance_from_sums;
use crate::spatial::{edge_shift, FILTER_HT};

/// Lane mask selecting the left 4-wide half.
const LEFT_HALF: u64 = 0x0000_0000_FFFF_FFFF;

/// NEON implementation of [`BlockOps`].
///
/// Only handed out by [`Backend::ops`] after the CPU check.
#[derive(Debug)]
pub struct NeonOps {
    _private: (),
}

impl NeonOps {
    pub(super) const UNCHECKED: Self = Self { _private: () };
}

impl BlockOps for NeonOps {
    fn backend(&self) -> Backend {
        Backend::Neon
    }

    fn sad_8x4(&self, src: &[u8], src_stride: usize, reference: &[u8], ref_stride: usize) -> u32 {
        // SAFETY: NEON support was checked before this instance was exposed.
        unsafe { sad_8x4_neon(src, src_stride, reference, ref_stride) }
    }

    fn variance_8x4(&self, src: &[u8], stride: usize) -> u32 {
        // SAFETY: as above.
        unsafe { variance_8x4_neon(src, stride) }
    }

    fn cac_8x8(&self, top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool {
        // SAFETY: as above.
        unsafe { cac_8x8_neon(top, top_stride, bot, bot_stride) }
    }

    fn spatial_filter(&self, src: &[u8], src_stride: usize, out: &mut [u8], out_stride: usize) {
        // SAFETY: as above.
        unsafe { spatial_filter_neon(src, src_stride, out, out_stride) }
    }
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn load8(src: &[u8], offset: usize) -> uint8x8_t {
    vld1_u8(src[offset..offset + 8].as_ptr())
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn store8(dst: &mut [u8], offset: usize, v: uint8x8_t) {
    vst1_u8(dst[offset..offset + 8].as_mut_ptr(), v);
}

/// Sums of lanes 0..4 and 4..8.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn half_sums(v: uint16x8_t) -> [u32; 2] {
    let quads = vpaddlq_u32(vpaddlq_u16(v));
    [vgetq_lane_u64(quads, 0) as u32, vgetq_lane_u64(quads, 1) as u32]
}

/// NEON sum of absolute differences over 8x4.
///
/// # Safety
///
/// * The CPU must support NEON instructions (standard on aarch64).
#[target_feature(enable = "neon")]
pub unsafe fn sad_8x4_neon(src: &[u8], src_stride: usize, reference: &[u8], ref_stride: usize) -> u32 {
    let mut acc = vdupq_n_u16(0);
    for row in 0..4 {
        let a = load8(src, row * src_stride);
        let b = load8(reference, row * ref_stride);
        acc = vabal_u8(acc, a, b);
    }
    vaddlvq_u16(acc)
}

/// NEON variance over 8x4.
///
/// # Safety
///
/// * The CPU must support NEON instructions (standard on aarch64).
#[target_feature(enable = "neon")]
pub unsafe fn variance_8x4_neon(src: &[u8], stride: usize) -> u32 {
    let mut sum = vdupq_n_u16(0);
    let mut sum_sq = vdupq_n_u32(0);
    for row in 0..4 {
        let px = load8(src, row * stride);
        sum = vaddw_u8(sum, px);
        sum_sq = vpadalq_u16(sum_sq, vmull_u8(px, px));
    }
    variance_from_sums(vaddlvq_u16(sum), vaddvq_u32(sum_sq))
}

/// NEON combing detector. Computes the sums of both halves in vector
/// registers and shares the decision with the generic code.
///
/// # Safety
///
/// * The CPU must support NEON instructions (standard on aarch64).
#[target_feature(enable = "neon")]
pub unsafe fn cac_8x8_neon(top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool {
    let mut halves = [CombSums::default(); 2];
    let mut t = [vdup_n_u8(0); 4];
    let mut b = [vdup_n_u8(0); 4];

    for row in 0..4 {
        t[row] = load8(top, row * top_stride);
        b[row] = load8(bot, row * bot_stride);
        let [t0, t1] = half_sums(vmovl_u8(t[row]));
        let [b0, b1] = half_sums(vmovl_u8(b[row]));
        halves[0].top_rows[row] = t0;
        halves[1].top_rows[row] = t1;
        halves[0].bot_rows[row] = b0;
        halves[1].bot_rows[row] = b1;
    }

    for pair in 0..2 {
        let mut ts = [0u16; 8];
        let mut bs = [0u16; 8];
        vst1q_u16(ts.as_mut_ptr(), vaddl_u8(t[2 * pair], t[2 * pair + 1]));
        vst1q_u16(bs.as_mut_ptr(), vaddl_u8(b[2 * pair], b[2 * pair + 1]));
        for col in 0..8 {
            let half = &mut halves[col / 4];
            half.top_pairs[pair][col % 4] = ts[col] as u32;
            half.bot_pairs[pair][col % 4] = bs[col] as u32;
        }
    }

    cac::is_combed(&halves[0]) || cac::is_combed(&halves[1])
}

/// NEON edge-adaptive spatial filter.
///
/// # Safety
///
/// * The CPU must support NEON instructions (standard on aarch64).
#[target_feature(enable = "neon")]
pub unsafe fn spatial_filter_neon(src: &[u8], src_stride: usize, out: &mut [u8], out_stride: usize) {
    // Per row pair: [left, centre, right] taps of the upper and lower row.
    let mut upper = [[vdup_n_u8(0); 3]; FILTER_HT];
    let mut lower = [[vdup_n_u8(0); 3]; FILTER_HT];
    let mut d90 = vdupq_n_u16(0);
    let mut d135 = vdupq_n_u16(0);
    let mut d45 = vdupq_n_u16(0);

    for k in 0..FILTER_HT {
        for tap in 0..3 {
            upper[k][tap] = load8(src, k * src_stride + tap);
            lower[k][tap] = load8(src, (k + 1) * src_stride + tap);
        }
        d90 = vabal_u8(d90, upper[k][1], lower[k][1]);
        d135 = vabal_u8(d135, upper[k][0], lower[k][2]);
        d45 = vabal_u8(d45, upper[k][2], lower[k][0]);
    }

    let (d90, d135, d45) = (half_sums(d90), half_sums(d135), half_sums(d45));
    let shifts = [
        edge_shift(d90[0], d135[0], d45[0]),
        edge_shift(d90[1], d135[1], d45[1]),
    ];
    let left = vcreate_u8(LEFT_HALF);

    for k in 0..FILTER_HT {
        let mut halves = [vdup_n_u8(0); 2];
        for (half, &shift) in shifts.iter().enumerate() {
            let (a, b) = match shift {
                1 => (upper[k][2], lower[k][0]),
                -1 => (upper[k][0], lower[k][2]),
                _ => (upper[k][1], lower[k][1]),
            };
            halves[half] = vrhadd_u8(a, b);
        }
        store8(out, k * out_stride, vbsl_u8(left, halves[0], halves[1]));
    }
}
