//! x86_64 block primitives using SSE4.2.
//!
//! All functions in this module are unsafe because they require the CPU to
//! support SSE4.2. Calling them on a CPU without it results in an illegal
//! instruction fault. Loads and stores go through slice indexing, so a
//! short buffer panics exactly like the generic code instead of reading
//! out of bounds.

use std::arch::x86_64::*;

use super::{Backend, BlockOps};
use crate::cac::{self, CombSums};
use crate::metrics::variance_from_sums;
use crate::spatial::{edge_shift, FILTER_HT};

/// Moves bytes 0..4 into the low and bytes 4..8 into the high qword, so one
/// `psadbw` yields both 4-wide half sums.
const SPLIT_HALVES: [i8; 16] = [0, 1, 2, 3, -128, -128, -128, -128, 4, 5, 6, 7, -128, -128, -128, -128];

/// SSE4.2 implementation of [`BlockOps`].
///
/// Only handed out by [`Backend::ops`] after the CPU check.
#[derive(Debug)]
pub struct Sse42Ops {
    _private: (),
}

impl Sse42Ops {
    pub(super) const UNCHECKED: Self = Self { _private: () };
}

impl BlockOps for Sse42Ops {
    fn backend(&self) -> Backend {
        Backend::Sse42
    }

    fn sad_8x4(&self, src: &[u8], src_stride: usize, reference: &[u8], ref_stride: usize) -> u32 {
        // SAFETY: SSE4.2 support was checked before this instance was exposed.
        unsafe { sad_8x4_sse42(src, src_stride, reference, ref_stride) }
    }

    fn variance_8x4(&self, src: &[u8], stride: usize) -> u32 {
        // SAFETY: as above.
        unsafe { variance_8x4_sse42(src, stride) }
    }

    fn cac_8x8(&self, top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool {
        // SAFETY: as above.
        unsafe { cac_8x8_sse42(top, top_stride, bot, bot_stride) }
    }

    fn spatial_filter(&self, src: &[u8], src_stride: usize, out: &mut [u8], out_stride: usize) {
        // SAFETY: as above.
        unsafe { spatial_filter_sse42(src, src_stride, out, out_stride) }
    }
}

/// Load 8 bytes at `offset` into the low qword.
#[inline]
#[target_feature(enable = "sse4.2")]
unsafe fn load8(src: &[u8], offset: usize) -> __m128i {
    let bytes = &src[offset..offset + 8];
    _mm_loadl_epi64(bytes.as_ptr() as *const __m128i)
}

/// Store the low qword to 8 bytes at `offset`.
#[inline]
#[target_feature(enable = "sse4.2")]
unsafe fn store8(dst: &mut [u8], offset: usize, v: __m128i) {
    let bytes = &mut dst[offset..offset + 8];
    _mm_storel_epi64(bytes.as_mut_ptr() as *mut __m128i, v);
}

#[inline]
#[target_feature(enable = "sse4.2")]
unsafe fn hsum_epi32(v: __m128i) -> u32 {
    let v = _mm_add_epi32(v, _mm_shuffle_epi32(v, 0b01_00_11_10));
    let v = _mm_add_epi32(v, _mm_shuffle_epi32(v, 0b10_11_00_01));
    _mm_cvtsi128_si32(v) as u32
}

/// Sums of bytes 0..4 and 4..8 of `v`.
#[inline]
#[target_feature(enable = "sse4.2")]
unsafe fn half_sums(v: __m128i, split: __m128i) -> [u32; 2] {
    let s = split_sad(v, _mm_setzero_si128(), split);
    [qword_lo(s), qword_hi(s)]
}

/// SSE4.2 sum of absolute differences over 8x4.
///
/// # Safety
///
/// * The CPU must support SSE4.2. Use `detect_simd().sse42` to check.
#[target_feature(enable = "sse4.2")]
pub unsafe fn sad_8x4_sse42(src: &[u8], src_stride: usize, reference: &[u8], ref_stride: usize) -> u32 {
    let mut acc = _mm_setzero_si128();
    for row in 0..4 {
        let a = load8(src, row * src_stride);
        let b = load8(reference, row * ref_stride);
        acc = _mm_add_epi64(acc, _mm_sad_epu8(a, b));
    }
    _mm_cvtsi128_si32(acc) as u32
}

/// SSE4.2 variance over 8x4.
///
/// # Safety
///
/// * The CPU must support SSE4.2. Use `detect_simd().sse42` to check.
#[target_feature(enable = "sse4.2")]
pub unsafe fn variance_8x4_sse42(src: &[u8], stride: usize) -> u32 {
    let zero = _mm_setzero_si128();
    let mut sum = zero;
    let mut sum_sq = zero;
    for row in 0..4 {
        let px = load8(src, row * stride);
        sum = _mm_add_epi64(sum, _mm_sad_epu8(px, zero));
        let wide = _mm_cvtepu8_epi16(px);
        sum_sq = _mm_add_epi32(sum_sq, _mm_madd_epi16(wide, wide));
    }
    variance_from_sums(_mm_cvtsi128_si32(sum) as u32, hsum_epi32(sum_sq))
}

/// SSE4.2 combing detector. Computes the sums of both halves in vector
/// registers and shares the decision with the generic code.
///
/// # Safety
///
/// * The CPU must support SSE4.2. Use `detect_simd().sse42` to check.
#[target_feature(enable = "sse4.2")]
pub unsafe fn cac_8x8_sse42(top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool {
    let split = _mm_loadu_si128(SPLIT_HALVES.as_ptr() as *const __m128i);
    let mut halves = [CombSums::default(); 2];
    let mut top_wide = [_mm_setzero_si128(); 4];
    let mut bot_wide = [_mm_setzero_si128(); 4];

    for row in 0..4 {
        let t = load8(top, row * top_stride);
        let b = load8(bot, row * bot_stride);
        let [t0, t1] = half_sums(t, split);
        let [b0, b1] = half_sums(b, split);
        halves[0].top_rows[row] = t0;
        halves[1].top_rows[row] = t1;
        halves[0].bot_rows[row] = b0;
        halves[1].bot_rows[row] = b1;
        top_wide[row] = _mm_cvtepu8_epi16(t);
        bot_wide[row] = _mm_cvtepu8_epi16(b);
    }

    for pair in 0..2 {
        let mut t = [0u16; 8];
        let mut b = [0u16; 8];
        let ts = _mm_add_epi16(top_wide[2 * pair], top_wide[2 * pair + 1]);
        let bs = _mm_add_epi16(bot_wide[2 * pair], bot_wide[2 * pair + 1]);
        _mm_storeu_si128(t.as_mut_ptr() as *mut __m128i, ts);
        _mm_storeu_si128(b.as_mut_ptr() as *mut __m128i, bs);
        for col in 0..8 {
            let half = &mut halves[col / 4];
            half.top_pairs[pair][col % 4] = t[col] as u32;
            half.bot_pairs[pair][col % 4] = b[col] as u32;
        }
    }

    cac::is_combed(&halves[0]) || cac::is_combed(&halves[1])
}

/// SSE4.2 edge-adaptive spatial filter.
///
/// # Safety
///
/// * The CPU must support SSE4.2. Use `detect_simd().sse42` to check.
#[target_feature(enable = "sse4.2")]
pub unsafe fn spatial_filter_sse42(src: &[u8], src_stride: usize, out: &mut [u8], out_stride: usize) {
    let split = _mm_loadu_si128(SPLIT_HALVES.as_ptr() as *const __m128i);

    // Per row pair: [left, centre, right] taps of the upper and lower row.
    let mut upper = [[_mm_setzero_si128(); 3]; FILTER_HT];
    let mut lower = [[_mm_setzero_si128(); 3]; FILTER_HT];
    let mut d90 = _mm_setzero_si128();
    let mut d135 = _mm_setzero_si128();
    let mut d45 = _mm_setzero_si128();

    for k in 0..FILTER_HT {
        for tap in 0..3 {
            upper[k][tap] = load8(src, k * src_stride + tap);
            lower[k][tap] = load8(src, (k + 1) * src_stride + tap);
        }
        d90 = _mm_add_epi64(d90, split_sad(upper[k][1], lower[k][1], split));
        d135 = _mm_add_epi64(d135, split_sad(upper[k][0], lower[k][2], split));
        d45 = _mm_add_epi64(d45, split_sad(upper[k][2], lower[k][0], split));
    }

    let shifts = [
        edge_shift(qword_lo(d90), qword_lo(d135), qword_lo(d45)),
        edge_shift(qword_hi(d90), qword_hi(d135), qword_hi(d45)),
    ];

    for k in 0..FILTER_HT {
        let mut halves = [_mm_setzero_si128(); 2];
        for (half, &shift) in shifts.iter().enumerate() {
            let (a, b) = match shift {
                1 => (upper[k][2], lower[k][0]),
                -1 => (upper[k][0], lower[k][2]),
                _ => (upper[k][1], lower[k][1]),
            };
            halves[half] = _mm_avg_epu8(a, b);
        }
        store8(out, k * out_stride, _mm_blend_epi16(halves[0], halves[1], 0b0000_1100));
    }
}

/// Per-half SADs of `a` and `b`, in the low and high qword.
#[inline]
#[target_feature(enable = "sse4.2")]
unsafe fn split_sad(a: __m128i, b: __m128i, split: __m128i) -> __m128i {
    _mm_sad_epu8(_mm_shuffle_epi8(a, split), _mm_shuffle_epi8(b, split))
}

#[inline]
#[target_feature(enable = "sse4.2")]
unsafe fn qword_lo(v: __m128i) -> u32 {
    _mm_cvtsi128_si32(v) as u32
}

#[inline]
#[target_feature(enable = "sse4.2")]
unsafe fn qword_hi(v: __m128i) -> u32 {
    _mm_extract_epi32(v, 2) as u32
}
