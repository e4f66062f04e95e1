//! Block primitive backends.
//!
//! The orchestrator never calls the primitives directly; it goes through a
//! [`BlockOps`] implementation bound once when the context is built. Every
//! backend must return exactly what the generic one returns, so switching
//! backends never changes an output frame.
//!
//! | Operation | Generic | SSE4.2 (x86_64) | NEON (aarch64) |
//! |-----------|---------|-----------------|----------------|
//! | `sad_8x4` | ✅ | ✅ `psadbw` | ✅ `uabal` |
//! | `variance_8x4` | ✅ | ✅ `pmaddwd` | ✅ `umull` |
//! | `cac_8x8` | ✅ | ✅ sums only, shared decision | ✅ sums only, shared decision |
//! | `spatial_filter` | ✅ | ✅ `pavgb` | ✅ `urhadd` |

use std::fmt;

mod detect;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod x86_64;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod aarch64;

pub use detect::{detect_simd, SimdCapabilities};

use crate::params::ArchHint;
use crate::{cac, metrics, spatial};

/// The four block primitives the decision engine needs.
///
/// Slice arguments follow the generic functions: each metric block needs
/// `3 * stride + 8` bytes, the spatial filter source `4 * stride + 10`
/// bytes and its output `3 * out_stride + 8` bytes.
pub trait BlockOps: Send + Sync + fmt::Debug {
    /// Backend this implementation belongs to.
    fn backend(&self) -> Backend;

    /// See [`metrics::sad_8x4`].
    fn sad_8x4(&self, src: &[u8], src_stride: usize, reference: &[u8], ref_stride: usize) -> u32;

    /// See [`metrics::variance_8x4`].
    fn variance_8x4(&self, src: &[u8], stride: usize) -> u32;

    /// See [`cac::cac_8x8`].
    fn cac_8x8(&self, top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool;

    /// See [`spatial::spatial_filter`].
    fn spatial_filter(&self, src: &[u8], src_stride: usize, out: &mut [u8], out_stride: usize);
}

/// Portable reference backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericOps;

impl BlockOps for GenericOps {
    fn backend(&self) -> Backend {
        Backend::Generic
    }

    fn sad_8x4(&self, src: &[u8], src_stride: usize, reference: &[u8], ref_stride: usize) -> u32 {
        metrics::sad_8x4(src, src_stride, reference, ref_stride)
    }

    fn variance_8x4(&self, src: &[u8], stride: usize) -> u32 {
        metrics::variance_8x4(src, stride)
    }

    fn cac_8x8(&self, top: &[u8], top_stride: usize, bot: &[u8], bot_stride: usize) -> bool {
        cac::cac_8x8(top, top_stride, bot, bot_stride)
    }

    fn spatial_filter(&self, src: &[u8], src_stride: usize, out: &mut [u8], out_stride: usize) {
        spatial::spatial_filter(src, src_stride, out, out_stride)
    }
}

static GENERIC: GenericOps = GenericOps;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
static SSE42: x86_64::Sse42Ops = x86_64::Sse42Ops::UNCHECKED;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
static NEON: aarch64::NeonOps = aarch64::NeonOps::UNCHECKED;

/// Implementation family of the block primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Backend {
    /// Portable scalar code.
    Generic,
    /// x86_64 SSE4.2.
    Sse42,
    /// AArch64 NEON.
    Neon,
}

impl Backend {
    /// Every backend, best first.
    pub const ALL: [Backend; 3] = [Backend::Sse42, Backend::Neon, Backend::Generic];

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Generic => "generic",
            Backend::Sse42 => "sse4.2",
            Backend::Neon => "neon",
        }
    }

    /// Whether this build carries the backend and `caps` can run it.
    pub fn is_supported(self, caps: &SimdCapabilities) -> bool {
        match self {
            Backend::Generic => true,
            Backend::Sse42 => cfg!(all(feature = "simd", target_arch = "x86_64")) && caps.sse42,
            Backend::Neon => cfg!(all(feature = "simd", target_arch = "aarch64")) && caps.neon,
        }
    }

    /// Backends the running CPU can execute, best first.
    pub fn available() -> Vec<Backend> {
        let caps = detect_simd();
        Self::ALL
            .into_iter()
            .filter(|b| b.is_supported(&caps))
            .collect()
    }

    /// Resolve an architecture hint.
    ///
    /// `Auto` picks the best available backend. An explicit request the CPU
    /// cannot honour resolves to `Generic`.
    pub fn resolve(hint: ArchHint) -> Backend {
        let caps = detect_simd();
        let requested = match hint {
            ArchHint::Auto => {
                return Self::ALL
                    .into_iter()
                    .find(|b| b.is_supported(&caps))
                    .unwrap_or(Backend::Generic)
            }
            ArchHint::Generic => Backend::Generic,
            ArchHint::Sse42 => Backend::Sse42,
            ArchHint::Neon => Backend::Neon,
        };
        if requested.is_supported(&caps) {
            requested
        } else {
            tracing::debug!(
                requested = requested.name(),
                "backend not supported on this CPU, using generic"
            );
            Backend::Generic
        }
    }

    /// The primitives of this backend, or the generic ones if the CPU
    /// cannot run it.
    pub fn ops(self) -> &'static dyn BlockOps {
        if !self.is_supported(&detect_simd()) {
            return &GENERIC;
        }
        match self {
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Backend::Sse42 => &SSE42,
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Backend::Neon => &NEON,
            _ => &GENERIC,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
