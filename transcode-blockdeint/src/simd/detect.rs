//! Runtime SIMD feature detection.

/// SIMD capabilities of the running CPU that a backend can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimdCapabilities {
    /// SSE4.2 support (x86_64).
    pub sse42: bool,
    /// NEON support (baseline for AArch64).
    pub neon: bool,
}

impl SimdCapabilities {
    /// Check if any SIMD acceleration is available.
    pub fn has_simd(&self) -> bool {
        self.sse42 || self.neon
    }

    /// Get the best available SIMD level as a string.
    pub fn best_level(&self) -> &'static str {
        if self.sse42 {
            "SSE4.2"
        } else if self.neon {
            "NEON"
        } else {
            "Scalar"
        }
    }
}

/// Detect SIMD capabilities at runtime.
#[cfg(target_arch = "x86_64")]
pub fn detect_simd() -> SimdCapabilities {
    SimdCapabilities {
        sse42: is_x86_feature_detected!("sse4.2"),
        ..Default::default()
    }
}

/// Detect SIMD capabilities at runtime (ARM).
#[cfg(target_arch = "aarch64")]
pub fn detect_simd() -> SimdCapabilities {
    SimdCapabilities {
        neon: std::arch::is_aarch64_feature_detected!("neon"),
        ..Default::default()
    }
}

/// Fallback for unsupported architectures.
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub fn detect_simd() -> SimdCapabilities {
    SimdCapabilities::default()
}
