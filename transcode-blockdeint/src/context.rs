//! Deinterlace context.

use crate::params::DeinterlaceParams;
use crate::plane::MAX_PLANES;
use crate::simd::{Backend, BlockOps};

/// Reference variance of a luma block.
pub const EXPECTED_VARIANCE_LUMA: u32 = 735;
/// Reference variance of a chroma block.
pub const EXPECTED_VARIANCE_CHROMA: u32 = 38;

const EXPECTED_VARIANCE: [u32; MAX_PLANES] = [
    EXPECTED_VARIANCE_LUMA,
    EXPECTED_VARIANCE_CHROMA,
    EXPECTED_VARIANCE_CHROMA,
];

/// Working state of the deinterlacer: the bound block primitives and the
/// per-plane expected variances fed to the stationarity test.
///
/// [`process`](crate::process) copies the variances at the start of each
/// call and never writes the context back, so one context can be shared by
/// any number of concurrent calls.
#[derive(Debug, Clone, Copy)]
pub struct DeinterlaceContext {
    ops: &'static dyn BlockOps,
    expected_variance: [u32; MAX_PLANES],
}

impl DeinterlaceContext {
    /// Create a context, binding the backend `params.arch` resolves to.
    pub fn new(params: &DeinterlaceParams) -> Self {
        let backend = Backend::resolve(params.arch);
        tracing::debug!(
            backend = backend.name(),
            arch = ?params.arch,
            soc = ?params.soc,
            "deinterlace context created"
        );
        Self::with_backend(backend)
    }

    /// Create a context bound to `backend` (or generic code if the CPU
    /// cannot run it).
    pub fn with_backend(backend: Backend) -> Self {
        Self::with_ops(backend.ops())
    }

    /// Create a context over caller-supplied primitives.
    pub fn with_ops(ops: &'static dyn BlockOps) -> Self {
        Self {
            ops,
            expected_variance: EXPECTED_VARIANCE,
        }
    }

    /// Backend of the bound primitives.
    pub fn backend(&self) -> Backend {
        self.ops.backend()
    }

    pub(crate) fn ops(&self) -> &'static dyn BlockOps {
        self.ops
    }

    /// Reference variance per plane (luma, then the two chroma planes).
    pub fn expected_variance(&self) -> [u32; MAX_PLANES] {
        self.expected_variance
    }
}

impl Default for DeinterlaceContext {
    fn default() -> Self {
        Self::new(&DeinterlaceParams::default())
    }
}

/// Bytes a caller must reserve for a [`DeinterlaceContext`].
pub const fn context_size() -> usize {
    std::mem::size_of::<DeinterlaceContext>()
}
