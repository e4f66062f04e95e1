//! # transcode-blockdeint
//!
//! Block-adaptive spatio-temporal deinterlacing for MPEG-style decode
//! pipelines.
//!
//! ## Overview
//!
//! Given the two fields of an interlaced frame (and, when available, the
//! previous field of the current parity), [`process`] rebuilds a progressive
//! frame one 8x8 block at a time. Each block either keeps the plain weave
//! of the two fields or has the rows of the missing parity replaced by an
//! edge-adaptive spatial interpolation of the current field:
//!
//! | Signal | Source | Effect |
//! |--------|--------|--------|
//! | Stationarity | SAD against the previous field, ratio-tested against the block variance | stationary blocks keep the weave |
//! | Combing | Row and column energy of both fields | combed blocks are interpolated |
//! | Degraded | Picture edge, or no previous field | always interpolated |
//!
//! The crate never allocates frames and keeps no state between calls:
//! every buffer is caller-owned and borrowed through [`Plane`] /
//! [`PlaneMut`] views.
//!
//! ## Quick Start
//!
//! ```
//! use transcode_blockdeint::{
//!     process, DeinterlaceContext, DeinterlaceParams, Picture, PictureMut, Plane, PlaneMut,
//!     RowRange,
//! };
//!
//! let (width, height) = (64, 32);
//! let top = vec![16u8; width * height / 2];
//! let bottom = vec![235u8; width * height / 2];
//! let mut frame = vec![0u8; width * height];
//!
//! let params = DeinterlaceParams::default();
//! let ctx = DeinterlaceContext::new(&params);
//!
//! let current = Picture::gray(Plane::new(&top, width, height / 2, width)?);
//! let next = Picture::gray(Plane::new(&bottom, width, height / 2, width)?);
//! let mut out = PictureMut::gray(PlaneMut::new(&mut frame, width, height, width)?);
//!
//! process(Some(&ctx), None, &current, &next, &mut out, &params, RowRange::full(height as u32))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Concurrency
//!
//! A call only writes output rows inside its [`RowRange`].
//! [`PictureMut::split_bands`] cuts an output picture into disjoint
//! 8-row-aligned bands so independent workers can process one band each
//! while sharing the read-only fields and a single [`DeinterlaceContext`].
//!
//! ## Feature Flags
//!
//! - `simd` (default): SSE4.2 (x86_64) and NEON (aarch64) backends,
//!   selected at runtime and bit-identical to the generic code.
//! - `serde`: `Serialize`/`Deserialize` for the configuration types.

#![allow(clippy::needless_range_loop)]

pub mod cac;
pub mod context;
pub mod error;
pub mod metrics;
pub mod pad;
pub mod params;
pub mod plane;
pub mod process;
pub mod simd;
pub mod spatial;
pub mod weave;

/// Block width in samples.
pub const BLK_WD: usize = 8;
/// Block height in frame rows.
pub const BLK_HT: usize = 8;

// Re-export main types
pub use context::{context_size, DeinterlaceContext};
pub use error::{DeinterlaceError, LayoutError, Result};
pub use params::{ArchHint, BlockCoordinate, DeinterlaceMode, DeinterlaceParams, RowRange, SocHint};
pub use plane::{ColorFormat, FieldPair, Parity, Picture, PictureMut, Plane, PlaneMut};
pub use process::{process, process_woven};
pub use simd::{detect_simd, Backend, BlockOps, GenericOps, SimdCapabilities};
pub use weave::{weave, Overlap};
