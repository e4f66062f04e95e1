//! Call configuration, row ranges and block coordinates.

use std::ops::Range;

use crate::plane::Parity;
use crate::BLK_HT;

/// Deinterlacing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeinterlaceMode {
    /// Unconditional field interleave, no decision logic.
    Weave,
    /// Per-block weave or edge-adaptive spatial interpolation.
    #[default]
    Spatial,
}

/// Architecture hint used to pick a backend when the context is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArchHint {
    /// Best backend the running CPU supports.
    #[default]
    Auto,
    /// Portable reference implementation.
    Generic,
    /// x86_64 SSE4.2.
    Sse42,
    /// AArch64 NEON.
    Neon,
}

/// SoC hint. Carried for callers that tag their platform; it does not
/// change the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SocHint {
    #[default]
    Generic,
    /// Vendor-specific tag.
    Vendor(u32),
}

/// Parameters for one deinterlace call.
///
/// There are no aligned allocate/free hooks. Processing never allocates:
/// the padded window and the filter output are fixed-size stack arrays,
/// and every frame buffer is borrowed from the caller.
///
/// ```
/// use transcode_blockdeint::{ArchHint, DeinterlaceMode, DeinterlaceParams, SocHint};
///
/// let params = DeinterlaceParams {
///     mode: DeinterlaceMode::Spatial,
///     current_field_is_top: true,
///     disable_weave: false,
///     arch: ArchHint::Auto,
///     soc: SocHint::Generic,
/// };
/// assert_eq!(params, DeinterlaceParams::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeinterlaceParams {
    /// Weave or spatial mode.
    pub mode: DeinterlaceMode,
    /// Whether the current field is the top (even-row) field.
    pub current_field_is_top: bool,
    /// Skip the baseline weave write (the caller already wove the frame).
    pub disable_weave: bool,
    /// Backend selection hint, consumed by [`DeinterlaceContext::new`](crate::DeinterlaceContext::new).
    pub arch: ArchHint,
    /// Platform tag.
    pub soc: SocHint,
}

impl Default for DeinterlaceParams {
    fn default() -> Self {
        Self {
            mode: DeinterlaceMode::Spatial,
            current_field_is_top: true,
            disable_weave: false,
            arch: ArchHint::Auto,
            soc: SocHint::Generic,
        }
    }
}

impl DeinterlaceParams {
    /// Create parameters with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode.
    pub fn with_mode(mut self, mode: DeinterlaceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the parity of the current field.
    pub fn with_current_field_top(mut self, top: bool) -> Self {
        self.current_field_is_top = top;
        self
    }

    /// Enable or disable the baseline weave write.
    pub fn with_disable_weave(mut self, disable: bool) -> Self {
        self.disable_weave = disable;
        self
    }

    /// Set the architecture hint.
    pub fn with_arch(mut self, arch: ArchHint) -> Self {
        self.arch = arch;
        self
    }

    /// Set the SoC hint.
    pub fn with_soc(mut self, soc: SocHint) -> Self {
        self.soc = soc;
        self
    }

    /// Parity of the current field.
    pub fn current_parity(&self) -> Parity {
        if self.current_field_is_top {
            Parity::Top
        } else {
            Parity::Bottom
        }
    }
}

/// Range of output-frame (full resolution luma) rows handled by one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRange {
    /// First row; must be a multiple of 8.
    pub start_row: u32,
    /// Number of rows.
    pub num_rows: u32,
}

impl RowRange {
    /// Create a row range.
    pub fn new(start_row: u32, num_rows: u32) -> Self {
        Self { start_row, num_rows }
    }

    /// Range covering a whole frame of `height` rows.
    pub fn full(height: u32) -> Self {
        Self::new(0, height)
    }

    /// One past the last row.
    pub fn end_row(&self) -> u32 {
        self.start_row.saturating_add(self.num_rows)
    }

    /// Whether the start row sits on an 8-row block boundary.
    pub fn is_aligned(&self) -> bool {
        self.start_row % BLK_HT as u32 == 0
    }

    /// Clip `num_rows` to the rows left before `height`.
    pub fn clip(&self, height: u32) -> Self {
        Self {
            start_row: self.start_row,
            num_rows: self.num_rows.min(height.saturating_sub(self.start_row)),
        }
    }

    /// Rows of plane `plane` owned by this range.
    ///
    /// Luma rows map one to one. Chroma rows are halved and both ends are
    /// rounded up to the 8-row block grid, so consecutive aligned ranges
    /// hand every chroma block row to exactly one range.
    pub fn plane_rows(&self, plane: usize, plane_height: usize) -> Range<usize> {
        let (start, end) = (self.start_row as usize, self.end_row() as usize);
        let (start, end) = if plane == 0 {
            (start, end)
        } else {
            ((start / 2).next_multiple_of(BLK_HT), (end / 2).next_multiple_of(BLK_HT))
        };
        let end = end.min(plane_height);
        start.min(end)..end
    }
}

/// Position of an 8x8 block inside a plane, in block units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockCoordinate {
    /// Block row.
    pub block_row: usize,
    /// Block column.
    pub block_col: usize,
}

impl BlockCoordinate {
    /// Create a block coordinate.
    pub fn new(block_row: usize, block_col: usize) -> Self {
        Self { block_row, block_col }
    }

    /// Number of blocks `(x, y)` needed to cover a `width x height` plane.
    pub fn plane_block_count(width: usize, height: usize) -> (usize, usize) {
        (width.div_ceil(crate::BLK_WD), height.div_ceil(BLK_HT))
    }

    /// Top-left sample of the block.
    pub fn origin(&self) -> (usize, usize) {
        (self.block_col * crate::BLK_WD, self.block_row * BLK_HT)
    }

    /// Whether the block touches an edge of a `blocks_x x blocks_y` grid.
    pub fn is_boundary(&self, blocks_x: usize, blocks_y: usize) -> bool {
        self.block_row == 0
            || self.block_col == 0
            || self.block_row + 1 >= blocks_y
            || self.block_col + 1 >= blocks_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_builder() {
        let params = DeinterlaceParams::new()
            .with_mode(DeinterlaceMode::Weave)
            .with_current_field_top(false)
            .with_disable_weave(true)
            .with_arch(ArchHint::Generic)
            .with_soc(SocHint::Vendor(7));

        assert_eq!(params.mode, DeinterlaceMode::Weave);
        assert_eq!(params.current_parity(), Parity::Bottom);
        assert!(params.disable_weave);
        assert_eq!(params.arch, ArchHint::Generic);
        assert_eq!(params.soc, SocHint::Vendor(7));

        let defaults = DeinterlaceParams::default();
        assert_eq!(defaults.mode, DeinterlaceMode::Spatial);
        assert_eq!(defaults.current_parity(), Parity::Top);
    }

    #[test]
    fn test_row_range_clip() {
        let range = RowRange::new(16, 100);
        assert_eq!(range.clip(48), RowRange::new(16, 32));
        assert_eq!(RowRange::new(64, 8).clip(48).num_rows, 0);
        assert!(range.is_aligned());
        assert!(!RowRange::new(12, 8).is_aligned());
    }

    #[test]
    fn test_plane_rows_mapping() {
        assert_eq!(RowRange::new(16, 16).plane_rows(0, 64), 16..32);
        assert_eq!(RowRange::new(16, 16).plane_rows(1, 32), 8..16);

        // 8-row luma ranges give every chroma block row to one range.
        assert_eq!(RowRange::new(0, 8).plane_rows(1, 32), 0..8);
        assert_eq!(RowRange::new(8, 8).plane_rows(1, 32), 8..8);
        assert_eq!(RowRange::new(16, 8).plane_rows(1, 32), 8..16);

        // Odd heights clip to the plane.
        assert_eq!(RowRange::new(16, 5).plane_rows(0, 21), 16..21);
        assert_eq!(RowRange::new(16, 5).plane_rows(1, 11), 8..11);
    }

    #[test]
    fn test_block_coordinate() {
        assert_eq!(BlockCoordinate::plane_block_count(17, 16), (3, 2));
        let coord = BlockCoordinate::new(1, 2);
        assert_eq!(coord.origin(), (16, 8));
        assert!(coord.is_boundary(3, 3));
        assert!(!BlockCoordinate::new(1, 1).is_boundary(3, 3));
        assert!(BlockCoordinate::new(0, 1).is_boundary(3, 3));
    }
}
