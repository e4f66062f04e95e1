//! Field weaving.

use std::ops::Range;

use crate::params::RowRange;
use crate::plane::{FieldPair, Picture, PictureMut, PlaneMut, MAX_PLANES};

/// Relationship between the source fields and the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Fields and output are separate buffers.
    Disjoint,
    /// The output frame already holds the woven fields; weaving is a no-op
    /// and reads come from the frame itself.
    InPlace,
}

impl Overlap {
    /// Whether a weave write has anything to do.
    pub fn needs_weave(self) -> bool {
        matches!(self, Overlap::Disjoint)
    }
}

/// Interleave `top` into the even and `bottom` into the odd output rows
/// covered by `range`, for every plane the three pictures share.
///
/// Rows are clipped to what both the fields and the output hold.
pub fn weave(top: &Picture<'_>, bottom: &Picture<'_>, out: &mut PictureMut<'_>, range: RowRange) {
    for index in 0..MAX_PLANES {
        let (Some(t), Some(b)) = (top.plane(index), bottom.plane(index)) else {
            continue;
        };
        let Some(dst) = out.plane_mut(index) else {
            continue;
        };
        let rows = range.plane_rows(index, dst.height());
        weave_rows(&FieldPair::new(t, b), dst, rows);
    }
}

/// Weave frame rows `rows` of one plane.
pub(crate) fn weave_rows(fields: &FieldPair<'_>, out: &mut PlaneMut<'_>, rows: Range<usize>) {
    let width = fields.width().min(out.width());
    for y in rows {
        let (Some(src), Some(dst)) = (fields.frame_row(y), out.row_mut(y)) else {
            continue;
        };
        dst[..width].copy_from_slice(&src[..width]);
    }
}
