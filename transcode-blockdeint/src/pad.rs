//! Boundary padder.
//!
//! Blocks on a picture edge (and every block in woven mode) are processed
//! from a local 12x12 copy of the frame around the block instead of the
//! planes themselves. The window covers frame rows `y0 - 2 .. y0 + 10` and
//! columns `x0 - 2 .. x0 + 10`; whatever lies outside the picture (or the
//! rows a band view holds) is filled by replicating the nearest valid
//! sample, never by zeros.

use crate::params::BlockCoordinate;
use crate::plane::{FieldPair, Parity};
use crate::{BLK_HT, BLK_WD};

/// Window width in samples.
pub const PAD_WD: usize = BLK_WD + 4;
/// Window height in frame rows.
pub const PAD_HT: usize = BLK_HT + 4;
/// Row stride of the window when read as a frame.
pub const PAD_STRIDE: usize = PAD_WD;
/// Row stride of the window when read as one field.
pub const PAD_FIELD_STRIDE: usize = 2 * PAD_STRIDE;

const MARGIN: usize = 2;

/// A 12x12 edge-replicated window around one 8x8 block.
#[derive(Debug, Clone)]
pub struct PaddedBlock {
    buf: [u8; PAD_WD * PAD_HT],
}

impl PaddedBlock {
    /// Build the window for block `coord` of a `blocks_x x blocks_y` grid.
    ///
    /// `blk_w x blk_h` is the part of the block inside the picture. Sides
    /// that are picture edges replicate the first or last valid row and
    /// column; interior sides copy the real neighbourhood as far as
    /// `fields` holds it.
    pub fn gather(
        fields: &FieldPair<'_>,
        coord: BlockCoordinate,
        blocks_x: usize,
        blocks_y: usize,
        blk_w: usize,
        blk_h: usize,
    ) -> Self {
        let mut block = Self {
            buf: [0; PAD_WD * PAD_HT],
        };
        let (x0, y0) = coord.origin();
        let width = fields.width();
        if width == 0 || blk_w == 0 || blk_h == 0 {
            return block;
        }

        let left = if coord.block_col == 0 { x0 } else { x0 - MARGIN };
        let right = if coord.block_col + 1 >= blocks_x {
            x0 + blk_w - 1
        } else {
            x0 + BLK_WD + 1
        }
        .min(width - 1);

        let mut lo = if coord.block_row == 0 { y0 } else { y0 - MARGIN };
        let mut hi = if coord.block_row + 1 >= blocks_y {
            y0 + blk_h - 1
        } else {
            y0 + BLK_HT + 1
        };
        while lo < hi && fields.frame_row(lo).is_none() {
            lo += 1;
        }
        while hi > lo && fields.frame_row(hi).is_none() {
            hi -= 1;
        }
        if fields.frame_row(lo).is_none() || left > right {
            return block;
        }

        // Window coordinates of the copied rectangle.
        let (col_lo, col_hi) = (left + MARGIN - x0, right + MARGIN - x0);
        let (row_lo, row_hi) = (lo + MARGIN - y0, hi + MARGIN - y0);

        for (row, y) in (row_lo..=row_hi).zip(lo..=hi) {
            let Some(src) = fields.frame_row(y) else {
                // Hole inside the view: repeat the row above.
                block.buf.copy_within((row - 1) * PAD_STRIDE..row * PAD_STRIDE, row * PAD_STRIDE);
                continue;
            };
            let line = &mut block.buf[row * PAD_STRIDE..(row + 1) * PAD_STRIDE];
            line[col_lo..=col_hi].copy_from_slice(&src[left..=right]);
            let (first, last) = (line[col_lo], line[col_hi]);
            line[..col_lo].fill(first);
            line[col_hi + 1..].fill(last);
        }

        for row in 0..row_lo {
            block.buf.copy_within(row_lo * PAD_STRIDE..(row_lo + 1) * PAD_STRIDE, row * PAD_STRIDE);
        }
        for row in row_hi + 1..PAD_HT {
            block.buf.copy_within(row_hi * PAD_STRIDE..(row_hi + 1) * PAD_STRIDE, row * PAD_STRIDE);
        }

        block
    }

    /// Sample at window position `(x, y)`, i.e. frame `(x0 - 2 + x, y0 - 2 + y)`.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.buf[y * PAD_STRIDE + x]
    }

    /// Raw window, row-major with stride [`PAD_STRIDE`].
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The 8x4 block of field `parity`, read with [`PAD_FIELD_STRIDE`].
    pub fn field_block(&self, parity: Parity) -> &[u8] {
        let row = MARGIN + parity.index();
        &self.buf[row * PAD_STRIDE + MARGIN..]
    }

    /// Spatial filter source for a block whose current field has parity
    /// `current`, read with [`PAD_FIELD_STRIDE`].
    ///
    /// Starts one column left of the block on the current-field row just
    /// above the first missing row.
    pub fn filter_source(&self, current: Parity) -> &[u8] {
        let row = match current {
            Parity::Top => MARGIN,
            Parity::Bottom => MARGIN - 1,
        };
        &self.buf[row * PAD_STRIDE + MARGIN - 1..]
    }
}
