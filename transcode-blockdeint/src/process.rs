//! Block decision orchestrator.
//!
//! For every 8x8 block of every plane inside the requested row range the
//! orchestrator either keeps the woven field rows or replaces the rows of
//! the missing parity with the spatial filter output:
//!
//! 1. Blocks on a picture edge, and every block without a usable previous
//!    field, are *degraded*: no metrics run and the block is always
//!    interpolated, from a [`PaddedBlock`] window.
//! 2. Otherwise SAD (previous field against the bottom field) and variance
//!    (of the top field) feed a stationarity ratio test. Stationary blocks
//!    keep the weave.
//! 3. Blocks failing the test go through the combing detector; combed
//!    blocks are interpolated, the rest keep the weave.

use std::ops::Range;

use crate::context::DeinterlaceContext;
use crate::error::{DeinterlaceError, Result};
use crate::metrics::{METRIC_HT, METRIC_WD};
use crate::pad::{PaddedBlock, PAD_FIELD_STRIDE};
use crate::params::{BlockCoordinate, DeinterlaceMode, DeinterlaceParams, RowRange};
use crate::plane::{FieldPair, Parity, Picture, PictureMut, Plane, PlaneMut, MAX_PLANES};
use crate::simd::BlockOps;
use crate::spatial::{FILTER_HT, FILTER_SRC_ROWS, FILTER_WD};
use crate::weave::{self, Overlap};
use crate::{BLK_HT, BLK_WD};

/// Stationarity threshold (15 in 1/8 units, scaled to a 32-sample block).
const ST_THRESH: u64 = 60;
/// Weight of the opposing variance term in the ratio test.
const ST_K: u64 = 3;

/// Per-call block counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BlockStats {
    /// Blocks visited.
    pub blocks: usize,
    /// Blocks that kept the weave.
    pub woven: usize,
    /// Blocks replaced by the spatial filter.
    pub spatial: usize,
    /// Blocks that skipped the metrics.
    pub degraded: usize,
}

/// Deinterlace the rows of `range` into `out`.
///
/// `current` and `next` are the two fields of the frame being rebuilt
/// (`params.current_field_is_top` says which one is the top field);
/// `previous` is the field of the current parity one frame earlier, or
/// `None` when no temporal reference exists. Planes missing from `current`,
/// `next` or `out` are skipped.
///
/// Fails with [`DeinterlaceError::InvalidContext`] when `ctx` is `None` and
/// with [`DeinterlaceError::StartRowUnaligned`] when `range.start_row` is
/// not a multiple of 8. In both cases `out` is left untouched.
///
/// Only output rows inside `range` are written, so calls over disjoint
/// ranges (see [`PictureMut::split_bands`]) can run concurrently.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(
        mode = ?params.mode,
        top = params.current_field_is_top,
        start_row = range.start_row,
        num_rows = range.num_rows,
    )
)]
pub fn process(
    ctx: Option<&DeinterlaceContext>,
    previous: Option<&Picture<'_>>,
    current: &Picture<'_>,
    next: &Picture<'_>,
    out: &mut PictureMut<'_>,
    params: &DeinterlaceParams,
    range: RowRange,
) -> Result<()> {
    let ctx = validate(ctx, range)?;
    let (top, bottom) = if params.current_field_is_top {
        (current, next)
    } else {
        (next, current)
    };
    let stats = run(ctx, previous, Some((top, bottom)), out, params, range);
    trace_stats(&stats, Overlap::Disjoint);
    Ok(())
}

/// Deinterlace an output frame that already holds the two woven fields.
///
/// Same decisions as [`process`], but the fields are read back from `out`
/// itself: no weave write happens and every block is read through a padded
/// window copied out of the frame before the block is written. On a band
/// view the window can only see the band's rows; rows beyond it are
/// replicated from the band edge.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(
        mode = ?params.mode,
        top = params.current_field_is_top,
        start_row = range.start_row,
        num_rows = range.num_rows,
    )
)]
pub fn process_woven(
    ctx: Option<&DeinterlaceContext>,
    previous: Option<&Picture<'_>>,
    out: &mut PictureMut<'_>,
    params: &DeinterlaceParams,
    range: RowRange,
) -> Result<()> {
    let ctx = validate(ctx, range)?;
    let stats = run(ctx, previous, None, out, params, range);
    trace_stats(&stats, Overlap::InPlace);
    Ok(())
}

fn validate(ctx: Option<&DeinterlaceContext>, range: RowRange) -> Result<&DeinterlaceContext> {
    let Some(ctx) = ctx else {
        tracing::debug!("no deinterlace context supplied");
        return Err(DeinterlaceError::InvalidContext);
    };
    if !range.is_aligned() {
        tracing::debug!(start_row = range.start_row, "row range is not block aligned");
        return Err(DeinterlaceError::start_row_unaligned(range.start_row));
    }
    Ok(ctx)
}

fn trace_stats(stats: &BlockStats, overlap: Overlap) {
    tracing::trace!(
        ?overlap,
        blocks = stats.blocks,
        woven = stats.woven,
        spatial = stats.spatial,
        degraded = stats.degraded,
        "deinterlace done"
    );
}

/// Where a plane's two fields are read from.
#[derive(Clone, Copy)]
enum Source<'a> {
    /// Separate field buffers.
    Fields(FieldPair<'a>),
    /// The output plane itself.
    Woven,
}

/// Everything the block loop needs about one plane.
struct PlaneJob<'a> {
    source: Source<'a>,
    previous: Option<Plane<'a>>,
    expected_variance: u32,
    current: Parity,
    weave: bool,
    width: usize,
    height: usize,
    blocks_x: usize,
    blocks_y: usize,
}

/// Geometry of one block.
struct Block {
    coord: BlockCoordinate,
    blk_w: usize,
    blk_h: usize,
    boundary: bool,
}

/// Run the decision engine after the preconditions passed. `fields` is the
/// `(top, bottom)` picture pair, or `None` to read them from `out`.
pub(crate) fn run(
    ctx: &DeinterlaceContext,
    previous: Option<&Picture<'_>>,
    fields: Option<(&Picture<'_>, &Picture<'_>)>,
    out: &mut PictureMut<'_>,
    params: &DeinterlaceParams,
    range: RowRange,
) -> BlockStats {
    let mut stats = BlockStats::default();
    let luma_height = out.plane(0).map_or(0, |p| p.height());
    let range = range.clip(u32::try_from(luma_height).unwrap_or(u32::MAX));
    let overlap = if fields.is_some() {
        Overlap::Disjoint
    } else {
        Overlap::InPlace
    };
    let weave = overlap.needs_weave() && !params.disable_weave;

    if params.mode == DeinterlaceMode::Weave {
        if let (true, Some((top, bottom))) = (weave, fields) {
            weave::weave(top, bottom, out, range);
        }
        return stats;
    }

    let expected_variance = ctx.expected_variance();
    for index in 0..MAX_PLANES {
        let Some(dst) = out.plane_mut(index) else {
            continue;
        };
        let source = match fields {
            Some((top, bottom)) => match (top.plane(index), bottom.plane(index)) {
                (Some(t), Some(b)) => Source::Fields(FieldPair::new(t, b)),
                _ => continue,
            },
            None => Source::Woven,
        };
        let (width, height) = match &source {
            Source::Fields(f) => (f.width().min(dst.width()), f.frame_height().min(dst.height())),
            Source::Woven => (dst.width(), dst.height()),
        };
        let (blocks_x, blocks_y) = BlockCoordinate::plane_block_count(width, height);
        let job = PlaneJob {
            source,
            previous: previous.and_then(|p| p.plane(index)),
            expected_variance: expected_variance[index],
            current: params.current_parity(),
            weave,
            width,
            height,
            blocks_x,
            blocks_y,
        };
        let rows = range.plane_rows(index, height);
        process_plane(ctx.ops(), &job, dst, rows, &mut stats);
    }

    stats
}

fn process_plane(
    ops: &dyn BlockOps,
    job: &PlaneJob<'_>,
    out: &mut PlaneMut<'_>,
    rows: Range<usize>,
    stats: &mut BlockStats,
) {
    if job.width == 0 || rows.is_empty() {
        return;
    }
    let missing = job.current.opposite();

    for block_row in rows.start / BLK_HT..rows.end.div_ceil(BLK_HT) {
        let y0 = block_row * BLK_HT;
        let blk_h = BLK_HT.min(job.height - y0);

        if let (true, Source::Fields(fields)) = (job.weave, &job.source) {
            weave::weave_rows(fields, out, y0..y0 + blk_h);
        }

        // Writes trail the reads by one block: a padded window reaches two
        // columns into its left neighbour, which must still hold the weave.
        let mut pending: Option<(Block, [u8; FILTER_WD * FILTER_HT])> = None;

        for block_col in 0..job.blocks_x {
            let coord = BlockCoordinate::new(block_row, block_col);
            let block = Block {
                coord,
                blk_w: BLK_WD.min(job.width - block_col * BLK_WD),
                blk_h,
                boundary: coord.is_boundary(job.blocks_x, job.blocks_y),
            };

            let filtered = {
                let fields = match job.source {
                    Source::Fields(fields) => fields,
                    Source::Woven => out.as_plane().fields(),
                };
                classify(ops, job, &fields, &block, stats)
            };

            if let Some((prev_block, rows)) = pending.take() {
                write_block(out, &rows, &prev_block, missing);
            }
            pending = filtered.map(|rows| (block, rows));
        }

        if let Some((block, rows)) = pending {
            write_block(out, &rows, &block, missing);
        }
    }
}

/// Where one block's field samples and filter source are read from.
enum BlockWindow<'a> {
    /// Straight from the field planes (interior block, whole
    /// neighbourhood present).
    Direct {
        top: (&'a [u8], usize),
        bottom: (&'a [u8], usize),
        source: (&'a [u8], usize),
    },
    /// From an edge-replicated copy.
    Padded(PaddedBlock),
}

impl BlockWindow<'_> {
    /// The 8x4 block of field `parity` and its stride.
    fn field(&self, parity: Parity) -> (&[u8], usize) {
        match self {
            BlockWindow::Direct { top, bottom, .. } => match parity {
                Parity::Top => *top,
                Parity::Bottom => *bottom,
            },
            BlockWindow::Padded(p) => (p.field_block(parity), PAD_FIELD_STRIDE),
        }
    }

    /// Spatial filter source and its stride.
    fn filter_source(&self, current: Parity) -> (&[u8], usize) {
        match self {
            BlockWindow::Direct { source, .. } => *source,
            BlockWindow::Padded(p) => (p.filter_source(current), PAD_FIELD_STRIDE),
        }
    }
}

/// Run the decision for one block; returns the interpolated rows when the
/// block must not keep the weave.
fn classify(
    ops: &dyn BlockOps,
    job: &PlaneJob<'_>,
    fields: &FieldPair<'_>,
    block: &Block,
    stats: &mut BlockStats,
) -> Option<[u8; FILTER_WD * FILTER_HT]> {
    let (x0, y0) = block.coord.origin();
    let f0 = y0 / 2;
    stats.blocks += 1;

    let direct = match job.source {
        Source::Fields(_) if !block.boundary => direct_window(fields, job.current, x0, f0),
        _ => None,
    };
    let window = direct.unwrap_or_else(|| {
        BlockWindow::Padded(PaddedBlock::gather(
            fields,
            block.coord,
            job.blocks_x,
            job.blocks_y,
            block.blk_w,
            block.blk_h,
        ))
    });

    let reference = if block.boundary {
        None
    } else {
        job.previous
            .filter(|p| p.contains(x0, f0, METRIC_WD, METRIC_HT))
            .and_then(|p| Some((p.window(x0, f0)?, p.stride())))
    };

    let spatial = match reference {
        None => {
            stats.degraded += 1;
            true
        }
        Some((prev, prev_stride)) => {
            let (top, top_stride) = window.field(Parity::Top);
            let (bot, bot_stride) = window.field(Parity::Bottom);
            let sad = ops.sad_8x4(prev, prev_stride, bot, bot_stride);
            let variance = ops.variance_8x4(top, top_stride);
            !is_stationary(sad, variance, job.expected_variance)
                && ops.cac_8x8(top, top_stride, bot, bot_stride)
        }
    };

    if !spatial {
        stats.woven += 1;
        return None;
    }
    stats.spatial += 1;

    let (src, src_stride) = window.filter_source(job.current);
    let mut filtered = [0u8; FILTER_WD * FILTER_HT];
    ops.spatial_filter(src, src_stride, &mut filtered, FILTER_WD);
    Some(filtered)
}

/// Field blocks and spatial filter source read straight from the planes,
/// if the fields hold the whole neighbourhood of an interior block.
fn direct_window<'a>(
    fields: &FieldPair<'a>,
    current: Parity,
    x0: usize,
    f0: usize,
) -> Option<BlockWindow<'a>> {
    let plane = fields.get(current);
    let x = x0.checked_sub(1)?;
    let row = match current {
        Parity::Top => f0,
        Parity::Bottom => f0.checked_sub(1)?,
    };
    let whole = fields.top.contains(x0, f0, METRIC_WD, METRIC_HT)
        && fields.bottom.contains(x0, f0, METRIC_WD, METRIC_HT)
        && plane.contains(x, row, FILTER_WD + 2, FILTER_SRC_ROWS);
    if !whole {
        return None;
    }
    Some(BlockWindow::Direct {
        top: (fields.top.window(x0, f0)?, fields.top.stride()),
        bottom: (fields.bottom.window(x0, f0)?, fields.bottom.stride()),
        source: (plane.window(x, row)?, plane.stride()),
    })
}

/// `sad * (v + k*e) <= thresh * (e + k*v)`: the SAD is small relative to
/// the texture of the block.
fn is_stationary(sad: u32, variance: u32, expected: u32) -> bool {
    let (sad, variance, expected) = (sad as u64, variance as u64, expected as u64);
    let numerator = ST_THRESH * (expected + ST_K * variance);
    let denominator = variance + ST_K * expected;
    sad * denominator <= numerator
}

/// Copy the interpolated rows of `block` into `out`, clipped to the part of
/// the block inside the picture.
fn write_block(out: &mut PlaneMut<'_>, filtered: &[u8; FILTER_WD * FILTER_HT], block: &Block, missing: Parity) {
    let (x0, y0) = block.coord.origin();
    for k in 0..FILTER_HT {
        let dy = 2 * k + missing.index();
        if dy >= block.blk_h {
            break;
        }
        if let Some(row) = out.row_mut(y0 + dy) {
            row[x0..x0 + block.blk_w].copy_from_slice(&filtered[k * FILTER_WD..k * FILTER_WD + block.blk_w]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EXPECTED_VARIANCE_LUMA;
    use crate::params::ArchHint;
    use crate::simd::GenericOps;

    fn gray(data: &[u8], width: usize, height: usize) -> Picture<'_> {
        Picture::gray(Plane::new(data, width, height, width).unwrap())
    }

    fn gray_mut(data: &mut [u8], width: usize, height: usize) -> PictureMut<'_> {
        PictureMut::gray(PlaneMut::new(data, width, height, width).unwrap())
    }

    /// Run with the generic backend over the whole frame.
    fn run_frame(
        previous: Option<&[u8]>,
        top: &[u8],
        bottom: &[u8],
        out: &mut [u8],
        size: usize,
        params: &DeinterlaceParams,
    ) -> BlockStats {
        let prev = previous.map(|p| gray(p, size, size / 2));
        let (t, b) = (gray(top, size, size / 2), gray(bottom, size, size / 2));
        let mut dst = gray_mut(out, size, size);
        run(
            &DeinterlaceContext::with_ops(&GenericOps),
            prev.as_ref(),
            Some((&t, &b)),
            &mut dst,
            params,
            RowRange::full(size as u32),
        )
    }

    #[test]
    fn test_no_previous_field_degrades_every_block() {
        let top = vec![50u8; 16 * 8];
        let bottom = vec![200u8; 16 * 8];
        let mut out = vec![0u8; 16 * 16];

        let stats = run_frame(None, &top, &bottom, &mut out, 16, &DeinterlaceParams::default());
        assert_eq!(
            stats,
            BlockStats {
                blocks: 4,
                woven: 0,
                spatial: 4,
                degraded: 4
            }
        );

        for y in 0..16 {
            let row = &out[y * 16..y * 16 + 16];
            if y % 2 == 0 {
                assert!(row.iter().all(|&v| v == 50), "row {y}");
            } else {
                // Interpolated from the top field, so it differs from the weave.
                assert!(row.iter().all(|&v| v != 200), "row {y}");
            }
        }
        // Row 15 averages row 14 with the replicated last row.
        assert!(out[15 * 16..].iter().all(|&v| v == 125));
        assert!(out[16..32].iter().all(|&v| v == 50));
    }

    #[test]
    fn test_identical_fields_keep_the_weave() {
        let field = vec![77u8; 32 * 16];
        let mut out = vec![0u8; 32 * 32];

        let stats = run_frame(Some(&field), &field, &field, &mut out, 32, &DeinterlaceParams::default());
        assert_eq!(stats.blocks, 16);
        assert_eq!(stats.woven, 4);
        assert_eq!(stats.degraded, 12);
        assert!(out.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_textured_stationary_interior_is_woven() {
        let top: Vec<u8> = (0..32 * 16).map(|i| (i * 7 % 256) as u8).collect();
        let bottom: Vec<u8> = (0..32 * 16).map(|i| (i * 13 % 256) as u8).collect();
        let mut out = vec![0u8; 32 * 32];

        // SAD compares the previous field with the bottom field.
        let stats = run_frame(Some(&bottom), &top, &bottom, &mut out, 32, &DeinterlaceParams::default());
        assert_eq!(stats.woven, 4);

        for y in 8..24 {
            let expected = if y % 2 == 0 {
                &top[(y / 2) * 32 + 8..(y / 2) * 32 + 24]
            } else {
                &bottom[(y / 2) * 32 + 8..(y / 2) * 32 + 24]
            };
            assert_eq!(&out[y * 32 + 8..y * 32 + 24], expected, "row {y}");
        }
    }

    #[test]
    fn test_motion_and_combing_trigger_spatial() {
        let top = vec![50u8; 32 * 16];
        let bottom = vec![200u8; 32 * 16];
        let mut out = vec![0u8; 32 * 32];

        let stats = run_frame(Some(&top), &top, &bottom, &mut out, 32, &DeinterlaceParams::default());
        assert_eq!(stats.spatial, 16);
        assert_eq!(stats.degraded, 12);
        assert!(out[8 * 32..24 * 32].iter().all(|&v| v == 50));
    }

    #[test]
    fn test_motion_without_combing_keeps_the_weave() {
        let previous = vec![0u8; 32 * 16];
        let field = vec![100u8; 32 * 16];
        let mut out = vec![0u8; 32 * 32];

        let stats = run_frame(Some(&previous), &field, &field, &mut out, 32, &DeinterlaceParams::default());
        assert_eq!(stats.woven, 4);
        assert_eq!(stats.spatial, 12);
    }

    #[test]
    fn test_bottom_current_interpolates_top_rows() {
        let top = vec![200u8; 16 * 8];
        let bottom = vec![50u8; 16 * 8];
        let mut out = vec![0u8; 16 * 16];

        let params = DeinterlaceParams::new().with_current_field_top(false);
        let stats = run_frame(None, &top, &bottom, &mut out, 16, &params);
        assert_eq!(stats.spatial, 4);

        for y in 1..16 {
            assert!(out[y * 16..(y + 1) * 16].iter().all(|&v| v == 50), "row {y}");
        }
        // Row 0 averages the replicated first row with row 1.
        assert!(out[..16].iter().all(|&v| v == 125));
    }

    #[test]
    fn test_weave_mode() {
        let top = vec![10u8; 16 * 8];
        let bottom = vec![20u8; 16 * 8];
        let mut out = vec![0u8; 16 * 16];

        let params = DeinterlaceParams::new().with_mode(DeinterlaceMode::Weave);
        let stats = run_frame(None, &top, &bottom, &mut out, 16, &params);
        assert_eq!(stats, BlockStats::default());
        for y in 0..16 {
            let expected = if y % 2 == 0 { 10 } else { 20 };
            assert!(out[y * 16..(y + 1) * 16].iter().all(|&v| v == expected));
        }
    }

    #[test]
    fn test_disable_weave_only_writes_interpolated_rows() {
        let top = vec![10u8; 16 * 8];
        let bottom = vec![20u8; 16 * 8];
        let mut out = vec![255u8; 16 * 16];

        let params = DeinterlaceParams::new().with_disable_weave(true);
        run_frame(None, &top, &bottom, &mut out, 16, &params);
        for y in 0..16 {
            let row = &out[y * 16..(y + 1) * 16];
            if y % 2 == 0 {
                assert!(row.iter().all(|&v| v == 255), "row {y}");
            } else {
                assert!(row.iter().all(|&v| v != 255), "row {y}");
            }
        }
    }

    #[test]
    fn test_partial_blocks_are_clipped() {
        // 13x11 output: the last block column is 5 wide, the last block row 3 tall.
        let top = vec![40u8; 13 * 6];
        let bottom = vec![90u8; 13 * 5];
        let mut out = vec![0u8; 13 * 11 + 7];
        let sentinel = out.len() - 7;
        out[sentinel..].fill(222);

        let t = gray(&top, 13, 6);
        let b = gray(&bottom, 13, 5);
        let mut dst = gray_mut(&mut out[..13 * 11], 13, 11);
        let stats = run(
            &DeinterlaceContext::with_ops(&GenericOps),
            None,
            Some((&t, &b)),
            &mut dst,
            &DeinterlaceParams::default(),
            RowRange::full(11),
        );
        assert_eq!(stats.blocks, 4);
        assert!(out[..13 * 11].iter().all(|&v| v == 40 || v == 65));
        assert!(out[sentinel..].iter().all(|&v| v == 222));
    }

    #[test]
    fn test_row_range_limits_writes() {
        let top = vec![10u8; 32 * 16];
        let bottom = vec![20u8; 32 * 16];
        let mut out = vec![0u8; 32 * 32];

        let t = gray(&top, 32, 16);
        let b = gray(&bottom, 32, 16);
        let mut dst = gray_mut(&mut out, 32, 32);
        let stats = run(
            &DeinterlaceContext::with_ops(&GenericOps),
            None,
            Some((&t, &b)),
            &mut dst,
            &DeinterlaceParams::default(),
            RowRange::new(8, 8),
        );
        assert_eq!(stats.blocks, 4);
        assert!(out[..8 * 32].iter().all(|&v| v == 0));
        assert!(out[16 * 32..].iter().all(|&v| v == 0));
        assert!(out[8 * 32..16 * 32].iter().all(|&v| v != 0));
    }

    #[test]
    fn test_precondition_errors_leave_output_untouched() {
        let field = vec![1u8; 16 * 8];
        let mut out = vec![9u8; 16 * 16];
        let ctx = DeinterlaceContext::new(&DeinterlaceParams::new().with_arch(ArchHint::Generic));
        let params = DeinterlaceParams::default();

        let cur = gray(&field, 16, 8);
        let next = gray(&field, 16, 8);
        let mut dst = gray_mut(&mut out, 16, 16);

        let err = process(None, None, &cur, &next, &mut dst, &params, RowRange::full(16)).unwrap_err();
        assert_eq!(err, DeinterlaceError::InvalidContext);

        let err = process(Some(&ctx), None, &cur, &next, &mut dst, &params, RowRange::new(4, 8)).unwrap_err();
        assert_eq!(err, DeinterlaceError::start_row_unaligned(4));

        let err = process_woven(Some(&ctx), None, &mut dst, &params, RowRange::new(12, 4)).unwrap_err();
        assert_eq!(err, DeinterlaceError::start_row_unaligned(12));

        drop(dst);
        assert!(out.iter().all(|&v| v == 9));
    }

    #[test]
    fn test_direct_window_matches_padded_copy() {
        let top: Vec<u8> = (0..32 * 16).map(|i| (i * 7 % 251) as u8).collect();
        let bottom: Vec<u8> = (0..32 * 16).map(|i| (i * 11 % 241) as u8).collect();
        let t = Plane::new(&top, 32, 16, 32).unwrap();
        let b = Plane::new(&bottom, 32, 16, 32).unwrap();
        let fields = FieldPair::new(t, b);
        let coord = BlockCoordinate::new(1, 1);

        for current in [Parity::Top, Parity::Bottom] {
            let direct = direct_window(&fields, current, 8, 4).unwrap();
            assert!(matches!(direct, BlockWindow::Direct { .. }));
            let padded = BlockWindow::Padded(PaddedBlock::gather(&fields, coord, 4, 4, 8, 8));

            for parity in [Parity::Top, Parity::Bottom] {
                let (d, ds) = direct.field(parity);
                let (p, ps) = padded.field(parity);
                for row in 0..METRIC_HT {
                    assert_eq!(&d[row * ds..row * ds + 8], &p[row * ps..row * ps + 8]);
                }
            }
            let (d, ds) = direct.filter_source(current);
            let (p, ps) = padded.filter_source(current);
            for row in 0..FILTER_SRC_ROWS {
                assert_eq!(&d[row * ds..row * ds + 10], &p[row * ps..row * ps + 10], "{current:?}");
            }
        }
    }

    #[test]
    fn test_block_without_direct_neighbourhood_is_padded() {
        // Fields one row short of the interior block's filter rows.
        let top = vec![10u8; 32 * 4];
        let bottom = vec![20u8; 32 * 4];
        let t = Plane::new(&top, 32, 4, 32).unwrap();
        let b = Plane::new(&bottom, 32, 4, 32).unwrap();
        let fields = FieldPair::new(t, b);
        assert!(direct_window(&fields, Parity::Bottom, 8, 4).is_none());
        assert!(direct_window(&fields, Parity::Top, 0, 0).is_none());
    }

    #[test]
    fn test_stationarity_ratio() {
        assert!(is_stationary(0, 0, EXPECTED_VARIANCE_LUMA));
        // Flat block: threshold is ST_THRESH / ST_K = 20.
        assert!(is_stationary(20, 0, EXPECTED_VARIANCE_LUMA));
        assert!(!is_stationary(21, 0, EXPECTED_VARIANCE_LUMA));
        // Texture raises the tolerated SAD.
        assert!(is_stationary(100, 5000, EXPECTED_VARIANCE_LUMA));
    }
}
