//! Borrowed plane and picture views over caller-owned sample buffers.
//!
//! Every view describes a rectangular 8-bit sample grid (`width`, `height`,
//! `stride`) and may cover only a horizontal band of it: `first_row` and
//! `rows` say which plane rows the borrowed slice actually holds. Row
//! accessors take absolute plane rows and return `None` outside the band,
//! which is how concurrent callers are kept inside their own rows.

use crate::error::LayoutError;
use crate::params::RowRange;

/// Maximum number of planes in a picture.
pub const MAX_PLANES: usize = 3;

/// Sample layout of a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorFormat {
    /// Planar 4:2:0, luma plus two half-size chroma planes.
    #[default]
    Yuv420p,
    /// Luma only.
    Gray8,
}

impl ColorFormat {
    /// Number of planes carried by this format.
    pub fn num_planes(&self) -> usize {
        match self {
            ColorFormat::Yuv420p => 3,
            ColorFormat::Gray8 => 1,
        }
    }
}

/// Field parity of a frame row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// Even frame rows (0, 2, 4, ...).
    Top,
    /// Odd frame rows (1, 3, 5, ...).
    Bottom,
}

impl Parity {
    /// Row offset of this parity inside a frame (0 or 1).
    pub fn index(self) -> usize {
        match self {
            Parity::Top => 0,
            Parity::Bottom => 1,
        }
    }

    /// Get the opposite parity.
    pub fn opposite(self) -> Self {
        match self {
            Parity::Top => Parity::Bottom,
            Parity::Bottom => Parity::Top,
        }
    }
}

fn required_len(width: usize, rows: usize, stride: usize) -> usize {
    if rows == 0 {
        0
    } else {
        (rows - 1) * stride + width
    }
}

fn check_layout(len: usize, width: usize, rows: usize, stride: usize) -> Result<(), LayoutError> {
    if rows > 0 && stride < width {
        return Err(LayoutError::StrideTooSmall { stride, width });
    }
    let needed = required_len(width, rows, stride);
    if len < needed {
        return Err(LayoutError::buffer_too_small(needed, len));
    }
    Ok(())
}

/// Read-only view of one sample plane.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
    first_row: usize,
    rows: usize,
}

impl<'a> Plane<'a> {
    /// Create a view over a whole plane.
    ///
    /// `data` must hold at least `(height - 1) * stride + width` bytes.
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> Result<Self, LayoutError> {
        check_layout(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
            first_row: 0,
            rows: height,
        })
    }

    /// Plane width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Full plane height in rows (including rows outside this view).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance in bytes between consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// First plane row held by this view.
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// Number of rows held by this view.
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn local_row(&self, y: usize) -> Option<usize> {
        let k = y.checked_sub(self.first_row)?;
        (k < self.rows).then_some(k)
    }

    /// The `width` samples of plane row `y`.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        let start = self.local_row(y)? * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Slice starting at sample `(x, y)` and running to the end of the view,
    /// for primitives that walk rows with [`stride`](Self::stride).
    pub fn window(&self, x: usize, y: usize) -> Option<&'a [u8]> {
        if x >= self.width {
            return None;
        }
        let start = self.local_row(y)? * self.stride + x;
        self.data.get(start..)
    }

    /// Whether this view holds the `w x h` rectangle at `(x, y)`.
    pub fn contains(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        h > 0
            && x + w <= self.width
            && self.local_row(y).is_some()
            && self.local_row(y + h - 1).is_some()
    }

    /// View of the rows of one field parity, at half height and double stride.
    pub fn field(&self, parity: Parity) -> Plane<'a> {
        let p = parity.index();
        let end = self.first_row + self.rows;
        let first = if self.first_row % 2 == p {
            self.first_row
        } else {
            self.first_row + 1
        };
        let rows = if first < end { (end - first + 1) / 2 } else { 0 };
        let data = if rows > 0 {
            &self.data[(first - self.first_row) * self.stride..]
        } else {
            &[][..]
        };
        Plane {
            data,
            width: self.width,
            height: (self.height + 1).saturating_sub(p) / 2,
            stride: self.stride * 2,
            first_row: first / 2,
            rows,
        }
    }

    /// Split this view into its top and bottom fields.
    pub fn fields(&self) -> FieldPair<'a> {
        FieldPair {
            top: self.field(Parity::Top),
            bottom: self.field(Parity::Bottom),
        }
    }
}

/// Mutable view of one sample plane (or a band of its rows).
#[derive(Debug)]
pub struct PlaneMut<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    stride: usize,
    first_row: usize,
    rows: usize,
}

impl<'a> PlaneMut<'a> {
    /// Create a mutable view over a whole plane.
    pub fn new(data: &'a mut [u8], width: usize, height: usize, stride: usize) -> Result<Self, LayoutError> {
        check_layout(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
            first_row: 0,
            rows: height,
        })
    }

    /// Plane width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Full plane height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance in bytes between consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// First plane row held by this view.
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// Number of rows held by this view.
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn local_row(&self, y: usize) -> Option<usize> {
        let k = y.checked_sub(self.first_row)?;
        (k < self.rows).then_some(k)
    }

    /// The `width` samples of plane row `y`.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        let start = self.local_row(y)? * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Mutable access to the `width` samples of plane row `y`.
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [u8]> {
        let start = self.local_row(y)? * self.stride;
        self.data.get_mut(start..start + self.width)
    }

    /// Reborrow as a read-only view.
    pub fn as_plane(&self) -> Plane<'_> {
        Plane {
            data: &*self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
            first_row: self.first_row,
            rows: self.rows,
        }
    }

    /// Split into the rows before `y` and the rows from `y` on.
    ///
    /// `y` is clamped into the rows held by this view.
    pub fn split_at_row(self, y: usize) -> (PlaneMut<'a>, PlaneMut<'a>) {
        let k = y.clamp(self.first_row, self.first_row + self.rows) - self.first_row;
        let at = if k == self.rows {
            self.data.len()
        } else {
            k * self.stride
        };
        let (head, tail) = self.data.split_at_mut(at);
        (
            PlaneMut {
                data: head,
                width: self.width,
                height: self.height,
                stride: self.stride,
                first_row: self.first_row,
                rows: k,
            },
            PlaneMut {
                data: tail,
                width: self.width,
                height: self.height,
                stride: self.stride,
                first_row: self.first_row + k,
                rows: self.rows - k,
            },
        )
    }
}

/// The two fields of a frame, read as interleaved frame rows.
#[derive(Debug, Clone, Copy)]
pub struct FieldPair<'a> {
    /// Field supplying the even frame rows.
    pub top: Plane<'a>,
    /// Field supplying the odd frame rows.
    pub bottom: Plane<'a>,
}

impl<'a> FieldPair<'a> {
    /// Pair two fields.
    pub fn new(top: Plane<'a>, bottom: Plane<'a>) -> Self {
        Self { top, bottom }
    }

    /// The field of a given parity.
    pub fn get(&self, parity: Parity) -> &Plane<'a> {
        match parity {
            Parity::Top => &self.top,
            Parity::Bottom => &self.bottom,
        }
    }

    /// Frame row `y`, taken from the field of its parity.
    pub fn frame_row(&self, y: usize) -> Option<&'a [u8]> {
        if y % 2 == 0 {
            self.top.row(y / 2)
        } else {
            self.bottom.row(y / 2)
        }
    }

    /// Width both fields can supply.
    pub fn width(&self) -> usize {
        self.top.width().min(self.bottom.width())
    }

    /// Number of frame rows both fields can supply together.
    pub fn frame_height(&self) -> usize {
        (2 * self.top.height()).min(2 * self.bottom.height() + 1)
    }
}

/// Read-only picture: up to three planes plus a color format.
///
/// A missing plane signals "not available" (for instance the previous field
/// before any temporal reference exists).
#[derive(Debug, Clone, Copy)]
pub struct Picture<'a> {
    format: ColorFormat,
    planes: [Option<Plane<'a>>; MAX_PLANES],
}

impl<'a> Picture<'a> {
    /// Create a picture from explicit planes.
    pub fn new(format: ColorFormat, planes: [Option<Plane<'a>>; MAX_PLANES]) -> Self {
        Self { format, planes }
    }

    /// Planar 4:2:0 picture.
    pub fn yuv420p(y: Plane<'a>, u: Plane<'a>, v: Plane<'a>) -> Self {
        Self::new(ColorFormat::Yuv420p, [Some(y), Some(u), Some(v)])
    }

    /// Luma-only picture.
    pub fn gray(y: Plane<'a>) -> Self {
        Self::new(ColorFormat::Gray8, [Some(y), None, None])
    }

    /// Color format tag.
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Plane `index`, if the format carries it and it is available.
    pub fn plane(&self, index: usize) -> Option<Plane<'a>> {
        if index < self.format.num_planes() {
            self.planes[index]
        } else {
            None
        }
    }

    /// Picture made of one field of every plane.
    pub fn field(&self, parity: Parity) -> Picture<'a> {
        Picture {
            format: self.format,
            planes: self.planes.map(|p| p.map(|p| p.field(parity))),
        }
    }
}

/// Mutable picture, usually the progressive output frame.
#[derive(Debug)]
pub struct PictureMut<'a> {
    format: ColorFormat,
    planes: [Option<PlaneMut<'a>>; MAX_PLANES],
}

impl<'a> PictureMut<'a> {
    /// Create a picture from explicit planes.
    pub fn new(format: ColorFormat, planes: [Option<PlaneMut<'a>>; MAX_PLANES]) -> Self {
        Self { format, planes }
    }

    /// Planar 4:2:0 picture.
    pub fn yuv420p(y: PlaneMut<'a>, u: PlaneMut<'a>, v: PlaneMut<'a>) -> Self {
        Self::new(ColorFormat::Yuv420p, [Some(y), Some(u), Some(v)])
    }

    /// Luma-only picture.
    pub fn gray(y: PlaneMut<'a>) -> Self {
        Self::new(ColorFormat::Gray8, [Some(y), None, None])
    }

    /// Color format tag.
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Read-only view of plane `index`.
    pub fn plane(&self, index: usize) -> Option<Plane<'_>> {
        if index < self.format.num_planes() {
            self.planes[index].as_ref().map(PlaneMut::as_plane)
        } else {
            None
        }
    }

    /// Mutable view of plane `index`.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut PlaneMut<'a>> {
        if index < self.format.num_planes() {
            self.planes[index].as_mut()
        } else {
            None
        }
    }

    /// Reborrow as a read-only picture.
    pub fn as_picture(&self) -> Picture<'_> {
        Picture {
            format: self.format,
            planes: [self.plane(0), self.plane(1), self.plane(2)],
        }
    }

    /// Split the picture into disjoint horizontal bands of `band_rows` luma
    /// rows (rounded up to a multiple of 8), each paired with the row range
    /// to pass to [`process`](crate::process) for that band.
    ///
    /// Every plane is cut with the same row mapping the block loop uses, so
    /// each band holds exactly the rows its call writes.
    pub fn split_bands(self, band_rows: u32) -> Vec<(RowRange, PictureMut<'a>)> {
        let band_rows = band_rows.max(1).div_ceil(8) * 8;
        let luma_height = self.planes[0].as_ref().map_or(0, |p| p.height()) as u32;
        let format = self.format;

        let mut rest = self.planes;
        let mut bands = Vec::new();
        let mut start = 0u32;
        while start < luma_height {
            let range = RowRange::new(start, band_rows).clip(luma_height);
            let mut planes: [Option<PlaneMut<'a>>; MAX_PLANES] = [None, None, None];
            for (index, slot) in rest.iter_mut().enumerate() {
                if let Some(plane) = slot.take() {
                    let end = range.plane_rows(index, plane.height()).end;
                    let (head, tail) = plane.split_at_row(end);
                    planes[index] = Some(head);
                    *slot = Some(tail);
                }
            }
            bands.push((range, PictureMut { format, planes }));
            start += band_rows;
        }
        bands
    }
}
