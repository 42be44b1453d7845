//! Which physical panel shows which part of the virtual canvas.
//!
//! See [`GridLayout`] for the index formulas and a worked example.

use core::ops::Range;

use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};
use itertools::iproduct;

use crate::{Error, PANEL_SIZE, Result, rotation::Rotation};

const SIDE: i64 = PANEL_SIZE as i64;

/// Geometry of a `rows × cols` grid of 8×8 panels, stored row-major.
///
/// Physical panel `index = row * cols + col` never changes. What changes with the grid
/// [`Rotation`] is how the *virtual* canvas (the upright image the caller draws) is cut into
/// panel-sized blocks and which physical panel each block lands on:
///
/// | rotation | virtual panels | panel index of virtual block `(vr, vc)` |
/// |----------|----------------|------------------------------------------|
/// | `Deg0`   | `rows × cols`  | `vr * cols + vc`                         |
/// | `Deg90`  | `cols × rows`  | `vc * cols + (cols - 1 - vr)`            |
/// | `Deg180` | `rows × cols`  | `(rows - 1 - vr) * cols + (cols - 1 - vc)` |
/// | `Deg270` | `cols × rows`  | `(rows - 1 - vc) * cols + vr`            |
///
/// Inside each panel the pixels are then turned by the same rotation, so the whole canvas
/// rotates as one image.
///
/// # Example
///
/// ```rust
/// use panel_grid::{grid::layout::GridLayout, rotation::Rotation};
/// use embedded_graphics::prelude::Size;
///
/// const WIDE: GridLayout = GridLayout::new(1, 3);
///
/// assert_eq!(WIDE.canvas_size(Rotation::Deg0), Size::new(24, 8));
/// assert_eq!(WIDE.canvas_size(Rotation::Deg90), Size::new(8, 24));
/// // Turned clockwise, the top of the canvas is the rightmost board.
/// assert_eq!(WIDE.panel_index(Rotation::Deg90, 0, 0), Some(2));
/// assert_eq!(WIDE.panel_index(Rotation::Deg90, 2, 0), Some(0));
/// ```
///
/// ```text
/// 1×3 boards:          Deg90 canvas (8×24):
///   [0] [1] [2]          [2]
///                        [1]
///                        [0]
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridLayout {
    rows: usize,
    cols: usize,
}

impl GridLayout {
    /// Describe a `rows × cols` grid.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in a `const`) if either dimension is zero. Use
    /// [`try_new`](Self::try_new) for runtime input.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid must have at least one row and column");
        Self { rows, cols }
    }

    /// Describe a `rows × cols` grid, rejecting empty dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGrid`] if either dimension is zero.
    pub const fn try_new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyGrid);
        }
        Ok(Self { rows, cols })
    }

    /// Physical panel rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Physical panel columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of panels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always false: a layout has at least one panel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Virtual panel rows and columns as seen through `rotation`.
    #[must_use]
    pub const fn virtual_panels(&self, rotation: Rotation) -> (usize, usize) {
        if rotation.is_transposed() {
            (self.cols, self.rows)
        } else {
            (self.rows, self.cols)
        }
    }

    /// Virtual canvas size in pixels.
    #[must_use]
    pub fn canvas_size(&self, rotation: Rotation) -> Size {
        let (virtual_rows, virtual_cols) = self.virtual_panels(rotation);
        Size::new(
            pixels_u32(virtual_cols.saturating_mul(PANEL_SIZE)),
            pixels_u32(virtual_rows.saturating_mul(PANEL_SIZE)),
        )
    }

    /// Physical index of the panel showing virtual block (`virtual_row`, `virtual_col`).
    ///
    /// Blocks outside the virtual grid return `None`.
    #[must_use]
    pub const fn panel_index(
        &self,
        rotation: Rotation,
        virtual_row: usize,
        virtual_col: usize,
    ) -> Option<usize> {
        let (virtual_rows, virtual_cols) = self.virtual_panels(rotation);
        if virtual_row >= virtual_rows || virtual_col >= virtual_cols {
            return None;
        }
        let (rows, cols) = (self.rows, self.cols);
        let index = match rotation {
            Rotation::Deg0 => virtual_row * cols + virtual_col,
            Rotation::Deg90 => virtual_col * cols + (cols - 1 - virtual_row),
            Rotation::Deg180 => (rows - 1 - virtual_row) * cols + (cols - 1 - virtual_col),
            Rotation::Deg270 => (rows - 1 - virtual_col) * cols + virtual_row,
        };
        if index < self.len() { Some(index) } else { None }
    }

    /// Virtual block rows and columns a pixel rectangle touches, as half-open ranges.
    ///
    /// Uses floor division of the rectangle's first and last pixel, clamped to the virtual
    /// grid. Empty or fully off-canvas rectangles give empty ranges.
    #[must_use]
    pub fn span(&self, rotation: Rotation, area: &Rectangle) -> (Range<usize>, Range<usize>) {
        let (virtual_rows, virtual_cols) = self.virtual_panels(rotation);
        let row_span = axis_span(area.top_left.y, area.size.height, virtual_rows);
        let col_span = axis_span(area.top_left.x, area.size.width, virtual_cols);
        if row_span.is_empty() || col_span.is_empty() {
            return (0..0, 0..0);
        }
        (row_span, col_span)
    }

    /// Every panel a pixel rectangle touches, with the virtual origin of its block.
    ///
    /// Subtract the origin from a virtual point to get the panel-local point.
    ///
    /// ```rust
    /// use panel_grid::{grid::layout::GridLayout, rotation::Rotation};
    /// use embedded_graphics::{prelude::*, primitives::Rectangle};
    ///
    /// let layout = GridLayout::new(2, 2);
    /// let glyph = Rectangle::new(Point::new(6, 0), Size::new(5, 7));
    /// let hits: Vec<_> = layout.overlapped(Rotation::Deg0, &glyph).collect();
    /// assert_eq!(hits, [(0, Point::new(0, 0)), (1, Point::new(8, 0))]);
    /// ```
    pub fn overlapped(
        &self,
        rotation: Rotation,
        area: &Rectangle,
    ) -> impl Iterator<Item = (usize, Point)> + use<> {
        let layout = *self;
        let (row_span, col_span) = self.span(rotation, area);
        iproduct!(row_span, col_span).filter_map(move |(virtual_row, virtual_col)| {
            let index = layout.panel_index(rotation, virtual_row, virtual_col)?;
            Some((index, block_origin(virtual_row, virtual_col)))
        })
    }
}

/// Virtual pixel origin of block (`virtual_row`, `virtual_col`).
#[must_use]
pub fn block_origin(virtual_row: usize, virtual_col: usize) -> Point {
    Point::new(
        pixels_i32(virtual_col.saturating_mul(PANEL_SIZE)),
        pixels_i32(virtual_row.saturating_mul(PANEL_SIZE)),
    )
}

fn axis_span(start: i32, length: u32, blocks: usize) -> Range<usize> {
    if length == 0 {
        return 0..0;
    }
    let first = i64::from(start);
    let last = first + i64::from(length) - 1;
    let limit = i64::try_from(blocks).unwrap_or(i64::MAX);
    let low = first.max(0).div_euclid(SIDE);
    let high = last.div_euclid(SIDE).min(limit - 1);
    if last < 0 || low > high {
        return 0..0;
    }
    let (Ok(low), Ok(high)) = (usize::try_from(low), usize::try_from(high)) else {
        return 0..0;
    };
    low..high + 1
}

fn pixels_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn pixels_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
