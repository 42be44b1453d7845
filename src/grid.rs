//! A device abstraction that treats several 8×8 panels as one display.
//!
//! [`DisplayGrid`] owns the panels in row-major order and exposes a single virtual canvas.
//! Each drawing call is clipped to the panels it touches (see [`layout::GridLayout`]) and
//! replayed on each of them with the point rebased to that panel's corner.
//!
//! # Example
//!
//! Four boards in a square, text wrapped two characters per line, then the whole
//! arrangement turned upside down:
//!
//! ```rust
//! use panel_grid::{
//!     Result,
//!     bitmap::Bitmap,
//!     font::TextLayout,
//!     grid::DisplayGrid,
//!     panel::{Detached, Panel},
//!     rotation::Rotation,
//! };
//! use embedded_graphics::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let panels = (0..4).map(|_| Panel::new(Detached, TextLayout::default()));
//! let mut grid: DisplayGrid<Detached, 4> = DisplayGrid::new(2, 2, panels, TextLayout::default())?;
//! assert_eq!(grid.size(), Size::new(16, 16));
//!
//! grid.set_line_length(2);
//! grid.print(Point::zero(), "42");
//! // '2' starts at x = 6 and spills into the second board.
//! assert!(!grid.panel(1).expect("panel 1").is_blank());
//!
//! grid.clear_buffer();
//! grid.set_rotation(Rotation::Deg180);
//! let frame = [[0xFF, 0xFF]; 16];
//! grid.draw_bitmap(Point::zero(), &Bitmap::from_rows(&frame));
//! assert!(grid.panels().iter().all(|panel| panel.rows() == &[0xFF; 8]));
//! grid.write_display()?;
//! # Ok(())
//! # }
//! # example().expect("example must succeed");
//! ```

pub mod layout;

use layout::GridLayout;

use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Size},
    primitives::Rectangle,
};

use crate::{
    Error, Result,
    bitmap::Bitmap,
    font::TextLayout,
    panel::{BlinkRate, Brightness, Panel, PanelBuffer, PanelDevice, Polarity},
    rotation::Rotation,
};

/// A `rows × cols` arrangement of panels drawn as one canvas.
///
/// `N` is the panel capacity; `rows * cols` may be anything up to it. Coordinates are virtual:
/// `(0, 0)` is the top-left of the canvas as seen after [`set_rotation`](Self::set_rotation),
/// and [`size`](Self::size) is the canvas size for the current rotation. Anything outside the
/// canvas is clipped.
#[derive(Debug)]
pub struct DisplayGrid<D, const N: usize> {
    layout: GridLayout,
    panels: heapless::Vec<Panel<D>, N>,
    rotation: Rotation,
    line_length: usize,
    text_layout: TextLayout,
}

impl<D, const N: usize> DisplayGrid<D, N> {
    /// Build a grid from panels listed row by row, left to right.
    ///
    /// Every panel takes `text_layout`, the grid's rotation ([`Rotation::Deg0`]) and line
    /// length (no wrap). Each panel keeps its own rotation offset and polarity.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyGrid`] if `rows` or `cols` is zero.
    /// - [`Error::TooManyPanels`] if `rows * cols` exceeds `N`.
    /// - [`Error::PanelCountMismatch`] if `panels` does not yield exactly `rows * cols` panels.
    pub fn new(
        rows: usize,
        cols: usize,
        panels: impl IntoIterator<Item = Panel<D>>,
        text_layout: TextLayout,
    ) -> Result<Self> {
        let layout = GridLayout::try_new(rows, cols)?;
        let expected = layout.len();
        if expected > N {
            return Err(Error::TooManyPanels { capacity: N });
        }

        let mut panels = panels.into_iter();
        let mut stored = heapless::Vec::new();
        let mut overflow = 0;
        for panel in panels.by_ref() {
            if stored.push(panel).is_err() {
                overflow = 1;
                break;
            }
        }
        let actual = stored.len() + overflow + panels.count();
        if actual != expected {
            return Err(Error::PanelCountMismatch {
                rows,
                cols,
                expected,
                actual,
            });
        }

        let mut grid = Self {
            layout,
            panels: stored,
            rotation: Rotation::Deg0,
            line_length: 0,
            text_layout,
        };
        for panel in &mut grid.panels {
            panel.set_text_layout(text_layout);
            panel.set_rotation(grid.rotation);
            panel.set_line_length(grid.line_length);
        }
        info!("display grid {}x{} ready", rows, cols);
        Ok(grid)
    }

    /// Turn the whole canvas. Every panel takes the same rotation.
    ///
    /// Buffers are not redrawn; clear and redraw to see content in the new orientation.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        debug!("grid rotation {:?}", rotation);
        self.rotation = rotation;
        for panel in &mut self.panels {
            panel.set_rotation(rotation);
        }
    }

    /// Characters per line for [`print`](Self::print); 0 disables wrapping.
    pub fn set_line_length(&mut self, line_length: usize) {
        debug!("grid line length {}", line_length);
        self.line_length = line_length;
        for panel in &mut self.panels {
            panel.set_line_length(line_length);
        }
    }

    /// Device encoding for every panel.
    pub fn set_polarity(&mut self, polarity: Polarity) {
        for panel in &mut self.panels {
            panel.set_polarity(polarity);
        }
    }

    /// Light one virtual pixel.
    pub fn set_pixel(&mut self, point: Point) {
        self.for_each_overlapped(&Rectangle::new(point, Size::new(1, 1)), |panel, local| {
            panel.set_pixel(local);
        });
    }

    /// Darken one virtual pixel.
    pub fn clear_pixel(&mut self, point: Point) {
        self.for_each_overlapped(&Rectangle::new(point, Size::new(1, 1)), |panel, local| {
            panel.clear_pixel(local);
        });
    }

    /// Whether a virtual pixel is lit. Off-canvas points read as unlit.
    #[must_use]
    pub fn pixel(&self, point: Point) -> bool {
        self.layout
            .overlapped(self.rotation, &Rectangle::new(point, Size::new(1, 1)))
            .filter_map(|(index, block_origin)| {
                Some(self.panels.get(index)?.pixel(point - block_origin))
            })
            .any(|lit| lit)
    }

    /// OR `bitmap` into the canvas with its top-left corner at `origin`.
    pub fn draw_bitmap(&mut self, origin: Point, bitmap: &Bitmap<'_>) {
        self.for_each_overlapped(&Rectangle::new(origin, bitmap.size()), |panel, local| {
            panel.draw_bitmap(local, bitmap);
        });
    }

    /// OR one glyph into the canvas. Characters outside the font are ignored.
    pub fn draw_character(&mut self, origin: Point, ch: char) {
        let area = Rectangle::new(origin, self.text_layout.font.character_size());
        self.for_each_overlapped(&area, |panel, local| panel.draw_character(local, ch));
    }

    /// Lay out `text` from `origin`, wrapping every [`line_length`](Self::line_length)
    /// characters.
    pub fn print(&mut self, origin: Point, text: &str) {
        let size = self
            .text_layout
            .message_size(text.chars().count(), self.line_length);
        self.for_each_overlapped(&Rectangle::new(origin, size), |panel, local| {
            panel.print(local, text);
        });
    }

    /// Zero every panel buffer. Devices are not touched.
    pub fn clear_buffer(&mut self) {
        for panel in &mut self.panels {
            panel.clear_buffer();
        }
    }

    /// Virtual canvas size for the current rotation.
    #[must_use]
    pub fn size(&self) -> Size {
        self.layout.canvas_size(self.rotation)
    }

    /// Panel at physical `index` (row-major).
    #[must_use]
    pub fn panel(&self, index: usize) -> Option<&Panel<D>> {
        self.panels.get(index)
    }

    /// Panel at physical `index`, mutably. Use it to set a panel's rotation offset.
    pub fn panel_mut(&mut self, index: usize) -> Option<&mut Panel<D>> {
        self.panels.get_mut(index)
    }

    /// All panels in physical order.
    #[must_use]
    pub fn panels(&self) -> &[Panel<D>] {
        &self.panels
    }

    /// Take the panels back, in physical order.
    pub fn into_panels(self) -> heapless::Vec<Panel<D>, N> {
        self.panels
    }

    /// Physical geometry.
    #[must_use]
    pub const fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Physical panel rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.layout.rows()
    }

    /// Physical panel columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.layout.cols()
    }

    /// Current grid rotation.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Characters per line, 0 when not wrapping.
    #[must_use]
    pub const fn line_length(&self) -> usize {
        self.line_length
    }

    /// Font and spacing used by text calls.
    #[must_use]
    pub const fn text_layout(&self) -> &TextLayout {
        &self.text_layout
    }

    fn for_each_overlapped(
        &mut self,
        area: &Rectangle,
        mut draw: impl FnMut(&mut PanelBuffer, Point),
    ) {
        for (index, block_origin) in self.layout.overlapped(self.rotation, area) {
            if let Some(panel) = self.panels.get_mut(index) {
                draw(panel.buffer_mut(), area.top_left - block_origin);
            }
        }
    }
}

impl<D: PanelDevice, const N: usize> DisplayGrid<D, N> {
    /// Send every buffer to its device.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first device error.
    pub fn write_display(&mut self) -> Result<()> {
        self.try_each("write", Panel::write_display)
    }

    /// Darken every device without touching the buffers.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first device error.
    pub fn blank_devices(&mut self) -> Result<()> {
        self.try_each("blank", Panel::blank_device)
    }

    /// # Errors
    ///
    /// Stops at and returns the first device error.
    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        self.try_each("brightness", |panel| panel.set_brightness(brightness))
    }

    /// # Errors
    ///
    /// Stops at and returns the first device error.
    pub fn set_blink_rate(&mut self, blink_rate: BlinkRate) -> Result<()> {
        self.try_each("blink", |panel| panel.set_blink_rate(blink_rate))
    }

    /// # Errors
    ///
    /// Stops at and returns the first device error.
    pub fn display_on(&mut self) -> Result<()> {
        self.try_each("display on", Panel::display_on)
    }

    /// # Errors
    ///
    /// Stops at and returns the first device error.
    pub fn display_off(&mut self) -> Result<()> {
        self.try_each("display off", Panel::display_off)
    }

    fn try_each(
        &mut self,
        operation: &str,
        mut apply: impl FnMut(&mut Panel<D>) -> Result<()>,
    ) -> Result<()> {
        for (index, panel) in self.panels.iter_mut().enumerate() {
            trace!("{} panel {}", operation, index);
            apply(panel).inspect_err(|error| {
                warn!("{} failed on panel {}: {:?}", operation, index, error);
            })?;
        }
        Ok(())
    }
}

impl<D, const N: usize> OriginDimensions for DisplayGrid<D, N> {
    fn size(&self) -> Size {
        self.layout.canvas_size(self.rotation)
    }
}

impl<D, const N: usize> DrawTarget for DisplayGrid<D, N> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            match color {
                BinaryColor::On => self.set_pixel(point),
                BinaryColor::Off => self.clear_pixel(point),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Detached;
    use embedded_graphics::{
        prelude::Primitive,
        primitives::PrimitiveStyle,
        Drawable,
    };

    fn panels(count: usize) -> impl Iterator<Item = Panel<Detached>> {
        (0..count).map(|_| Panel::new(Detached, TextLayout::default()))
    }

    fn grid(rows: usize, cols: usize) -> DisplayGrid<Detached, 8> {
        DisplayGrid::new(rows, cols, panels(rows * cols), TextLayout::default())
            .expect("valid grid")
    }

    #[test]
    fn construction_fails_fast() {
        let empty = DisplayGrid::<Detached, 4>::new(0, 2, panels(0), TextLayout::default());
        assert_eq!(empty.err(), Some(Error::EmptyGrid));

        let short = DisplayGrid::<Detached, 4>::new(2, 2, panels(3), TextLayout::default());
        assert_eq!(
            short.err(),
            Some(Error::PanelCountMismatch {
                rows: 2,
                cols: 2,
                expected: 4,
                actual: 3
            })
        );

        let long = DisplayGrid::<Detached, 4>::new(1, 2, panels(6), TextLayout::default());
        assert_eq!(
            long.err(),
            Some(Error::PanelCountMismatch {
                rows: 1,
                cols: 2,
                expected: 2,
                actual: 6
            })
        );

        let big = DisplayGrid::<Detached, 4>::new(1, 5, panels(5), TextLayout::default());
        assert_eq!(big.err(), Some(Error::TooManyPanels { capacity: 4 }));
    }

    #[test]
    fn settings_cascade_to_every_panel() {
        let mut grid = grid(2, 3);
        grid.set_rotation(Rotation::Deg270);
        grid.set_line_length(4);
        grid.set_polarity(Polarity::ActiveLow);
        for panel in grid.panels() {
            assert_eq!(panel.rotation(), Rotation::Deg270);
            assert_eq!(panel.line_length(), 4);
            assert_eq!(panel.polarity(), Polarity::ActiveLow);
        }
        assert_eq!(grid.size(), Size::new(16, 24));
    }

    #[test]
    fn pixel_reads_back_at_every_rotation() {
        let mut grid = grid(2, 3);
        for rotation in Rotation::ALL {
            grid.clear_buffer();
            grid.set_rotation(rotation);
            let size = grid.size();
            let corner = Point::new(size.width as i32 - 1, size.height as i32 - 1);
            grid.set_pixel(corner);
            assert!(grid.pixel(corner));
            assert!(!grid.pixel(Point::zero()));
            assert_eq!(
                grid.panels().iter().filter(|panel| !panel.is_blank()).count(),
                1
            );
            grid.clear_pixel(corner);
            assert!(grid.panels().iter().all(|panel| panel.is_blank()));
        }
    }

    #[test]
    fn off_canvas_drawing_is_clipped() {
        let mut grid = grid(1, 2);
        grid.set_pixel(Point::new(16, 0));
        grid.set_pixel(Point::new(-1, 3));
        grid.draw_character(Point::new(0, 8), 'A');
        grid.print(Point::new(-200, 0), "xyz");
        assert!(grid.panels().iter().all(|panel| panel.is_blank()));
    }

    #[test]
    fn draw_target_covers_the_virtual_canvas() {
        let mut grid = grid(1, 2);
        grid.set_rotation(Rotation::Deg90);
        Rectangle::new(Point::zero(), grid.size())
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut grid)
            .expect("infallible");
        assert!(grid.panels().iter().all(|panel| panel.rows() == &[0xFF; 8]));
    }
}
