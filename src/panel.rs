//! One 8×8 panel: its bit buffer, its rotation state, and the device it is written to.
//!
//! [`PanelBuffer`] is pure memory and never fails. [`Panel`] pairs a buffer with a
//! [`PanelDevice`] and is where bus errors can surface. Drawing calls reach the buffer through
//! `Deref`, so a `Panel` can be drawn on directly.
//!
//! ```rust
//! use panel_grid::{
//!     font::TextLayout,
//!     panel::{Detached, Panel},
//!     rotation::Rotation,
//! };
//! use embedded_graphics::prelude::Point;
//!
//! let mut panel = Panel::new(Detached, TextLayout::default());
//! panel.set_rotation(Rotation::Deg180);
//! panel.set_pixel(Point::new(0, 0));
//! // Row 7, column 7 in device memory.
//! assert_eq!(panel.rows()[7], 0b1000_0000);
//! ```

use core::convert::Infallible;
use core::ops::{Deref, DerefMut};

use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Size},
};
use itertools::iproduct;

use crate::{PANEL_SIZE, Result, bitmap::Bitmap, font::TextLayout, rotation::Rotation};

const SIDE: i32 = PANEL_SIZE as i32;

/// How buffer bits are encoded on the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// A set bit lights the LED.
    #[default]
    ActiveHigh,
    /// A set bit darkens the LED; everything else is lit.
    ActiveLow,
}

/// The 8×8 bit matrix of one panel plus the state that shapes how drawing lands in it.
///
/// Row `r` is `rows()[r]` and bit `c` of that byte is column `c`. Every drawing call takes
/// coordinates in the panel's own upright 0..8 space; they pass through the effective rotation
/// `(rotation + rotation_offset) mod 4` on their way into the matrix. Out-of-window
/// coordinates are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelBuffer {
    rows: [u8; PANEL_SIZE],
    rotation: Rotation,
    rotation_offset: Rotation,
    polarity: Polarity,
    line_length: usize,
    text_layout: TextLayout,
}

impl PanelBuffer {
    /// A blank, unrotated buffer that prints with `text_layout` and does not wrap.
    #[must_use]
    pub const fn new(text_layout: TextLayout) -> Self {
        Self {
            rows: [0; PANEL_SIZE],
            rotation: Rotation::Deg0,
            rotation_offset: Rotation::Deg0,
            polarity: Polarity::ActiveHigh,
            line_length: 0,
            text_layout,
        }
    }

    /// Light the pixel at `point`.
    pub fn set_pixel(&mut self, point: Point) {
        if let Some((row, mask)) = self.locate(point) {
            self.rows[row] |= mask;
        }
    }

    /// Darken the pixel at `point`.
    pub fn clear_pixel(&mut self, point: Point) {
        if let Some((row, mask)) = self.locate(point) {
            self.rows[row] &= !mask;
        }
    }

    /// Whether the pixel at `point` is lit. Out-of-window points read as unlit.
    #[must_use]
    pub fn pixel(&self, point: Point) -> bool {
        self.locate(point)
            .is_some_and(|(row, mask)| self.rows[row] & mask != 0)
    }

    /// OR the lit bits of `bitmap` into the buffer with its top-left corner at `origin`.
    ///
    /// `origin` may be negative or past the window; only the overlapping part is drawn.
    pub fn draw_bitmap(&mut self, origin: Point, bitmap: &Bitmap<'_>) {
        self.draw_clipped(origin, bitmap.size(), |column, row| {
            bitmap.is_set(column as usize, row as usize)
        });
    }

    /// OR the glyph for `ch` into the buffer with its top-left corner at `origin`.
    ///
    /// Characters the font has no glyph for leave the buffer unchanged.
    pub fn draw_character(&mut self, origin: Point, ch: char) {
        let Some(glyph) = self.text_layout.font.glyph(ch) else {
            return;
        };
        self.draw_clipped(origin, glyph.size(), |column, row| glyph.is_set(column, row));
    }

    /// Lay out `text` starting at `origin`, wrapping every `line_length` characters.
    ///
    /// Only characters whose cells overlap the window are drawn.
    pub fn print(&mut self, origin: Point, text: &str) {
        let char_count = text.chars().count();
        let columns = self
            .text_layout
            .message_cells(char_count, self.line_length)
            .width;
        if columns == 0 {
            return;
        }
        let advance = self.text_layout.advance();
        let character_size = self.text_layout.font.character_size();
        for (index, ch) in text.chars().enumerate() {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let cell = Point::new(
                saturate_i32(index % columns).saturating_mul(saturate_i32(advance.width)),
                saturate_i32(index / columns).saturating_mul(saturate_i32(advance.height)),
            );
            let cell_origin = Point::new(
                origin.x.saturating_add(cell.x),
                origin.y.saturating_add(cell.y),
            );
            if overlaps_window(cell_origin, character_size) {
                self.draw_character(cell_origin, ch);
            }
        }
    }

    /// Zero the bit matrix. The device is not touched.
    pub fn clear_buffer(&mut self) {
        self.rows = [0; PANEL_SIZE];
    }

    /// Set the base rotation. The offset is kept.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Set the mounting calibration composed with every rotation.
    pub fn set_rotation_offset(&mut self, rotation_offset: Rotation) {
        self.rotation_offset = rotation_offset;
    }

    /// Base rotation last set.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Mounting calibration.
    #[must_use]
    pub const fn rotation_offset(&self) -> Rotation {
        self.rotation_offset
    }

    /// Rotation actually applied to pixels.
    #[must_use]
    pub const fn effective_rotation(&self) -> Rotation {
        self.rotation.compose(self.rotation_offset)
    }

    /// Choose how bits are encoded on the device.
    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.polarity = polarity;
    }

    /// Current device encoding.
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Characters per line for [`print`](Self::print); 0 disables wrapping.
    pub fn set_line_length(&mut self, line_length: usize) {
        self.line_length = line_length;
    }

    /// Characters per line, 0 when not wrapping.
    #[must_use]
    pub const fn line_length(&self) -> usize {
        self.line_length
    }

    /// Replace the font and spacing used by text calls.
    pub fn set_text_layout(&mut self, text_layout: TextLayout) {
        self.text_layout = text_layout;
    }

    /// Font and spacing used by text calls.
    #[must_use]
    pub const fn text_layout(&self) -> &TextLayout {
        &self.text_layout
    }

    /// Raw buffer, one byte per row, bit `c` is column `c`.
    #[must_use]
    pub const fn rows(&self) -> &[u8; PANEL_SIZE] {
        &self.rows
    }

    /// Rows as they must be sent to the device under the current polarity.
    #[must_use]
    pub fn device_rows(&self) -> [u8; PANEL_SIZE] {
        match self.polarity {
            Polarity::ActiveHigh => self.rows,
            Polarity::ActiveLow => self.rows.map(|row| !row),
        }
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }

    fn locate(&self, point: Point) -> Option<(usize, u8)> {
        if !(0..SIDE).contains(&point.x) || !(0..SIDE).contains(&point.y) {
            return None;
        }
        let target = self.effective_rotation().transform(point, SIDE);
        let row = usize::try_from(target.y).ok()?;
        let column = u32::try_from(target.x).ok()?;
        Some((row, 1u8.checked_shl(column)?))
    }

    // Visit the part of a `size` image at `origin` that lies in the window; `lit(column, row)`
    // is asked in image coordinates.
    fn draw_clipped(&mut self, origin: Point, size: Size, lit: impl Fn(u32, u32) -> bool) {
        let x_range = origin.x.max(0)..origin.x.saturating_add(saturate_i32(size.width)).min(SIDE);
        let y_range =
            origin.y.max(0)..origin.y.saturating_add(saturate_i32(size.height)).min(SIDE);
        for (y, x) in iproduct!(y_range, x_range) {
            // Both differences are non-negative inside the clipped ranges.
            let column = x.abs_diff(origin.x);
            let row = y.abs_diff(origin.y);
            if lit(column, row) {
                self.set_pixel(Point::new(x, y));
            }
        }
    }
}

impl Default for PanelBuffer {
    fn default() -> Self {
        Self::new(TextLayout::default())
    }
}

impl OriginDimensions for PanelBuffer {
    fn size(&self) -> Size {
        Size::new_equal(PANEL_SIZE as u32)
    }
}

impl DrawTarget for PanelBuffer {
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

/// Display brightness, 0 (dimmest) through 15.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(u8);

impl Brightness {
    /// Brightest level, also used in place of out-of-range requests.
    pub const MAX: Self = Self(15);

    /// Accepts 0..=15; anything else becomes [`Brightness::MAX`].
    #[must_use]
    pub const fn new(level: u8) -> Self {
        if level <= Self::MAX.0 {
            Self(level)
        } else {
            Self::MAX
        }
    }

    /// Numeric level, 0..=15.
    #[must_use]
    pub const fn level(self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

/// Hardware blink rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkRate {
    /// Steady.
    #[default]
    Off,
    /// 2 Hz.
    Hz2,
    /// 1 Hz.
    Hz1,
    /// 0.5 Hz.
    HalfHz,
}

impl BlinkRate {
    /// Accepts 0..=3 in the order Off, 2 Hz, 1 Hz, 0.5 Hz; anything else is [`BlinkRate::Off`].
    #[must_use]
    pub const fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Hz2,
            2 => Self::Hz1,
            3 => Self::HalfHz,
            _ => Self::Off,
        }
    }

    /// Position in the order Off, 2 Hz, 1 Hz, 0.5 Hz.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Hz2 => 1,
            Self::Hz1 => 2,
            Self::HalfHz => 3,
        }
    }
}

/// A physical sink for one panel's rows and display settings.
///
/// Implement this for any 8×8 single-bit controller. [`Ht16k33`](crate::ht16k33::Ht16k33)
/// is the built-in implementation; [`Detached`] discards everything.
pub trait PanelDevice {
    /// Push eight row bytes, already encoded for polarity. Bit `c` is column `c`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn write_rows(&mut self, rows: &[u8; PANEL_SIZE]) -> Result<()>;

    /// Set every device bit to `lit` without touching any buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn fill(&mut self, lit: bool) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn set_brightness(&mut self, brightness: Brightness) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn set_blink_rate(&mut self, blink_rate: BlinkRate) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn set_display_on(&mut self, on: bool) -> Result<()>;
}

impl<T: PanelDevice + ?Sized> PanelDevice for &mut T {
    fn write_rows(&mut self, rows: &[u8; PANEL_SIZE]) -> Result<()> {
        (**self).write_rows(rows)
    }

    fn fill(&mut self, lit: bool) -> Result<()> {
        (**self).fill(lit)
    }

    fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        (**self).set_brightness(brightness)
    }

    fn set_blink_rate(&mut self, blink_rate: BlinkRate) -> Result<()> {
        (**self).set_blink_rate(blink_rate)
    }

    fn set_display_on(&mut self, on: bool) -> Result<()> {
        (**self).set_display_on(on)
    }
}

/// A device that accepts and discards everything. Useful for off-hardware rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Detached;

impl PanelDevice for Detached {
    fn write_rows(&mut self, _rows: &[u8; PANEL_SIZE]) -> Result<()> {
        Ok(())
    }

    fn fill(&mut self, _lit: bool) -> Result<()> {
        Ok(())
    }

    fn set_brightness(&mut self, _brightness: Brightness) -> Result<()> {
        Ok(())
    }

    fn set_blink_rate(&mut self, _blink_rate: BlinkRate) -> Result<()> {
        Ok(())
    }

    fn set_display_on(&mut self, _on: bool) -> Result<()> {
        Ok(())
    }
}

/// A [`PanelBuffer`] and the device it is shown on.
#[derive(Debug)]
pub struct Panel<D> {
    buffer: PanelBuffer,
    device: D,
}

impl<D: PanelDevice> Panel<D> {
    /// Pair `device` with a blank buffer.
    pub const fn new(device: D, text_layout: TextLayout) -> Self {
        Self {
            buffer: PanelBuffer::new(text_layout),
            device,
        }
    }

    /// Send the buffer to the device.
    ///
    /// # Errors
    ///
    /// Returns the device's error if the transfer fails.
    pub fn write_display(&mut self) -> Result<()> {
        self.device.write_rows(&self.buffer.device_rows())
    }

    /// Darken the device without touching the buffer.
    ///
    /// Under [`Polarity::ActiveLow`] that means filling the device with ones.
    ///
    /// # Errors
    ///
    /// Returns the device's error if the transfer fails.
    pub fn blank_device(&mut self) -> Result<()> {
        self.device.fill(self.buffer.polarity() == Polarity::ActiveLow)
    }

    /// # Errors
    ///
    /// Returns the device's error if the transfer fails.
    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        self.device.set_brightness(brightness)
    }

    /// # Errors
    ///
    /// Returns the device's error if the transfer fails.
    pub fn set_blink_rate(&mut self, blink_rate: BlinkRate) -> Result<()> {
        self.device.set_blink_rate(blink_rate)
    }

    /// # Errors
    ///
    /// Returns the device's error if the transfer fails.
    pub fn display_on(&mut self) -> Result<()> {
        self.device.set_display_on(true)
    }

    /// # Errors
    ///
    /// Returns the device's error if the transfer fails.
    pub fn display_off(&mut self) -> Result<()> {
        self.device.set_display_on(false)
    }
}

impl<D> Panel<D> {
    /// The pixel buffer.
    pub const fn buffer(&self) -> &PanelBuffer {
        &self.buffer
    }

    /// The pixel buffer, mutably.
    pub const fn buffer_mut(&mut self) -> &mut PanelBuffer {
        &mut self.buffer
    }

    /// The device.
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// The device, mutably.
    pub const fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Give back the device.
    pub fn into_device(self) -> D {
        self.device
    }
}

impl<D> Deref for Panel<D> {
    type Target = PanelBuffer;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl<D> DerefMut for Panel<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

fn overlaps_window(origin: Point, size: Size) -> bool {
    let right = origin.x.saturating_add(saturate_i32(size.width));
    let bottom = origin.y.saturating_add(saturate_i32(size.height));
    origin.x < SIDE && origin.y < SIDE && right > 0 && bottom > 0
}

fn saturate_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        prelude::Primitive,
        primitives::{Line, PrimitiveStyle},
        Drawable,
    };

    fn buffer() -> PanelBuffer {
        PanelBuffer::default()
    }

    #[test]
    fn rotation_two_maps_origin_to_far_corner() {
        let mut buffer = buffer();
        buffer.set_rotation(Rotation::Deg180);
        buffer.set_pixel(Point::new(0, 0));
        assert_eq!(buffer.rows(), &[0, 0, 0, 0, 0, 0, 0, 0x80]);
        assert!(buffer.pixel(Point::new(0, 0)));
    }

    #[test]
    fn out_of_window_pixels_are_ignored() {
        let mut buffer = buffer();
        for point in [
            Point::new(-1, 0),
            Point::new(0, -1),
            Point::new(8, 0),
            Point::new(0, 8),
            Point::new(i32::MIN, i32::MAX),
        ] {
            buffer.set_pixel(point);
            assert!(!buffer.pixel(point));
        }
        assert!(buffer.is_blank());
    }

    #[test]
    fn bitmaps_are_ored_and_clipped() {
        let checker = [[0xAA]; 8];
        let bitmap = Bitmap::from_rows(&checker);
        let mut once = buffer();
        once.draw_bitmap(Point::new(-2, 3), &bitmap);
        let mut twice = once.clone();
        twice.draw_bitmap(Point::new(-2, 3), &bitmap);
        assert_eq!(once, twice);
        // Rows 0..3 are above the bitmap. Bitmap columns 2, 4, 6 land on columns 0, 2, 4.
        assert_eq!(once.rows(), &[0, 0, 0, 0x15, 0x15, 0x15, 0x15, 0x15]);
    }

    #[test]
    fn bitmap_beyond_window_draws_nothing() {
        let full = [[0xFF; 2]; 16];
        let bitmap = Bitmap::from_rows(&full);
        let mut buffer = buffer();
        buffer.draw_bitmap(Point::new(8, 0), &bitmap);
        buffer.draw_bitmap(Point::new(0, -16), &bitmap);
        assert!(buffer.is_blank());
        buffer.draw_bitmap(Point::new(-8, -8), &bitmap);
        assert_eq!(buffer.rows(), &[0xFF; 8]);
    }

    #[test]
    fn clear_restores_blank_after_any_draw() {
        let mut buffer = buffer();
        buffer.set_rotation(Rotation::Deg90);
        buffer.print(Point::new(1, 0), "Hi");
        buffer.draw_character(Point::new(-3, 2), '#');
        assert!(!buffer.is_blank());
        buffer.clear_buffer();
        assert!(buffer.is_blank());
    }

    #[test]
    fn characters_outside_the_font_are_ignored() {
        let mut buffer = buffer();
        buffer.set_pixel(Point::new(4, 4));
        let before = buffer.clone();
        for ch in ['\n', '\u{7f}', 'é', '\u{1F43C}'] {
            buffer.draw_character(Point::zero(), ch);
        }
        assert_eq!(buffer, before);
    }

    #[test]
    fn glyph_columns_land_lsb_top() {
        let mut buffer = buffer();
        buffer.draw_character(Point::zero(), '4');
        // '4' columns are 0x18 0x14 0x12 0x7F 0x10; column 3 fills rows 0..7.
        for row in 0..7 {
            assert!(buffer.pixel(Point::new(3, row)));
        }
        assert!(!buffer.pixel(Point::new(3, 7)));
        assert!(buffer.pixel(Point::new(0, 3)));
        assert!(buffer.pixel(Point::new(0, 4)));
        assert!(!buffer.pixel(Point::new(0, 0)));
    }

    #[test]
    fn print_wraps_at_line_length() {
        let mut wrapped = buffer();
        wrapped.set_line_length(1);
        wrapped.print(Point::new(0, -8), "-4");
        // Only the second line's '4' intersects the window, drawn at (0, 0).
        let mut expected = buffer();
        expected.draw_character(Point::zero(), '4');
        assert_eq!(wrapped.rows(), expected.rows());
        assert_eq!(wrapped.line_length(), 1);
    }

    #[test]
    fn print_without_wrap_is_one_line() {
        let mut unwrapped = buffer();
        unwrapped.print(Point::new(-6, 0), "-4");
        let mut expected = buffer();
        expected.draw_character(Point::zero(), '4');
        assert_eq!(unwrapped, expected);
    }

    #[test]
    fn offset_composes_with_rotation_without_drift() {
        let mut buffer = buffer();
        buffer.set_rotation_offset(Rotation::Deg90);
        assert_eq!(buffer.effective_rotation(), Rotation::Deg90);
        buffer.set_rotation(Rotation::Deg90);
        buffer.set_rotation(Rotation::Deg90);
        assert_eq!(buffer.effective_rotation(), Rotation::Deg180);
        buffer.set_rotation(Rotation::from_quarter_turns(9));
        assert_eq!(buffer.effective_rotation(), Rotation::Deg90);
    }

    #[test]
    fn active_low_inverts_device_rows_only() {
        let mut buffer = buffer();
        buffer.set_pixel(Point::new(0, 0));
        buffer.set_polarity(Polarity::ActiveLow);
        assert_eq!(buffer.rows()[0], 0x01);
        assert_eq!(buffer.device_rows()[0], 0xFE);
        assert_eq!(buffer.device_rows()[1], 0xFF);
    }

    #[test]
    fn draw_target_sets_and_clears() {
        let mut buffer = buffer();
        Line::new(Point::new(0, 0), Point::new(7, 0))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut buffer)
            .expect("infallible");
        assert_eq!(buffer.rows()[0], 0xFF);
        Pixel(Point::new(2, 0), BinaryColor::Off)
            .draw(&mut buffer)
            .expect("infallible");
        assert_eq!(buffer.rows()[0], 0xFB);
    }

    #[test]
    fn settings_clamp_out_of_range_values() {
        assert_eq!(Brightness::new(16), Brightness::MAX);
        assert_eq!(Brightness::new(3).level(), 3);
        assert_eq!(BlinkRate::from_index(4), BlinkRate::Off);
        assert_eq!(BlinkRate::from_index(-1), BlinkRate::Off);
        assert_eq!(BlinkRate::from_index(3), BlinkRate::HalfHz);
    }

    #[test]
    fn blank_device_uses_unlit_level() {
        #[derive(Default)]
        struct Filled(Option<bool>);
        impl PanelDevice for Filled {
            fn write_rows(&mut self, _rows: &[u8; PANEL_SIZE]) -> Result<()> {
                Ok(())
            }
            fn fill(&mut self, lit: bool) -> Result<()> {
                self.0 = Some(lit);
                Ok(())
            }
            fn set_brightness(&mut self, _brightness: Brightness) -> Result<()> {
                Ok(())
            }
            fn set_blink_rate(&mut self, _blink_rate: BlinkRate) -> Result<()> {
                Ok(())
            }
            fn set_display_on(&mut self, _on: bool) -> Result<()> {
                Ok(())
            }
        }

        let mut panel = Panel::new(Filled::default(), TextLayout::default());
        panel.set_pixel(Point::new(1, 1));
        panel.blank_device().expect("recording device");
        assert_eq!(panel.device().0, Some(false));
        panel.set_polarity(Polarity::ActiveLow);
        panel.blank_device().expect("recording device");
        assert_eq!(panel.device().0, Some(true));
        assert!(!panel.is_blank());
    }
}
