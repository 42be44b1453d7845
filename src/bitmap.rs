//! Immutable one-bit-per-pixel images.

use embedded_graphics::prelude::Size;

use crate::{Error, Result};

/// A borrowed, row-major, MSB-first monochrome image.
///
/// Each row is `byte_columns` bytes; bit 7 of the first byte is the leftmost pixel. Width is
/// always a multiple of eight.
///
/// ```rust
/// use panel_grid::bitmap::Bitmap;
///
/// // An 8×2 arrow head.
/// let bitmap = Bitmap::from_rows(&[[0b0001_1000], [0b0011_1100]]);
/// assert_eq!((bitmap.width(), bitmap.height()), (8, 2));
/// assert!(bitmap.is_set(3, 0));
/// assert!(!bitmap.is_set(0, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitmap<'a> {
    data: &'a [u8],
    byte_columns: usize,
}

impl<'a> Bitmap<'a> {
    /// Wrap `data` as rows of `byte_columns` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BitmapShape`] if `byte_columns` is zero or `data` is not a whole number
    /// of rows.
    pub fn new(data: &'a [u8], byte_columns: usize) -> Result<Self> {
        if byte_columns == 0 || data.len() % byte_columns != 0 {
            return Err(Error::BitmapShape {
                len: data.len(),
                byte_columns,
            });
        }
        Ok(Self { data, byte_columns })
    }

    /// Wrap a slice of fixed-width rows. The shape is correct by construction.
    ///
    /// A zero-width row type yields an empty bitmap.
    #[must_use]
    pub fn from_rows<const B: usize>(rows: &'a [[u8; B]]) -> Self {
        Self {
            data: rows.as_flattened(),
            byte_columns: B,
        }
    }

    /// Bytes per row.
    #[must_use]
    pub const fn byte_columns(&self) -> usize {
        self.byte_columns
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.byte_columns * 8
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        if self.byte_columns == 0 {
            0
        } else {
            self.data.len() / self.byte_columns
        }
    }

    /// Size in pixels, saturating at `u32::MAX`.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(
            u32::try_from(self.width()).unwrap_or(u32::MAX),
            u32::try_from(self.height()).unwrap_or(u32::MAX),
        )
    }

    /// Whether the pixel at (`column`, `row`) is lit. Outside the image is unlit.
    #[must_use]
    pub fn is_set(&self, column: usize, row: usize) -> bool {
        if column >= self.width() {
            return false;
        }
        let Some(index) = row
            .checked_mul(self.byte_columns)
            .and_then(|start| start.checked_add(column / 8))
        else {
            return false;
        };
        self.data
            .get(index)
            .is_some_and(|byte| byte & (0x80 >> (column % 8)) != 0)
    }

    /// Raw row-major bytes.
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_data() {
        assert_eq!(
            Bitmap::new(&[0; 5], 2),
            Err(Error::BitmapShape {
                len: 5,
                byte_columns: 2
            })
        );
        assert!(Bitmap::new(&[0; 4], 0).is_err());
        assert!(Bitmap::new(&[], 3).is_ok());
    }

    #[test]
    fn bits_are_msb_first_and_row_major() {
        let data = [0x80, 0x01, 0x00, 0x40];
        let bitmap = Bitmap::new(&data, 2).expect("4 bytes is two 2-byte rows");
        assert_eq!(bitmap.size(), Size::new(16, 2));
        assert!(bitmap.is_set(0, 0));
        assert!(bitmap.is_set(15, 0));
        assert!(bitmap.is_set(9, 1));
        assert!(!bitmap.is_set(8, 0));
        assert!(!bitmap.is_set(16, 0));
        assert!(!bitmap.is_set(0, 2));
    }

    #[test]
    fn from_rows_matches_new() {
        let rows = [[0xF0, 0x0F], [0xAA, 0x55]];
        let flat = [0xF0, 0x0F, 0xAA, 0x55];
        assert_eq!(
            Bitmap::from_rows(&rows),
            Bitmap::new(&flat, 2).expect("whole rows")
        );
    }
}
