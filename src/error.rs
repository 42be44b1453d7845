//! Crate-wide error type.

use derive_more::{Display, Error};
use embedded_hal::i2c::ErrorKind;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by grid construction, bitmap construction, and panel devices.
///
/// Drawing never fails: out-of-range coordinates are clipped and invalid settings fall back to
/// documented defaults. Only the cases below are hard failures.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A grid needs at least one panel row and one panel column.
    #[display("grid must have at least one row and one column of panels")]
    EmptyGrid,
    /// The panel list does not match `rows * cols`.
    #[display("a {rows}x{cols} grid needs {expected} panels but {actual} were given")]
    PanelCountMismatch {
        /// Panel rows requested.
        rows: usize,
        /// Panel columns requested.
        cols: usize,
        /// `rows * cols`.
        expected: usize,
        /// Panels actually supplied.
        actual: usize,
    },
    /// More panels than the grid's fixed capacity.
    #[display("grid capacity of {capacity} panels exceeded")]
    TooManyPanels {
        /// The grid's const capacity.
        capacity: usize,
    },
    /// Bitmap data is not a whole number of rows of `byte_columns` bytes.
    #[display("bitmap of {len} bytes is not a whole number of {byte_columns}-byte rows")]
    BitmapShape {
        /// Bytes supplied.
        len: usize,
        /// Bytes per row requested.
        byte_columns: usize,
    },
    /// The I2C bus rejected a transfer.
    #[display("I2C transfer failed: {kind:?}")]
    I2c {
        /// Bus error classification from `embedded-hal`.
        kind: ErrorKind,
    },
}

impl Error {
    /// Classify a bus error from any `embedded-hal` I2C implementation.
    pub fn from_i2c<E: embedded_hal::i2c::Error>(error: &E) -> Self {
        Self::I2c { kind: error.kind() }
    }
}
