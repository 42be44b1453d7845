//! Draw bitmaps, glyphs, and wrapped text onto a grid of 8×8 single-bit LED panels
//! (HT16K33 "matrix backpacks") as though they formed one seamless display.
//!
//! Start with [`DisplayGrid`](crate::grid::DisplayGrid). It owns the panels, accepts drawing
//! calls in one virtual coordinate space, and forwards each call to the panels it touches with
//! coordinates rebased into that panel's local 8×8 space.
//!
//! # Glossary
//!
//! - **Panel:** one physical 8×8 LED unit with its own bit buffer and rotation.
//! - **Grid:** the logical `rows × cols` array of panels addressed as one canvas.
//! - **Rotation:** a clockwise quarter turn, applied once to choose panels and once
//!   inside each panel to orient pixels.
//! - **Rotation offset:** a per-panel calibration turn for boards mounted sideways.
//! - **Line length:** characters per line before [`print`](crate::grid::DisplayGrid::print) wraps.
//! - **Polarity:** whether a set bit is written to the device as lit or unlit.
//!
//! # Example
//!
//! ```rust
//! use panel_grid::{
//!     Result,
//!     font::TextLayout,
//!     grid::DisplayGrid,
//!     panel::{Detached, Panel},
//!     rotation::Rotation,
//! };
//! use embedded_graphics::prelude::Point;
//!
//! # fn example() -> Result<()> {
//! // Four boards wired left to right, top to bottom.
//! let panels = (0..4).map(|_| Panel::new(Detached, TextLayout::default()));
//! let mut grid: DisplayGrid<Detached, 4> =
//!     DisplayGrid::new(2, 2, panels, TextLayout::default())?;
//!
//! grid.set_line_length(2);
//! grid.print(Point::zero(), "42");
//! grid.set_rotation(Rotation::Deg180);
//! grid.write_display()?;
//! # Ok(())
//! # }
//! # example().expect("example must succeed");
//! ```
#![cfg_attr(not(any(test, feature = "host")), no_std)]

// Logging macros must be declared before the modules that use them.
#[macro_use]
mod fmt;

pub mod bitmap;
mod error;
pub mod font;
pub mod grid;
pub mod ht16k33;
pub mod panel;
pub mod rotation;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

// Re-export geometric types from embedded-graphics for convenience
pub use embedded_graphics::geometry::{Point, Size};

/// Side length, in pixels, of one square LED panel.
pub const PANEL_SIZE: usize = 8;
