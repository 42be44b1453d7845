//! Host-only previews: render a grid's physical LED layout to PNG or looping APNG.
#![cfg(feature = "host")]

use crate::PANEL_SIZE;
use crate::grid::DisplayGrid;
use png::{BitDepth, ColorType, Encoder};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// RGB of a lit LED.
pub const LIT: [u8; 3] = [255, 32, 24];
/// RGB of a dark LED.
pub const UNLIT: [u8; 3] = [40, 8, 8];
/// RGB of the board between LEDs.
pub const BOARD: [u8; 3] = [12, 12, 12];

/// What the LEDs of a grid show at one instant, in physical board order.
///
/// Pixels are read through each panel's polarity, so an active-low panel previews the way the
/// hardware would look.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridFrame {
    width: usize,
    height: usize,
    lit: Vec<bool>,
}

impl GridFrame {
    /// Snapshot the panels of `grid` as they would appear on the wall.
    #[must_use]
    pub fn capture<D, const N: usize>(grid: &DisplayGrid<D, N>) -> Self {
        let cols = grid.cols();
        let width = cols * PANEL_SIZE;
        let height = grid.rows() * PANEL_SIZE;
        let mut lit = vec![false; width * height];
        for (index, panel) in grid.panels().iter().enumerate() {
            let (panel_row, panel_col) = (index / cols, index % cols);
            for (row, bits) in panel.device_rows().into_iter().enumerate() {
                let y = panel_row * PANEL_SIZE + row;
                for column in 0..PANEL_SIZE {
                    let x = panel_col * PANEL_SIZE + column;
                    lit[y * width + x] = bits >> column & 1 == 1;
                }
            }
        }
        Self { width, height, lit }
    }

    /// Width and height in LEDs.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whether the LED at (`x`, `y`) is on. Outside the frame is off.
    #[must_use]
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        x < self.width && self.lit.get(y * self.width + x).copied().unwrap_or(false)
    }
}

/// Render `grid` into a PNG whose longer side is at most `target_max_dimension` pixels.
///
/// # Errors
///
/// Returns any I/O or encoding error.
pub fn write_grid_png<D, const N: usize>(
    grid: &DisplayGrid<D, N>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let frame = GridFrame::capture(grid);
    let cell_size = select_cell_size(&frame, target_max_dimension);
    let (width, height, pixels) = frame_pixels(&frame, cell_size);

    let mut encoder = Encoder::new(BufWriter::new(create(output_path)?), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    writer.finish()?;
    println!("wrote PNG to {}", output_path.display());
    Ok(())
}

/// Render `frames` into a looping APNG, each shown for `frame_delay_ms`.
///
/// # Errors
///
/// Returns any I/O or encoding error, or an error if `frames` is empty, the frames differ in
/// size, or the delay does not fit the format.
pub fn write_frames_apng(
    frames: &[GridFrame],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u32,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let Some(first) = frames.first() else {
        return Err("an animation needs at least one frame".into());
    };
    if frames.iter().any(|frame| frame.dimensions() != first.dimensions()) {
        return Err("every frame must come from the same grid shape".into());
    }
    let frame_count = u32::try_from(frames.len())?;
    let delay_num = u16::try_from(frame_delay_ms)?;

    let cell_size = select_cell_size(first, target_max_dimension);
    let (width, height, _) = frame_pixels(first, cell_size);
    let mut encoder = Encoder::new(BufWriter::new(create(output_path)?), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_animated(frame_count, 0)?;
    let mut writer = encoder.write_header()?;
    for frame in frames {
        let (_, _, pixels) = frame_pixels(frame, cell_size);
        writer.set_frame_delay(delay_num, 1000)?;
        writer.write_image_data(&pixels)?;
    }
    writer.finish()?;
    println!("wrote APNG to {}", output_path.display());
    Ok(())
}

fn create(output_path: &Path) -> std::io::Result<File> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    File::create(output_path)
}

// Largest square cell (one LED plus its margin) that keeps the image within the target.
fn select_cell_size(frame: &GridFrame, target_max_dimension: u32) -> u32 {
    let (width, height) = frame.dimensions();
    let leds = u32::try_from(width.max(height)).unwrap_or(u32::MAX).max(1);
    (target_max_dimension / leds).max(4)
}

fn frame_pixels(frame: &GridFrame, cell_size: u32) -> (u32, u32, Vec<u8>) {
    let (leds_wide, leds_high) = frame.dimensions();
    let cell = cell_size as usize;
    let (width, height) = (leds_wide * cell, leds_high * cell);
    let mut bytes = BOARD.repeat(width * height);

    let radius = (cell_size as f32 - 1.0) / 2.0 - (cell_size / 8) as f32;
    let center = (cell_size as f32 - 1.0) / 2.0;
    for led_y in 0..leds_high {
        for led_x in 0..leds_wide {
            let color = if frame.is_lit(led_x, led_y) { LIT } else { UNLIT };
            for local_y in 0..cell {
                for local_x in 0..cell {
                    let delta_x = local_x as f32 - center;
                    let delta_y = local_y as f32 - center;
                    if delta_x * delta_x + delta_y * delta_y > radius * radius {
                        continue;
                    }
                    let x = led_x * cell + local_x;
                    let y = led_y * cell + local_y;
                    let offset = (y * width + x) * 3;
                    bytes[offset..offset + 3].copy_from_slice(&color);
                }
            }
        }
    }
    (width as u32, height as u32, bytes)
}
