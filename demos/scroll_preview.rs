//! Preview a 2×2 wall of 8×8 boards on the host: a countdown, scrolling text, and a bitmap
//! turned through every rotation, written as one looping APNG.
//!
//! ```text
//! cargo run --features host --bin demo_scroll_preview -- target/preview.png
//! ```
#![cfg(feature = "host")]

use std::error::Error;

use embedded_graphics::prelude::Point;
use panel_grid::{
    bitmap::Bitmap,
    font::TextLayout,
    grid::DisplayGrid,
    panel::{Detached, Panel},
    rotation::Rotation,
    to_png::{GridFrame, write_frames_apng},
};

type Wall = DisplayGrid<Detached, 4>;

const PANDA: [[u8; 2]; 16] = [
    [0b0000_0011, 0b1100_0011],
    [0b0000_0011, 0b1100_0111],
    [0b0010_0010, 0b0000_0001],
    [0b0100_0100, 0b0000_0000],
    [0b1000_1100, 0b0000_0000],
    [0b1000_1010, 0b1100_0000],
    [0b1000_1001, 0b1100_1100],
    [0b1000_1001, 0b1000_1100],
    [0b1100_1100, 0b0000_0100],
    [0b1100_1110, 0b0111_0001],
    [0b0110_1111, 0b0010_0011],
    [0b0111_1111, 0b1000_1111],
    [0b0111_1111, 0b1111_1111],
    [0b0011_1011, 0b1100_0111],
    [0b0001_1011, 0b1100_1111],
    [0b0000_0001, 0b1110_1110],
];

const MESSAGE: &str = "Hello Pandas!";
const FRAME_DELAY_MS: u32 = 80;

fn main() -> Result<(), Box<dyn Error>> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "target/scroll_preview.png".to_owned());

    let panels = (0..4).map(|_| Panel::new(Detached, TextLayout::default()));
    let mut wall: Wall = DisplayGrid::new(2, 2, panels, TextLayout::default())?;
    let mut frames = Vec::new();

    // Two digits per line fill the 16-pixel width.
    wall.set_line_length(2);
    for count in (0..=20).rev() {
        wall.clear_buffer();
        wall.print(Point::zero(), &count.to_string());
        frames.push(GridFrame::capture(&wall));
    }

    wall.set_line_length(0);
    let width = i32::try_from(wall.size().width)?;
    let message_width = i32::try_from(
        wall.text_layout()
            .message_size(MESSAGE.chars().count(), 0)
            .width,
    )?;
    for x in (-message_width..=width).rev() {
        wall.clear_buffer();
        wall.print(Point::new(x, 4), MESSAGE);
        frames.push(GridFrame::capture(&wall));
    }

    let panda = Bitmap::from_rows(&PANDA);
    for rotation in Rotation::ALL.into_iter().cycle().take(8) {
        wall.set_rotation(rotation);
        wall.clear_buffer();
        wall.draw_bitmap(Point::zero(), &panda);
        for _ in 0..6 {
            frames.push(GridFrame::capture(&wall));
        }
    }

    write_frames_apng(&frames, output_path, 320, FRAME_DELAY_MS)
}
