//! HT16K33 LED controller on an 8×8 matrix backpack, driven over blocking `embedded-hal` I2C.
//!
//! Each backpack is one [`PanelDevice`]. Several backpacks usually share one bus; wrap the bus
//! in an `embedded-hal-bus` device such as `i2c::RefCellDevice` and give each
//! [`Ht16k33`] its own handle and address.
//!
//! ```rust,no_run
//! # use embedded_hal::i2c::I2c;
//! use panel_grid::{
//!     Result,
//!     font::TextLayout,
//!     grid::DisplayGrid,
//!     ht16k33::Ht16k33,
//!     panel::Panel,
//! };
//! use embedded_graphics::prelude::Point;
//!
//! fn show<I: I2c>(buses: [I; 4]) -> Result<()> {
//!     let mut address = Ht16k33::<I>::DEFAULT_ADDRESS;
//!     let mut panels = heapless::Vec::<_, 4>::new();
//!     for bus in buses {
//!         let mut device = Ht16k33::new(bus, address);
//!         device.init()?;
//!         let _ = panels.push(Panel::new(device, TextLayout::default()));
//!         address += 1;
//!     }
//!     let mut grid: DisplayGrid<_, 4> = DisplayGrid::new(2, 2, panels, TextLayout::default())?;
//!     grid.print(Point::zero(), "Hi");
//!     grid.write_display()
//! }
//! ```

use embedded_hal::i2c::I2c;

use crate::{
    Error, PANEL_SIZE, Result,
    panel::{BlinkRate, Brightness, PanelDevice},
};

// Command high nibbles.
const SYSTEM_SETUP: u8 = 0x20;
const DISPLAY_SETUP: u8 = 0x80;
const BRIGHTNESS: u8 = 0xE0;
const DISPLAY_RAM: u8 = 0x00;

const OSCILLATOR_ON: u8 = 0x01;

/// One HT16K33 at a 7-bit bus address.
///
/// The controller's display setup register holds both the blink rate and the on/off bit, so
/// the driver remembers both and always writes them together.
#[derive(Debug)]
pub struct Ht16k33<I2C> {
    i2c: I2C,
    address: u8,
    blink_rate: BlinkRate,
    display_on: bool,
}

impl<I2C: I2c> Ht16k33<I2C> {
    /// Address with all three solder jumpers open.
    pub const DEFAULT_ADDRESS: u8 = 0x70;

    /// Wrap a bus handle. Nothing is sent until [`init`](Self::init) or another command.
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            blink_rate: BlinkRate::Off,
            display_on: false,
        }
    }

    /// Start the oscillator, set full brightness with no blink, blank the RAM, and turn the
    /// display on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] if any transfer fails.
    pub fn init(&mut self) -> Result<()> {
        self.system_start()?;
        self.set_brightness(Brightness::MAX)?;
        self.set_blink_rate(BlinkRate::Off)?;
        self.fill(false)?;
        self.set_display_on(true)?;
        info!("HT16K33 at address {} initialized", self.address);
        Ok(())
    }

    /// Turn the internal oscillator on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] if the transfer fails.
    pub fn system_start(&mut self) -> Result<()> {
        self.command(SYSTEM_SETUP | OSCILLATOR_ON)
    }

    /// Turn the internal oscillator off (standby).
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] if the transfer fails.
    pub fn system_stop(&mut self) -> Result<()> {
        self.command(SYSTEM_SETUP)
    }

    /// 7-bit bus address.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Talk to a different address from now on.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Give back the bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn command(&mut self, command: u8) -> Result<()> {
        self.write(&[command])
    }

    fn display_setup(&mut self) -> Result<()> {
        self.command(DISPLAY_SETUP | (self.blink_rate.index() << 1) | u8::from(self.display_on))
    }

    fn write_ram(&mut self, rows: [u8; PANEL_SIZE]) -> Result<()> {
        // Pointer, then a low/high byte pair per row; the high byte drives unused columns.
        let mut frame = [0u8; 1 + 2 * PANEL_SIZE];
        frame[0] = DISPLAY_RAM;
        for (pair, row) in frame[1..].chunks_exact_mut(2).zip(rows) {
            pair[0] = row;
        }
        self.write(&frame)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|error| Error::from_i2c(&error))
    }
}

impl<I2C: I2c> PanelDevice for Ht16k33<I2C> {
    fn write_rows(&mut self, rows: &[u8; PANEL_SIZE]) -> Result<()> {
        // The backpack wires LED column c to RAM bit (c + 7) % 8.
        self.write_ram(rows.map(|row| row.rotate_right(1)))
    }

    fn fill(&mut self, lit: bool) -> Result<()> {
        self.write_ram([if lit { 0xFF } else { 0x00 }; PANEL_SIZE])
    }

    fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        self.command(BRIGHTNESS | brightness.level())
    }

    fn set_blink_rate(&mut self, blink_rate: BlinkRate) -> Result<()> {
        self.blink_rate = blink_rate;
        self.display_setup()
    }

    fn set_display_on(&mut self, on: bool) -> Result<()> {
        self.display_on = on;
        self.display_setup()
    }
}
