#![allow(missing_docs)]
//! HT16K33 command bytes and RAM layout, checked against a recording I2C bus.

use std::cell::RefCell;

use embedded_graphics::prelude::Point;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use embedded_hal_bus::i2c::RefCellDevice;
use panel_grid::{
    Error,
    font::TextLayout,
    grid::DisplayGrid,
    ht16k33::Ht16k33,
    panel::{BlinkRate, Brightness, Panel, PanelDevice, Polarity},
};

/// Records every write; refuses to acknowledge `absent`.
#[derive(Debug, Default)]
struct RecordingBus {
    writes: Vec<(u8, Vec<u8>)>,
    absent: Option<u8>,
}

impl ErrorType for RecordingBus {
    type Error = ErrorKind;
}

impl I2c for RecordingBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.absent == Some(address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buffer) => buffer.fill(0),
            }
        }
        Ok(())
    }
}

fn ram(rows: [u8; 8]) -> Vec<u8> {
    let mut frame = vec![0x00];
    for row in rows {
        frame.extend([row, 0x00]);
    }
    frame
}

fn take_writes(bus: &RefCell<RecordingBus>) -> Vec<(u8, Vec<u8>)> {
    std::mem::take(&mut bus.borrow_mut().writes)
}

fn each_backpack(bytes: &[u8]) -> Vec<(u8, Vec<u8>)> {
    [0x70, 0x71, 0x72]
        .map(|address| (address, bytes.to_vec()))
        .to_vec()
}

fn commands(bus: &RecordingBus) -> Vec<Vec<u8>> {
    bus.writes.iter().map(|(_, bytes)| bytes.clone()).collect()
}

#[test]
fn init_sends_the_startup_sequence() {
    let mut device = Ht16k33::new(RecordingBus::default(), 0x70);
    device.init().expect("bus accepts everything");
    let bus = device.release();
    assert!(bus.writes.iter().all(|(address, _)| *address == 0x70));
    assert_eq!(
        commands(&bus),
        [
            vec![0x21],
            vec![0xEF],
            vec![0x80],
            ram([0; 8]),
            vec![0x81],
        ]
    );
}

#[test]
fn rows_are_shifted_for_backpack_wiring() {
    let mut device = Ht16k33::new(
        RecordingBus::default(),
        Ht16k33::<RecordingBus>::DEFAULT_ADDRESS,
    );
    device
        .write_rows(&[0x01, 0x80, 0x03, 0, 0, 0, 0, 0xFF])
        .expect("bus accepts everything");
    let bus = device.release();
    assert_eq!(bus.writes, [(0x70, ram([0x80, 0x40, 0x81, 0, 0, 0, 0, 0xFF]))]);
}

#[test]
fn display_off_keeps_the_blink_rate() {
    let mut device = Ht16k33::new(RecordingBus::default(), 0x72);
    device.set_blink_rate(BlinkRate::Hz1).expect("ok");
    device.set_display_on(true).expect("ok");
    device.set_display_on(false).expect("ok");
    device.set_blink_rate(BlinkRate::from_index(9)).expect("ok");
    device.system_stop().expect("ok");
    assert_eq!(device.address(), 0x72);
    assert_eq!(
        commands(&device.release()),
        [vec![0x84], vec![0x85], vec![0x84], vec![0x80], vec![0x20]]
    );
}

#[test]
fn brightness_is_clamped_before_sending() {
    let mut device = Ht16k33::new(RecordingBus::default(), 0x70);
    device.set_brightness(Brightness::new(3)).expect("ok");
    device.set_brightness(Brightness::new(200)).expect("ok");
    assert_eq!(commands(&device.release()), [vec![0xE3], vec![0xEF]]);
}

#[test]
fn grid_shares_one_bus_between_backpacks() {
    let bus = RefCell::new(RecordingBus::default());
    let panels = [0x70, 0x71].map(|address| {
        Panel::new(
            Ht16k33::new(RefCellDevice::new(&bus), address),
            TextLayout::default(),
        )
    });
    let mut grid: DisplayGrid<_, 2> =
        DisplayGrid::new(1, 2, panels, TextLayout::default()).expect("two panels");

    grid.set_pixel(Point::new(8, 0));
    grid.write_display().expect("bus accepts everything");
    assert_eq!(
        bus.borrow().writes,
        [
            (0x70, ram([0; 8])),
            (0x71, ram([0x80, 0, 0, 0, 0, 0, 0, 0])),
        ]
    );
}

#[test]
fn active_low_inverts_writes_and_blanks() {
    let bus = RefCell::new(RecordingBus::default());
    let mut panel = Panel::new(Ht16k33::new(RefCellDevice::new(&bus), 0x70), TextLayout::default());
    panel.set_polarity(Polarity::ActiveLow);
    panel.set_pixel(Point::new(1, 0));
    panel.write_display().expect("ok");
    panel.blank_device().expect("ok");
    assert_eq!(
        commands(&bus.borrow()),
        [
            // Column 1 lands on RAM bit 0 and is the only dark LED.
            ram([0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
            ram([0xFF; 8]),
        ]
    );
    assert!(!panel.is_blank());
}

#[test]
fn first_bus_error_stops_the_fan_out() {
    let bus = RefCell::new(RecordingBus {
        absent: Some(0x71),
        ..RecordingBus::default()
    });
    let panels = [0x70, 0x71, 0x72].map(|address| {
        Panel::new(
            Ht16k33::new(RefCellDevice::new(&bus), address),
            TextLayout::default(),
        )
    });
    let mut grid: DisplayGrid<_, 3> =
        DisplayGrid::new(1, 3, panels, TextLayout::default()).expect("three panels");

    assert_eq!(
        grid.display_on(),
        Err(Error::I2c {
            kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        })
    );
    let written: Vec<u8> = bus.borrow().writes.iter().map(|(address, _)| *address).collect();
    assert_eq!(written, [0x70]);
}

#[test]
fn grid_settings_reach_every_backpack_in_order() {
    let bus = RefCell::new(RecordingBus::default());
    let panels = [0x70, 0x71, 0x72].map(|address| {
        Panel::new(
            Ht16k33::new(RefCellDevice::new(&bus), address),
            TextLayout::default(),
        )
    });
    let mut grid: DisplayGrid<_, 3> =
        DisplayGrid::new(1, 3, panels, TextLayout::default()).expect("three panels");
    grid.set_polarity(Polarity::ActiveLow);

    grid.set_brightness(Brightness::new(3)).expect("ok");
    assert_eq!(take_writes(&bus), each_backpack(&[0xE3]));
    grid.set_blink_rate(BlinkRate::Hz1).expect("ok");
    assert_eq!(take_writes(&bus), each_backpack(&[0x84]));
    grid.display_on().expect("ok");
    assert_eq!(take_writes(&bus), each_backpack(&[0x85]));
    grid.display_off().expect("ok");
    assert_eq!(take_writes(&bus), each_backpack(&[0x84]));
    grid.blank_devices().expect("ok");
    assert_eq!(take_writes(&bus), each_backpack(&ram([0xFF; 8])));

    grid.set_polarity(Polarity::ActiveHigh);
    grid.blank_devices().expect("ok");
    assert_eq!(take_writes(&bus), each_backpack(&ram([0; 8])));
}
