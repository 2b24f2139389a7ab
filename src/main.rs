//! Bare-metal application entry point
//! ESP-IDF bootloader does minimal initialization, then calls this
//!
//! The firmware bridges a serial host to a YM3812 (OPL2):
//! - USB Serial/JTAG carries the binary host protocol
//! - UART0 carries log output
//! - GPIO0..8, 10 and 20 drive the OPL2 bus, GPIO9 (open-drain) flags queue under-run
//! - TIMG0 provides the 1 ms time base

#![no_std]
#![no_main]

mod console;
mod gpio;
mod ticker;

use esp_backtrace as _;
use esp_hal::delay::Delay;
use esp_hal::prelude::*;
use opl2_bridge::config::{BoardConfig, QUEUE_SIZE};
use opl2_bridge::{Opl2, Scheduler};

const BOARD: BoardConfig = BoardConfig::DEFAULT;
const _: () = assert!(BOARD.is_valid(), "invalid pin assignment");

#[entry]
fn main() -> ! {
    // Initialize ESP-HAL
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::logger::init_logger(log::LevelFilter::Info);
    log::info!("=== OPL2 BRIDGE BOOTING ===");

    // Pin numbers are checked at compile time
    let a0 = gpio::Pin::output(BOARD.a0_pin);
    let wr = gpio::Pin::output(BOARD.wr_pin);
    let ic = gpio::Pin::output(BOARD.ic_pin);
    let bus = gpio::ParallelBus::new(BOARD.data_pins);
    let status = gpio::Pin::open_drain(BOARD.status_pin);

    let mut chip = Opl2::new(a0, wr, ic, bus, Delay::new());
    chip.reset();

    // a queue without a time base stalls on its first sleep
    if let Err(err) = ticker::init(peripherals.TIMG0) {
        panic!("time base failed to start: {:?}", err);
    }

    let mut scheduler: Scheduler<'_, _, _, _, QUEUE_SIZE> =
        Scheduler::new(console::UsbSerial::new(), chip, status, &ticker::TIME_BASE);
    log::info!("ready, {} byte queue", QUEUE_SIZE);

    // Main loop - one host packet and one queued record per pass
    loop {
        scheduler.poll();
    }
}
