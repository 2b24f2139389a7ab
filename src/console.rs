//! ESP32-C3 USB Serial/JTAG Host Link
//! ==================================
//!
//! Carries the binary host protocol over the chip's built-in USB Serial/JTAG
//! peripheral. Log output goes to UART0 instead, so nothing else writes to
//! this link.
//!
//! How It Works:
//! -------------
//! 1. Reply bytes are buffered in RAM (software buffer)
//! 2. On flush, or when the buffer fills, they are copied into the
//!    peripheral's 64-byte IN FIFO
//! 3. Setting WR_DONE hands the FIFO to the USB side for transmission
//! 4. Host bytes arrive in the OUT FIFO and are read from the same EP1
//!    register while SERIAL_OUT_EP_DATA_AVAIL is set

use core::ptr::{read_volatile, write_volatile};

use opl2_bridge::Transport;

// ============================================================================
// HARDWARE REGISTER DEFINITIONS
// ============================================================================

// Base address of USB Serial/JTAG peripheral in memory map
const USB_SERIAL_JTAG_BASE: u32 = 0x60043000;

// EP1_REG: FIFO data register, read for OUT bytes, write for IN bytes
const USB_SERIAL_JTAG_EP1_REG: u32 = USB_SERIAL_JTAG_BASE + 0x0000;

// EP1_CONF_REG: FIFO control and status
const USB_SERIAL_JTAG_EP1_CONF_REG: u32 = USB_SERIAL_JTAG_BASE + 0x0004;

// EP1_CONF_REG bits
const USB_SERIAL_JTAG_WR_DONE: u32 = 1 << 0;
const USB_SERIAL_JTAG_SERIAL_IN_EP_DATA_FREE: u32 = 1 << 1;
const USB_SERIAL_JTAG_SERIAL_OUT_EP_DATA_AVAIL: u32 = 1 << 2;

// ============================================================================
// REGISTER ACCESS FUNCTIONS
// ============================================================================

#[inline(always)]
fn reg_read(addr: u32) -> u32 {
    unsafe { read_volatile(addr as *const u32) }
}

#[inline(always)]
fn reg_write(addr: u32, val: u32) {
    unsafe { write_volatile(addr as *mut u32, val) }
}

// ============================================================================
// DRIVER
// ============================================================================

const BUFFER_SIZE: usize = 64;

pub struct UsbSerial {
    buffer: [u8; BUFFER_SIZE],
    pos: usize,
}

impl UsbSerial {
    /// The peripheral is already enumerated by the ROM bootloader
    pub fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
            pos: 0,
        }
    }

    /// Send buffered bytes to the USB hardware
    fn flush_buffer(&mut self) {
        if self.pos == 0 {
            return;
        }

        for &byte in &self.buffer[..self.pos] {
            // Wait for room in the IN FIFO
            while reg_read(USB_SERIAL_JTAG_EP1_CONF_REG) & USB_SERIAL_JTAG_SERIAL_IN_EP_DATA_FREE == 0 {
                core::hint::spin_loop();
            }
            reg_write(USB_SERIAL_JTAG_EP1_REG, byte as u32);
        }

        // Tell hardware to transmit the FIFO contents over USB
        reg_write(USB_SERIAL_JTAG_EP1_CONF_REG, USB_SERIAL_JTAG_WR_DONE);

        self.pos = 0;
    }
}

impl Transport for UsbSerial {
    fn has_data(&mut self) -> bool {
        reg_read(USB_SERIAL_JTAG_EP1_CONF_REG) & USB_SERIAL_JTAG_SERIAL_OUT_EP_DATA_AVAIL != 0
    }

    fn read_byte(&mut self) -> u8 {
        while !self.has_data() {
            core::hint::spin_loop();
        }
        reg_read(USB_SERIAL_JTAG_EP1_REG) as u8
    }

    fn write_byte(&mut self, value: u8) {
        self.buffer[self.pos] = value;
        self.pos += 1;

        if self.pos >= BUFFER_SIZE {
            self.flush_buffer();
        }
    }

    fn flush(&mut self) {
        self.flush_buffer();
    }
}
