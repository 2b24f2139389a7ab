//! ESP32-C3 GPIO Driver
//! Direct register access for the OPL2 control lines and data bus

use core::convert::Infallible;
use core::ptr::{read_volatile, write_volatile};

use embedded_hal::digital::{ErrorType, OutputPin};
use opl2_bridge::config::MAX_GPIO;
use opl2_bridge::DataBus;

// GPIO register base addresses
const GPIO_BASE: u32 = 0x60004000;
const IO_MUX_BASE: u32 = 0x60009000;

// GPIO registers
const GPIO_ENABLE_W1TS_REG: u32 = GPIO_BASE + 0x0024;
const GPIO_OUT_W1TS_REG: u32 = GPIO_BASE + 0x0008;  // Write 1 to set
const GPIO_OUT_W1TC_REG: u32 = GPIO_BASE + 0x000C;  // Write 1 to clear

// Pad configuration (one per GPIO); PAD_DRIVER selects open-drain
#[inline(always)]
fn gpio_pin_reg(n: u32) -> u32 {
    GPIO_BASE + 0x0074 + (n * 4)
}
const GPIO_PIN_PAD_DRIVER: u32 = 1 << 2;

// Output signal select (one per GPIO); 0x80 routes GPIO_OUT_REG to the pin
#[inline(always)]
fn gpio_func_out_sel_reg(n: u32) -> u32 {
    GPIO_BASE + 0x0554 + (n * 4)
}
const SIG_GPIO_OUT: u32 = 0x80;

// IO MUX registers (one per GPIO)
#[inline(always)]
fn gpio_pin_mux_reg(n: u32) -> u32 {
    IO_MUX_BASE + 0x0004 + (n * 4)
}

// IO MUX configuration bits
const FUN_DRV_SHIFT: u32 = 10;        // Drive strength
const MCU_SEL_SHIFT: u32 = 12;        // Function select

// Register access functions
#[inline(always)]
fn reg_write(addr: u32, val: u32) {
    unsafe { write_volatile(addr as *mut u32, val) }
}

#[inline(always)]
fn reg_read(addr: u32) -> u32 {
    unsafe { read_volatile(addr as *const u32) }
}

/// Route a pin to the GPIO matrix and enable its output driver
fn set_output(gpio_num: u8) {
    let gpio_num = gpio_num as u32;

    let mux_reg = gpio_pin_mux_reg(gpio_num);
    let mut mux_val = reg_read(mux_reg);

    // Set function to GPIO (function 1)
    mux_val &= !(0x7 << MCU_SEL_SHIFT);
    mux_val |= 1 << MCU_SEL_SHIFT;

    // Set drive strength to medium (2)
    mux_val &= !(0x3 << FUN_DRV_SHIFT);
    mux_val |= 2 << FUN_DRV_SHIFT;

    reg_write(mux_reg, mux_val);

    reg_write(gpio_func_out_sel_reg(gpio_num), SIG_GPIO_OUT);
    reg_write(GPIO_ENABLE_W1TS_REG, 1 << gpio_num);
}

/// A single output line.
///
/// Pin numbers are not checked here: `BoardConfig::is_valid` runs at compile
/// time over the assignment the firmware uses.
pub struct Pin {
    mask: u32,
}

impl Pin {
    /// Configure `gpio_num` as a push-pull output, driven low
    pub fn output(gpio_num: u8) -> Pin {
        debug_assert!(gpio_num <= MAX_GPIO);
        let pin = Pin { mask: 1 << gpio_num };
        reg_write(GPIO_OUT_W1TC_REG, pin.mask);
        set_output(gpio_num);
        pin
    }

    /// Configure `gpio_num` as an open-drain output, released (high).
    /// Safe on pins that a button can short to GND.
    pub fn open_drain(gpio_num: u8) -> Pin {
        debug_assert!(gpio_num <= MAX_GPIO);
        let pin = Pin { mask: 1 << gpio_num };
        reg_write(GPIO_OUT_W1TS_REG, pin.mask);
        let pad = gpio_pin_reg(gpio_num as u32);
        reg_write(pad, reg_read(pad) | GPIO_PIN_PAD_DRIVER);
        set_output(gpio_num);
        pin
    }
}

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        reg_write(GPIO_OUT_W1TC_REG, self.mask);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        reg_write(GPIO_OUT_W1TS_REG, self.mask);
        Ok(())
    }
}

/// Eight arbitrary GPIOs acting as D0..D7
pub struct ParallelBus {
    masks: [u32; 8],
    all: u32,
}

impl ParallelBus {
    pub fn new(pins: [u8; 8]) -> ParallelBus {
        let masks = pins.map(|gpio_num| Pin::output(gpio_num).mask);
        let all = masks.iter().fold(0, |all, mask| all | mask);
        ParallelBus { masks, all }
    }
}

impl DataBus for ParallelBus {
    fn put(&mut self, value: u8) {
        let mut set = 0;
        for (bit, mask) in self.masks.iter().enumerate() {
            if value & (1 << bit) != 0 {
                set |= mask;
            }
        }
        reg_write(GPIO_OUT_W1TS_REG, set);
        reg_write(GPIO_OUT_W1TC_REG, self.all & !set);
    }
}
