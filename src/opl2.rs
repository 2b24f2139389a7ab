//! YM3812 (OPL2) Parallel Bus Driver
//! =================================
//!
//! Bit-banged register writes to the OPL2 over its 8-bit data bus.
//!
//! Bus Protocol:
//! -------------
//! Each register write is two strobed transfers:
//!
//! 1. A0 low (address), register number on D0..D7, /WR low, hold, /WR high, hold
//! 2. A0 high (data), value on D0..D7, /WR low, hold, /WR high, hold
//!
//! The chip latches on the rising edge of /WR, so A0 and the data lines are
//! settled before /WR falls. Each hold is `STROBE_HOLD_US`.
//!
//! Register Map:
//! -------------
//! - Chip registers sit at fixed addresses.
//! - Channel registers are `base + channel` for channels 0..8.
//! - Operator registers are `base + OPERATOR_OFFSETS[op][ch]`; the operator
//!   slots are interleaved in groups of three, not linear.
//!
//! The driver keeps a shadow copy of every register written through the
//! typed API for diagnostic readback.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::config::{RESET_HOLD_MS, STROBE_HOLD_US};

// ============================================================================
// REGISTER DEFINITIONS
// ============================================================================

pub const NUM_CHANNELS: usize = 9;
pub const NUM_OPERATORS: usize = 2;

/// Global control registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChipRegister {
    /// No-op
    Nor = 0x00,
    /// Test / waveform select enable
    Tst = 0x01,
    /// Timer 1
    Tm1 = 0x02,
    /// Timer 2
    Tm2 = 0x03,
    /// IRQ reset and timer control
    Irq = 0x04,
    /// CSM speech mode and note select
    Csm = 0x08,
    /// AM/VIB depth and rhythm section
    Rtm = 0xBD,
}

impl ChipRegister {
    const ALL: [ChipRegister; 7] = [
        ChipRegister::Nor,
        ChipRegister::Tst,
        ChipRegister::Tm1,
        ChipRegister::Tm2,
        ChipRegister::Irq,
        ChipRegister::Csm,
        ChipRegister::Rtm,
    ];

    fn index(self) -> usize {
        match self {
            ChipRegister::Nor => 0,
            ChipRegister::Tst => 1,
            ChipRegister::Tm1 => 2,
            ChipRegister::Tm2 => 3,
            ChipRegister::Irq => 4,
            ChipRegister::Csm => 5,
            ChipRegister::Rtm => 6,
        }
    }
}

/// Per-channel registers, addressed as `base + channel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelRegister {
    /// F-number, low 8 bits
    Fnr = 0xA0,
    /// Key-on, block and F-number high bits
    Kbf = 0xB0,
    /// Feedback and connection
    Fbc = 0xC0,
}

impl ChannelRegister {
    fn index(self) -> usize {
        match self {
            ChannelRegister::Fnr => 0,
            ChannelRegister::Kbf => 1,
            ChannelRegister::Fbc => 2,
        }
    }
}

/// Per-operator registers, addressed through `OPERATOR_OFFSETS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperatorRegister {
    /// AM, VIB, EG type, KSR, frequency multiple
    Avr = 0x20,
    /// Key scale level and total level
    Ksl = 0x40,
    /// Attack and decay rate
    Adr = 0x60,
    /// Sustain level and release rate
    Srr = 0x80,
    /// Wave select
    Wsr = 0xE0,
}

impl OperatorRegister {
    fn index(self) -> usize {
        match self {
            OperatorRegister::Avr => 0,
            OperatorRegister::Ksl => 1,
            OperatorRegister::Adr => 2,
            OperatorRegister::Srr => 3,
            OperatorRegister::Wsr => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel(u8);

impl Channel {
    pub const fn new(index: u8) -> Option<Channel> {
        if (index as usize) < NUM_CHANNELS {
            Some(Channel(index))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Channel> {
        (0..NUM_CHANNELS as u8).map(Channel)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Modulator = 0,
    Carrier = 1,
}

impl Operator {
    pub const ALL: [Operator; NUM_OPERATORS] = [Operator::Modulator, Operator::Carrier];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Operator slot offsets, indexed `[operator][channel]`
const OPERATOR_OFFSETS: [[u8; NUM_CHANNELS]; NUM_OPERATORS] = [
    [0x00, 0x01, 0x02, 0x08, 0x09, 0x0A, 0x10, 0x11, 0x12],
    [0x03, 0x04, 0x05, 0x0B, 0x0C, 0x0D, 0x13, 0x14, 0x15],
];

/// Bus address of an operator register
pub fn operator_address(reg: OperatorRegister, ch: Channel, op: Operator) -> u8 {
    reg as u8 + OPERATOR_OFFSETS[op.index()][ch.index()]
}

/// Bus address of a channel register
pub fn channel_address(reg: ChannelRegister, ch: Channel) -> u8 {
    reg as u8 + ch.0
}

// ============================================================================
// SHADOW STATE
// ============================================================================

/// Last value written through the typed API, per register
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shadow {
    chip: [u8; ChipRegister::ALL.len()],
    channel: [[u8; 3]; NUM_CHANNELS],
    operator: [[[u8; 5]; NUM_OPERATORS]; NUM_CHANNELS],
}

impl Shadow {
    pub fn chip(&self, reg: ChipRegister) -> u8 {
        self.chip[reg.index()]
    }

    pub fn channel(&self, reg: ChannelRegister, ch: Channel) -> u8 {
        self.channel[ch.index()][reg.index()]
    }

    pub fn operator(&self, reg: OperatorRegister, ch: Channel, op: Operator) -> u8 {
        self.operator[ch.index()][op.index()][reg.index()]
    }
}

// ============================================================================
// HARDWARE SEAMS
// ============================================================================

/// The eight data lines D0..D7
pub trait DataBus {
    fn put(&mut self, value: u8);
}

/// What the queue consumer needs from a sound chip
pub trait SoundChip {
    /// Write one register by raw bus address
    fn write(&mut self, reg: u8, value: u8);

    /// Hardware reset followed by silencing every register
    fn reset(&mut self);
}

#[inline(always)]
pub(crate) fn drive<P: OutputPin<Error = Infallible>>(pin: &mut P, state: PinState) {
    match pin.set_state(state) {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

// ============================================================================
// DRIVER
// ============================================================================

pub struct Opl2<P, B, D> {
    a0: P,
    wr: P,
    ic: P,
    bus: B,
    delay: D,
    shadow: Shadow,
}

impl<P, B, D> Opl2<P, B, D>
where
    P: OutputPin<Error = Infallible>,
    B: DataBus,
    D: DelayNs,
{
    /// Take ownership of the bus and park it idle: A0 low, /WR high, /IC released
    pub fn new(a0: P, wr: P, ic: P, bus: B, delay: D) -> Self {
        let mut chip = Self {
            a0,
            wr,
            ic,
            bus,
            delay,
            shadow: Shadow::default(),
        };
        drive(&mut chip.a0, PinState::Low);
        drive(&mut chip.wr, PinState::High);
        drive(&mut chip.ic, PinState::High);
        chip
    }

    pub fn shadow(&self) -> &Shadow {
        &self.shadow
    }

    /// Place one byte on the bus and pulse /WR
    fn strobe(&mut self, value: u8) {
        self.bus.put(value);
        drive(&mut self.wr, PinState::Low);
        self.delay.delay_us(STROBE_HOLD_US);
        drive(&mut self.wr, PinState::High);
        self.delay.delay_us(STROBE_HOLD_US);
    }

    /// Untyped register write. Does not touch the shadow state.
    pub fn write_raw(&mut self, reg: u8, value: u8) {
        drive(&mut self.a0, PinState::Low);
        self.strobe(reg);
        drive(&mut self.a0, PinState::High);
        self.strobe(value);
    }

    pub fn write_chip(&mut self, reg: ChipRegister, value: u8) {
        self.shadow.chip[reg.index()] = value;
        self.write_raw(reg as u8, value);
    }

    pub fn write_channel(&mut self, reg: ChannelRegister, ch: Channel, value: u8) {
        self.shadow.channel[ch.index()][reg.index()] = value;
        self.write_raw(channel_address(reg, ch), value);
    }

    pub fn write_operator(&mut self, reg: OperatorRegister, ch: Channel, op: Operator, value: u8) {
        self.shadow.operator[ch.index()][op.index()][reg.index()] = value;
        self.write_raw(operator_address(reg, ch, op), value);
    }

    /// Pulse /IC and load silent defaults into every register.
    /// Blocks for the whole sequence.
    pub fn reset(&mut self) {
        drive(&mut self.ic, PinState::Low);
        self.delay.delay_ms(RESET_HOLD_MS);
        drive(&mut self.ic, PinState::High);

        self.write_chip(ChipRegister::Nor, 0x00);
        self.write_chip(ChipRegister::Csm, 0x40);
        self.write_chip(ChipRegister::Rtm, 0x00);

        for ch in Channel::all() {
            self.write_channel(ChannelRegister::Fnr, ch, 0x00);
            self.write_channel(ChannelRegister::Kbf, ch, 0x00);
            self.write_channel(ChannelRegister::Fbc, ch, 0x00);

            for op in Operator::ALL {
                self.write_operator(OperatorRegister::Avr, ch, op, 0x00);
                // total level 0x3F: fully attenuated
                self.write_operator(OperatorRegister::Ksl, ch, op, 0x3F);
                self.write_operator(OperatorRegister::Adr, ch, op, 0x00);
                self.write_operator(OperatorRegister::Srr, ch, op, 0x00);
                self.write_operator(OperatorRegister::Wsr, ch, op, 0x00);
            }
        }
        log::info!("opl2: reset complete");
    }
}

impl<P, B, D> SoundChip for Opl2<P, B, D>
where
    P: OutputPin<Error = Infallible>,
    B: DataBus,
    D: DelayNs,
{
    fn write(&mut self, reg: u8, value: u8) {
        self.write_raw(reg, value);
    }

    fn reset(&mut self) {
        Opl2::reset(self);
    }
}
