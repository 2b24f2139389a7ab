//! Host-side stand-ins for the board: a scripted link, a recording chip and
//! a status pin.

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use opl2_bridge::{Scheduler, SoundChip, TimeBase, Transport};

#[derive(Default)]
pub struct Link {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub flushes: usize,
}

impl Link {
    pub fn send(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Reply bytes since the last call
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }
}

impl Transport for Link {
    fn has_data(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.rx.pop_front().expect("firmware read past the scripted input")
    }

    fn write_byte(&mut self, value: u8) {
        self.tx.push(value);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipOp {
    Write(u8, u8),
    Reset,
}

#[derive(Default)]
pub struct Chip {
    pub ops: Vec<ChipOp>,
}

impl Chip {
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                ChipOp::Write(reg, val) => Some((reg, val)),
                ChipOp::Reset => None,
            })
            .collect()
    }

    pub fn resets(&self) -> usize {
        self.ops.iter().filter(|op| **op == ChipOp::Reset).count()
    }
}

impl SoundChip for Chip {
    fn write(&mut self, reg: u8, value: u8) {
        self.ops.push(ChipOp::Write(reg, value));
    }

    fn reset(&mut self) {
        self.ops.push(ChipOp::Reset);
    }
}

#[derive(Default)]
pub struct Led {
    pub high: bool,
}

impl ErrorType for Led {
    type Error = Infallible;
}

impl OutputPin for Led {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

pub type Bridge<'a, const N: usize> = Scheduler<'a, Link, Chip, Led, N>;

pub fn bridge<const N: usize>(time: &TimeBase) -> Bridge<'_, N> {
    Scheduler::new(Link::default(), Chip::default(), Led::default(), time)
}

pub fn ticks(time: &TimeBase, n: u32) {
    for _ in 0..n {
        time.on_interrupt();
    }
}

/// WRITE packet carrying `payload`
pub fn write_packet(payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0xC1, payload.len() as u8];
    packet.extend_from_slice(payload);
    packet
}
