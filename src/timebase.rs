//! Millisecond Time Base
//! =====================
//!
//! Two 16-bit counters shared between the periodic timer interrupt and the
//! main loop:
//!
//! - `tick` is free-running and wraps silently.
//! - `countdown` is the sleep gate. The interrupt decrements it down to zero
//!   and the queue consumer only runs while it reads zero.
//!
//! Both live behind a `critical_section::Mutex`, so a two-byte store from the
//! main loop can never be observed half-written by the interrupt.

use core::cell::Cell;

use critical_section::Mutex;

pub struct TimeBase {
    tick: Mutex<Cell<u16>>,
    countdown: Mutex<Cell<u16>>,
}

impl TimeBase {
    pub const fn new() -> Self {
        Self {
            tick: Mutex::new(Cell::new(0)),
            countdown: Mutex::new(Cell::new(0)),
        }
    }

    /// Called from the timer interrupt once per tick period
    pub fn on_interrupt(&self) {
        critical_section::with(|cs| {
            let tick = self.tick.borrow(cs);
            tick.set(tick.get().wrapping_add(1));

            let countdown = self.countdown.borrow(cs);
            countdown.set(countdown.get().saturating_sub(1));
        });
    }

    pub fn ticks(&self) -> u16 {
        critical_section::with(|cs| self.tick.borrow(cs).get())
    }

    pub fn countdown(&self) -> u16 {
        critical_section::with(|cs| self.countdown.borrow(cs).get())
    }

    /// Close the gate for `ms` ticks
    pub fn set_countdown(&self, ms: u16) {
        critical_section::with(|cs| self.countdown.borrow(cs).set(ms));
    }

    /// Reopen the gate immediately
    pub fn cancel(&self) {
        self.set_countdown(0);
    }

    pub fn is_gate_open(&self) -> bool {
        self.countdown() == 0
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_floors_at_zero() {
        let tb = TimeBase::new();
        tb.set_countdown(2);
        assert!(!tb.is_gate_open());
        tb.on_interrupt();
        assert_eq!(tb.countdown(), 1);
        tb.on_interrupt();
        assert!(tb.is_gate_open());
        tb.on_interrupt();
        assert_eq!(tb.countdown(), 0);
        assert_eq!(tb.ticks(), 3);
    }

    #[test]
    fn tick_wraps() {
        let tb = TimeBase::new();
        for _ in 0..=u16::MAX as u32 {
            tb.on_interrupt();
        }
        assert_eq!(tb.ticks(), 0);
    }

    #[test]
    fn cancel_opens_gate() {
        let tb = TimeBase::new();
        tb.set_countdown(500);
        tb.cancel();
        assert!(tb.is_gate_open());
    }
}
