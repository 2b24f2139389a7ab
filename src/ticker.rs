//! 1 ms time base interrupt
//!
//! TIMG0 timer 0 runs as a periodic timer and its level interrupt advances
//! the shared `TimeBase`.

use core::cell::RefCell;

use critical_section::Mutex;
use esp_hal::prelude::*;
use esp_hal::timer::{timg::TimerGroup, AnyTimer, Error, PeriodicTimer};
use opl2_bridge::config::TICK_PERIOD_US;
use opl2_bridge::TimeBase;

/// Tick counter and sleep countdown, shared with the main loop
pub static TIME_BASE: TimeBase = TimeBase::new();

static TICKER: Mutex<RefCell<Option<PeriodicTimer<'static, AnyTimer>>>> = Mutex::new(RefCell::new(None));

#[handler]
fn on_tick() {
    critical_section::with(|cs| {
        if let Some(timer) = TICKER.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    TIME_BASE.on_interrupt();
}

/// Start the periodic interrupt. Call once, before interrupts matter.
///
/// Without a running time base the first queued sleep would never expire,
/// so callers treat an error here as fatal.
pub fn init(timg0: esp_hal::peripherals::TIMG0) -> Result<(), Error> {
    let group = TimerGroup::new(timg0);
    let mut timer = PeriodicTimer::new(AnyTimer::from(group.timer0));

    timer.set_interrupt_handler(on_tick);
    timer.enable_interrupt(true);

    // started and parked together so the handler always finds the timer
    critical_section::with(|cs| -> Result<(), Error> {
        timer.start(TICK_PERIOD_US.micros())?;
        TICKER.borrow_ref_mut(cs).replace(timer);
        Ok(())
    })?;

    log::info!("ticker: {} us period", TICK_PERIOD_US);
    Ok(())
}
