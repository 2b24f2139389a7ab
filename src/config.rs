//! Board and Timing Configuration
//! ==============================
//!
//! Compile-time constants shared by the library and the firmware binary.
//! The chip-facing timings come from the YM3812 datasheet and must not be
//! shortened.

// ============================================================================
// QUEUE
// ============================================================================

/// Capacity of the operation queue in bytes (reported by QUERY)
pub const QUEUE_SIZE: usize = 1024;

// ============================================================================
// TIMING
// ============================================================================

/// Period of the time base interrupt in microseconds (1 tick = 1 ms)
pub const TICK_PERIOD_US: u64 = 1_000;

/// Hold time on each edge of the /WR strobe
pub const STROBE_HOLD_US: u32 = 10;

/// How long /IC is held low during a chip reset
pub const RESET_HOLD_MS: u32 = 1;

// ============================================================================
// PIN ASSIGNMENT
// ============================================================================

/// Highest GPIO number on the ESP32-C3
pub const MAX_GPIO: u8 = 21;

/// USB Serial/JTAG D- / D+ (host link)
pub const USB_PINS: [u8; 2] = [18, 19];

/// UART0 TX (log output)
pub const UART0_TX_PIN: u8 = 21;

/// Wired to the BOOT button (to GND) on XIAO-style boards
pub const BOOT_STRAP_PIN: u8 = 9;

/// GPIO assignment for the OPL2 bus and the under-run indicator.
///
/// GPIO18/19 carry the USB Serial/JTAG host link and GPIO21 is UART0 TX.
/// Logging never reads UART0, so its RX pin (GPIO20) is free for /WR.
/// The BOOT button shorts GPIO9 to GND, so only the status line may sit
/// there; it is driven open-drain and needs an external pull-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    /// D0..D7, least significant bit first
    pub data_pins: [u8; 8],
    pub a0_pin: u8,
    pub wr_pin: u8,
    pub ic_pin: u8,
    /// Open-drain, released (high) while the queue is empty
    pub status_pin: u8,
}

// position of the status pin in `BoardConfig::pins`
const STATUS_SLOT: usize = 11;

impl BoardConfig {
    pub const DEFAULT: BoardConfig = BoardConfig {
        data_pins: [0, 1, 2, 3, 4, 5, 6, 7],
        a0_pin: 8,
        wr_pin: 20,
        ic_pin: 10,
        status_pin: BOOT_STRAP_PIN,
    };

    /// D0..D7, A0, /WR, /IC, status
    pub const fn pins(&self) -> [u8; 12] {
        let d = self.data_pins;
        [d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7], self.a0_pin, self.wr_pin, self.ic_pin, self.status_pin]
    }

    /// Every pin exists, none is used twice, none collides with the host
    /// link or log output, and only the open-drain status line is on GPIO9.
    pub const fn is_valid(&self) -> bool {
        let pins = self.pins();
        let mut i = 0;
        while i < pins.len() {
            let pin = pins[i];
            if pin > MAX_GPIO || pin == USB_PINS[0] || pin == USB_PINS[1] || pin == UART0_TX_PIN {
                return false;
            }
            if pin == BOOT_STRAP_PIN && i != STATUS_SLOT {
                return false;
            }
            let mut j = i + 1;
            while j < pins.len() {
                if pins[j] == pin {
                    return false;
                }
                j += 1;
            }
            i += 1;
        }
        true
    }

    /// Mask of every pin this board drives
    pub fn output_mask(&self) -> u32 {
        self.pins().iter().fold(0, |mask, &pin| mask | (1 << pin))
    }
}

const _: () = assert!(BoardConfig::DEFAULT.is_valid(), "BoardConfig::DEFAULT has an invalid pin assignment");

impl Default for BoardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pins_do_not_overlap() {
        let cfg = BoardConfig::default();
        assert_eq!(cfg.output_mask().count_ones(), 12);
    }

    #[test]
    fn default_pins_avoid_usb_and_uart_tx() {
        let mask = BoardConfig::DEFAULT.output_mask();
        assert_eq!(mask & ((1 << 18) | (1 << 19) | (1 << 21)), 0);
    }

    #[test]
    fn boot_strap_pin_only_carries_status() {
        let cfg = BoardConfig::DEFAULT;
        assert_eq!(cfg.status_pin, BOOT_STRAP_PIN);
        assert_ne!(cfg.wr_pin, BOOT_STRAP_PIN);
        assert!(!cfg.data_pins.contains(&BOOT_STRAP_PIN));

        let wr_on_strap = BoardConfig { wr_pin: 9, status_pin: 20, ..cfg };
        assert!(!wr_on_strap.is_valid());
    }

    #[test]
    fn rejects_bad_assignments() {
        let cfg = BoardConfig::DEFAULT;
        assert!(cfg.is_valid());
        assert!(!BoardConfig { a0_pin: 22, ..cfg }.is_valid());
        assert!(!BoardConfig { ic_pin: 18, ..cfg }.is_valid());
        assert!(!BoardConfig { wr_pin: UART0_TX_PIN, ..cfg }.is_valid());
        // duplicate: A0 on D3
        assert!(!BoardConfig { a0_pin: 3, ..cfg }.is_valid());
    }
}
