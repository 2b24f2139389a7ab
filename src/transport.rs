//! Byte transport to the host

/// Duplex byte link. Reads and writes block on a byte boundary.
pub trait Transport {
    /// True if `read_byte` would return without blocking
    fn has_data(&mut self) -> bool;

    fn read_byte(&mut self) -> u8;

    fn write_byte(&mut self, value: u8);

    /// Little-endian
    fn write_word(&mut self, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(lo);
        self.write_byte(hi);
    }

    /// Push any buffered reply bytes out to the host
    fn flush(&mut self) {}
}
