//! Protocol errors reported back to the host as a status byte

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    /// Unknown command or opcode, or a record that does not fit the declared length
    Invalid,
    /// WRITE payload larger than the free queue space
    Overflow,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Invalid => f.write_str("invalid command"),
            IngestError::Overflow => f.write_str("queue overflow"),
        }
    }
}
