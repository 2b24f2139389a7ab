//! Host Wire Protocol
//! ==================
//!
//! Every host packet is `[command, len, payload...]`. Only WRITE carries a
//! payload; it is a run of queue records, each starting with an opcode byte:
//!
//! ```text
//!   0xD0 lo hi    Sleep for (hi << 8 | lo) milliseconds
//!   0xD1 reg val  Write one chip register
//!   0xD2          Close: clear the queue and reset the chip
//! ```
//!
//! Each reply starts with a single status byte.

use crate::error::IngestError;

/// Outer command sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Reset = 0xC0,
    Write = 0xC1,
    Query = 0xC2,
}

impl TryFrom<u8> for Command {
    type Error = IngestError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0xC0 => Ok(Command::Reset),
            0xC1 => Ok(Command::Write),
            0xC2 => Ok(Command::Query),
            _ => Err(IngestError::Invalid),
        }
    }
}

/// Queue record discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Sleep = 0xD0,
    Write = 0xD1,
    Close = 0xD2,
}

impl Opcode {
    /// Full record length on the wire, opcode byte included
    pub const fn record_len(self) -> u16 {
        match self {
            Opcode::Sleep => 3,
            Opcode::Write => 3,
            Opcode::Close => 1,
        }
    }

    /// Number of operand bytes following the opcode
    pub const fn operand_len(self) -> u16 {
        self.record_len() - 1
    }
}

impl TryFrom<u8> for Opcode {
    type Error = IngestError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0xD0 => Ok(Opcode::Sleep),
            0xD1 => Ok(Opcode::Write),
            0xD2 => Ok(Opcode::Close),
            _ => Err(IngestError::Invalid),
        }
    }
}

/// Status byte leading every reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0xE0,
    Invalid = 0xE1,
    Overflow = 0xE2,
}

impl From<Status> for u8 {
    fn from(status: Status) -> u8 {
        status as u8
    }
}

impl From<IngestError> for Status {
    fn from(err: IngestError) -> Status {
        match err {
            IngestError::Invalid => Status::Invalid,
            IngestError::Overflow => Status::Overflow,
        }
    }
}

impl From<Result<(), IngestError>> for Status {
    fn from(res: Result<(), IngestError>) -> Status {
        match res {
            Ok(()) => Status::Ok,
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_bytes_are_invalid() {
        assert_eq!(Command::try_from(0xC3), Err(IngestError::Invalid));
        assert_eq!(Opcode::try_from(0xD3), Err(IngestError::Invalid));
        assert_eq!(Opcode::try_from(0x00), Err(IngestError::Invalid));
    }

    #[test]
    fn record_lengths() {
        assert_eq!(Opcode::Sleep.record_len(), 3);
        assert_eq!(Opcode::Write.record_len(), 3);
        assert_eq!(Opcode::Close.record_len(), 1);
        assert_eq!(Opcode::Close.operand_len(), 0);
    }

    #[test]
    fn status_from_result() {
        assert_eq!(u8::from(Status::from(Ok(()))), 0xE0);
        assert_eq!(u8::from(Status::from(Err(IngestError::Invalid))), 0xE1);
        assert_eq!(u8::from(Status::from(Err(IngestError::Overflow))), 0xE2);
    }
}
