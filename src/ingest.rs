//! WRITE payload ingestion
//!
//! Copies whole records from the transport into the queue. Records are
//! validated before anything is appended, so the queue only ever holds
//! complete records even when a request is rejected halfway through.

use crate::error::IngestError;
use crate::protocol::Opcode;
use crate::queue::RingBuffer;
use crate::transport::Transport;

/// Read `len` bytes of records from `link` into `queue`.
///
/// On overflow nothing is read: the payload stays on the link and the host
/// is expected to drop the packet. On an invalid record, the records before
/// it stay queued and the rest of the payload is left unread.
pub fn receive<T: Transport, const N: usize>(
    queue: &mut RingBuffer<N>,
    link: &mut T,
    len: u16,
) -> Result<(), IngestError> {
    if usize::from(len) > queue.free() {
        log::warn!("ingest: {} bytes requested, {} free", len, queue.free());
        return Err(IngestError::Overflow);
    }

    let mut remaining = len;
    while remaining > 0 {
        let byte = link.read_byte();
        let op = Opcode::try_from(byte).map_err(|err| {
            log::warn!("ingest: unknown opcode {:#04x}", byte);
            err
        })?;

        // the opcode byte is consumed; what is left must cover the operands
        let left = remaining - 1;
        let Some(rest) = left.checked_sub(op.operand_len()) else {
            log::warn!("ingest: {:?} truncated, {} of {} operand bytes", op, left, op.operand_len());
            return Err(IngestError::Invalid);
        };

        queue.append(op as u8);
        for _ in 0..op.operand_len() {
            queue.append(link.read_byte());
        }
        remaining = rest;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    struct Script(VecDeque<u8>);

    impl Transport for Script {
        fn has_data(&mut self) -> bool {
            !self.0.is_empty()
        }

        fn read_byte(&mut self) -> u8 {
            self.0.pop_front().expect("read past end of script")
        }

        fn write_byte(&mut self, _value: u8) {}
    }

    fn script(bytes: &[u8]) -> Script {
        Script(bytes.iter().copied().collect())
    }

    fn drain<const N: usize>(q: &mut RingBuffer<N>) -> Vec<u8> {
        let mut out = Vec::new();
        while !q.is_empty() {
            out.push(q.remove());
        }
        out
    }

    #[test]
    fn copies_mixed_records() {
        let payload = [0xD1, 0x20, 0x01, 0xD0, 0x64, 0x00, 0xD2];
        let mut link = script(&payload);
        let mut q = RingBuffer::<32>::new();
        assert_eq!(receive(&mut q, &mut link, payload.len() as u16), Ok(()));
        assert_eq!(drain(&mut q), payload);
        assert!(link.0.is_empty());
    }

    #[test]
    fn zero_length_is_ok() {
        let mut link = script(&[]);
        let mut q = RingBuffer::<4>::new();
        assert_eq!(receive(&mut q, &mut link, 0), Ok(()));
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_reads_nothing() {
        let mut link = script(&[0xD1, 0x20, 0x01]);
        let mut q = RingBuffer::<4>::new();
        q.append(0xD2);
        q.append(0xD2);
        assert_eq!(receive(&mut q, &mut link, 3), Err(IngestError::Overflow));
        assert_eq!(q.len(), 2);
        assert_eq!(link.0.len(), 3);
    }

    #[test]
    fn unknown_opcode_keeps_earlier_records() {
        let mut link = script(&[0xD1, 0x40, 0x3F, 0x99, 0x00, 0x00]);
        let mut q = RingBuffer::<16>::new();
        assert_eq!(receive(&mut q, &mut link, 6), Err(IngestError::Invalid));
        assert_eq!(drain(&mut q), [0xD1, 0x40, 0x3F]);
        assert_eq!(link.0.len(), 2);
    }

    #[test]
    fn truncated_record_is_rejected() {
        // declares 3 bytes; the write after the close needs 3 but only 2 remain
        let mut link = script(&[0xD2, 0xD1, 0x20]);
        let mut q = RingBuffer::<16>::new();
        assert_eq!(receive(&mut q, &mut link, 3), Err(IngestError::Invalid));
        assert_eq!(drain(&mut q), [0xD2]);
        assert_eq!(link.0.len(), 1);
    }
}
