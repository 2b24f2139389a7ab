//! Command Scheduler
//! =================
//!
//! Owns the operation queue and runs the three steps of every main loop pass:
//!
//! 1. `poll_events` - serve at most one host packet (RESET / WRITE / QUERY)
//! 2. `process_status` - mirror queue-empty onto the status line
//! 3. `process_commands` - if the sleep gate is open, execute one record
//!
//! Host packets are answered synchronously. Queue records run later, one per
//! pass, so a slow chip write never stalls the link for more than a record.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};

use crate::config::QUEUE_SIZE;
use crate::ingest;
use crate::opl2::{drive, SoundChip};
use crate::protocol::{Command, Opcode, Status};
use crate::queue::RingBuffer;
use crate::timebase::TimeBase;
use crate::transport::Transport;

pub struct Scheduler<'a, T, C, S, const N: usize = QUEUE_SIZE> {
    queue: RingBuffer<N>,
    link: T,
    chip: C,
    status: S,
    time: &'a TimeBase,
}

impl<'a, T, C, S, const N: usize> Scheduler<'a, T, C, S, N>
where
    T: Transport,
    C: SoundChip,
    S: OutputPin<Error = Infallible>,
{
    /// The chip is expected to be reset already. The status line starts high.
    pub fn new(link: T, chip: C, mut status: S, time: &'a TimeBase) -> Self {
        drive(&mut status, PinState::High);
        Self {
            queue: RingBuffer::new(),
            link,
            chip,
            status,
            time,
        }
    }

    /// One main loop pass
    pub fn poll(&mut self) {
        self.poll_events();
        self.process_status();
        self.process_commands();
    }

    pub fn queue(&self) -> &RingBuffer<N> {
        &self.queue
    }

    pub fn link(&self) -> &T {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut T {
        &mut self.link
    }

    pub fn chip(&self) -> &C {
        &self.chip
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    fn reply(&mut self, status: Status) {
        self.link.write_byte(status.into());
        self.link.flush();
    }

    /// Drop everything queued, reopen the gate and reset the chip
    fn close(&mut self) {
        self.queue.clear();
        self.time.cancel();
        self.chip.reset();
        self.reply(Status::Ok);
    }

    // ========================================================================
    // HOST PACKETS
    // ========================================================================

    /// Serve one host packet if a byte is waiting
    pub fn poll_events(&mut self) {
        if !self.link.has_data() {
            return;
        }

        let code = self.link.read_byte();
        let len = u16::from(self.link.read_byte());

        match Command::try_from(code) {
            Ok(Command::Reset) => {
                log::info!("host: reset");
                self.close();
            }
            Ok(Command::Write) => {
                let res = ingest::receive(&mut self.queue, &mut self.link, len);
                if let Err(err) = res {
                    log::warn!("host: write of {} bytes rejected: {}", len, err);
                }
                self.reply(res.into());
            }
            Ok(Command::Query) => {
                self.link.write_byte(Status::Ok.into());
                self.link.write_word(N as u16);
                self.link.write_word(self.queue.len() as u16);
                self.link.flush();
            }
            Err(err) => {
                log::warn!("host: command {:#04x}: {}", code, err);
                self.reply(err.into());
            }
        }
    }

    // ========================================================================
    // STATUS LINE
    // ========================================================================

    /// High while the queue is empty (host is not keeping up)
    pub fn process_status(&mut self) {
        let state = PinState::from(self.queue.is_empty());
        drive(&mut self.status, state);
    }

    // ========================================================================
    // QUEUE CONSUMER
    // ========================================================================

    /// Execute one queued record unless the queue is empty or a sleep is pending
    pub fn process_commands(&mut self) {
        if self.queue.is_empty() || !self.time.is_gate_open() {
            return;
        }

        let byte = self.queue.remove();
        match Opcode::try_from(byte) {
            Ok(Opcode::Sleep) => {
                let lo = self.queue.remove();
                let hi = self.queue.remove();
                let ms = u16::from_le_bytes([lo, hi]);
                log::debug!("queue: sleep {} ms at tick {}", ms, self.time.ticks());
                self.time.set_countdown(ms);
            }
            Ok(Opcode::Write) => {
                let reg = self.queue.remove();
                let value = self.queue.remove();
                log::debug!("queue: write {:#04x} = {:#04x}", reg, value);
                self.chip.write(reg, value);
            }
            Ok(Opcode::Close) => {
                log::info!("queue: close");
                self.close();
            }
            // only ingest writes the queue and it only appends whole records
            Err(_) => log::warn!("queue: stray byte {:#04x}", byte),
        }
    }
}
