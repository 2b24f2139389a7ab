//! Serial-to-OPL2 bridge
//! =====================
//!
//! Hardware-independent core of the bridge firmware. A host streams register
//! writes and rests over a serial link; they land in a fixed-size queue and
//! are replayed onto the YM3812 bus at the pace set by the rests, driven by a
//! 1 ms timer interrupt.
//!
//! The firmware binary (`main.rs`) supplies the board pieces: the USB serial
//! transport, GPIO pins, the data bus and the timer interrupt.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod opl2;
pub mod protocol;
pub mod queue;
pub mod scheduler;
pub mod timebase;
pub mod transport;

pub use error::IngestError;
pub use opl2::{DataBus, Opl2, SoundChip};
pub use scheduler::Scheduler;
pub use timebase::TimeBase;
pub use transport::Transport;
