//! Operation Queue
//! ===============
//!
//! Fixed-capacity circular byte buffer holding flattened queue records.
//!
//! The occupancy count is the only authority for empty/full: both indices
//! wrap modulo the capacity, so `read == write` means either state.
//!
//! `append` and `remove` do not check bounds. Callers check `free()` before
//! appending and `is_empty()` before removing; the indices stay in range
//! regardless, so a broken precondition corrupts queue contents, never memory.

pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
    read: usize,
    write: usize,
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> Self {
        assert!(N > 0 && N <= u16::MAX as usize, "capacity must fit the 16-bit QUERY reply");
        Self {
            buf: [0; N],
            len: 0,
            read: 0,
            write: 0,
        }
    }

    /// Drop all contents
    pub fn clear(&mut self) {
        self.len = 0;
        self.read = 0;
        self.write = 0;
    }

    /// Push one byte. Caller must have checked `free() > 0`.
    #[inline]
    pub fn append(&mut self, value: u8) {
        debug_assert!(self.len < N, "append on a full queue");
        self.len += 1;
        self.buf[self.write] = value;
        self.write = (self.write + 1) % N;
    }

    /// Pop one byte. Caller must have checked `!is_empty()`.
    #[inline]
    pub fn remove(&mut self) -> u8 {
        debug_assert!(self.len > 0, "remove on an empty queue");
        let value = self.buf[self.read];
        self.len -= 1;
        self.read = (self.read + 1) % N;
        value
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn free(&self) -> usize {
        N - self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
