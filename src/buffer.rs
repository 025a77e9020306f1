use log::trace;
use memchr::memchr;

use crate::errors::Result;
use crate::source::StreamSource;
use crate::HandleId;

/// Retained read state for one stream handle.
///
/// Bytes `[0, filled)` of the store are valid unconsumed data; the region
/// between `filled` and the allocated capacity is scratch space for future
/// refills. `exhausted` flips to true once and never back.
pub struct StreamBuffer {
    store: Vec<u8>,
    exhausted: bool,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self {
            store: Vec::new(),
            exhausted: false,
        }
    }

    /// Number of valid unconsumed bytes held for this handle.
    pub fn filled(&self) -> usize {
        self.store.len()
    }

    /// True once the source has reported end-of-data for this handle.
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// Offset of the first `delimiter` within the unconsumed bytes.
    ///
    /// Scratch space is never inspected; embedded NUL bytes are data
    /// like any other.
    pub fn find(&self, delimiter: u8) -> Option<usize> {
        memchr(delimiter, &self.store)
    }

    /// Extract `store[0..=end]` as an owned segment and compact the rest
    /// of the buffer to the front.
    ///
    /// On allocation failure the buffer is left untouched, so the call
    /// may be retried.
    pub fn take_through(&mut self, end: usize) -> Result<Vec<u8>> {
        debug_assert!(end < self.store.len());

        let mut segment = Vec::new();
        segment.try_reserve_exact(end + 1)?;
        segment.extend_from_slice(&self.store[..=end]);

        // Shifts the residual to the front; capacity is kept.
        self.store.drain(..=end);
        Ok(segment)
    }

    /// Pull up to `chunk_size` more bytes from `source` into the buffer.
    ///
    /// A zero-byte read marks the handle exhausted. Read failures are
    /// surfaced without touching the unconsumed bytes or the exhaustion
    /// flag, so the state stays consistent for a retry. Short reads are
    /// normal; callers loop until a delimiter shows up or the source
    /// runs dry.
    pub fn refill<S: StreamSource>(
        &mut self,
        source: &mut S,
        handle: HandleId,
        chunk_size: usize,
    ) -> Result<usize> {
        self.ensure_spare(chunk_size)?;

        let filled = self.store.len();
        self.store.resize(filled + chunk_size, 0);
        match source.read(handle, &mut self.store[filled..]) {
            Ok(0) => {
                self.store.truncate(filled);
                self.exhausted = true;
                trace!("handle {}: source exhausted", handle);
                Ok(0)
            }
            Ok(read) => {
                self.store.truncate(filled + read);
                trace!("handle {}: refilled {} bytes", handle, read);
                Ok(read)
            }
            Err(err) => {
                self.store.truncate(filled);
                Err(err.into())
            }
        }
    }

    /// Guarantee at least `additional` bytes of scratch space.
    ///
    /// Capacity is doubled until the requirement is met, keeping the
    /// amortized reallocation cost constant per byte. On failure the
    /// buffer is left exactly as it was.
    fn ensure_spare(&mut self, additional: usize) -> Result<()> {
        if self.store.capacity() - self.store.len() >= additional {
            return Ok(());
        }

        let mut target = self.store.capacity().max(1);
        while target - self.store.len() < additional {
            target = target.saturating_mul(2);
        }
        self.store.try_reserve_exact(target - self.store.len())?;
        trace!("buffer grown to {} bytes", self.store.capacity());
        Ok(())
    }
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::new()
    }
}
