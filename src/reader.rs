use std::collections::HashMap;

use log::trace;

use crate::buffer::StreamBuffer;
use crate::errors::{Result, StreamLinesError};
use crate::source::StreamSource;
use crate::{
    HandleId, DEFAULT_CHUNK_SIZE, DEFAULT_DELIMITER, DEFAULT_MAX_HANDLES,
};

/// Incremental segment reader over a set of stream handles.
///
/// One [`StreamBuffer`] is kept per handle, created lazily on the first
/// request and destroyed only by [`release`](Self::release) or
/// [`release_all`](Self::release_all). Concatenating the segments a handle
/// yields, in call order, reproduces the source bytes exactly: nothing is
/// lost, nothing is read twice.
///
/// Calls against different handles are independent; the one-caller-per-handle
/// contract is expressed through `&mut self`, so threaded hosts wrap the
/// reader in a mutex of their choosing.
pub struct SegmentReader<S> {
    source: S,
    chunk_size: usize,
    max_handles: usize,
    buffers: HashMap<HandleId, StreamBuffer>,
}

impl<S: StreamSource> SegmentReader<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_HANDLES)
    }

    /// Build a reader with an explicit refill chunk size and handle bound.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero, since a zero-byte refill can never
    /// make progress.
    pub fn with_config(
        source: S,
        chunk_size: usize,
        max_handles: usize,
    ) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            source,
            chunk_size,
            max_handles,
            buffers: HashMap::new(),
        }
    }

    /// Return the next `delimiter`-terminated segment from `handle`.
    ///
    /// The delimiter is included at the end of the segment; the final
    /// segment of a stream lacks it when the stream does not end on a
    /// delimiter. `Ok(None)` signals end of stream. After an error the
    /// handle's buffered bytes are intact and the same call may be
    /// retried.
    pub fn next_segment(
        &mut self,
        handle: HandleId,
        delimiter: u8,
    ) -> Result<Option<Vec<u8>>> {
        if handle >= self.max_handles {
            return Err(StreamLinesError::InvalidHandle(
                handle,
                self.max_handles,
            ));
        }

        let buffer = self
            .buffers
            .entry(handle)
            .or_insert_with(StreamBuffer::new);

        loop {
            if let Some(pos) = buffer.find(delimiter) {
                trace!("handle {}: delimiter at offset {}", handle, pos);
                return buffer.take_through(pos).map(Some);
            }
            if buffer.exhausted() {
                if buffer.filled() > 0 {
                    let end = buffer.filled() - 1;
                    return buffer.take_through(end).map(Some);
                }
                return Ok(None);
            }
            buffer.refill(&mut self.source, handle, self.chunk_size)?;
        }
    }

    /// Shorthand for [`next_segment`](Self::next_segment) with the
    /// newline delimiter.
    pub fn next_line(&mut self, handle: HandleId) -> Result<Option<Vec<u8>>> {
        self.next_segment(handle, DEFAULT_DELIMITER)
    }

    /// Drop the retained state of `handle`, discarding any buffered
    /// residual. Idempotent; unknown and out-of-range handles are ignored.
    pub fn release(&mut self, handle: HandleId) {
        if self.buffers.remove(&handle).is_some() {
            trace!("handle {}: state released", handle);
        }
    }

    /// Drop the retained state of every tracked handle.
    pub fn release_all(&mut self) {
        trace!("releasing {} tracked handles", self.buffers.len());
        self.buffers.clear();
    }

    /// Iterate the remaining segments of `handle`.
    pub fn segments(
        &mut self,
        handle: HandleId,
        delimiter: u8,
    ) -> Segments<'_, S> {
        Segments {
            reader: self,
            handle,
            delimiter,
            done: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Tear the reader down, recovering the host source.
    pub fn into_source(self) -> S {
        self.source
    }
}

/// Iterator over the remaining segments of one handle.
///
/// Ends after the stream is drained; an error is yielded once and the
/// iterator fuses.
pub struct Segments<'a, S> {
    reader: &'a mut SegmentReader<S>,
    handle: HandleId,
    delimiter: u8,
    done: bool,
}

impl<'a, S: StreamSource> Iterator for Segments<'a, S> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_segment(self.handle, self.delimiter) {
            Ok(Some(segment)) => Some(Ok(segment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
