use std::collections::BTreeMap;
use std::io::{self, Read};

use crate::HandleId;

/// Blocking read primitive connecting the reader to the host's streams.
///
/// `Ok(0)` means the stream behind `handle` has no further data; an error
/// aborts the current segment request and may be retried by the caller.
pub trait StreamSource {
    fn read(&mut self, handle: HandleId, buf: &mut [u8]) -> io::Result<usize>;
}

/// A [`StreamSource`] over caller-registered readers.
///
/// Reading a handle with no registered stream fails with
/// [`io::ErrorKind::NotFound`], the same way `read(2)` on a closed
/// descriptor reports `EBADF` rather than a range violation.
pub struct StreamTable<R> {
    streams: BTreeMap<HandleId, R>,
}

impl<R: Read> StreamTable<R> {
    pub fn new() -> Self {
        Self {
            streams: BTreeMap::new(),
        }
    }

    /// Register `stream` under `handle`, returning the displaced stream
    /// if the handle was already taken.
    pub fn insert(&mut self, handle: HandleId, stream: R) -> Option<R> {
        self.streams.insert(handle, stream)
    }

    pub fn remove(&mut self, handle: HandleId) -> Option<R> {
        self.streams.remove(&handle)
    }
}

impl<R: Read> Default for StreamTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Read> StreamSource for StreamTable<R> {
    fn read(&mut self, handle: HandleId, buf: &mut [u8]) -> io::Result<usize> {
        match self.streams.get_mut(&handle) {
            Some(stream) => stream.read(buf),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no stream registered for handle {}", handle),
            )),
        }
    }
}
