//! Incremental delimiter-terminated reading over many stream handles.
//!
//! Each handle keeps its own [`buffer::StreamBuffer`] with independent read
//! progress; [`SegmentReader`] pulls bytes from a host-supplied
//! [`StreamSource`] in fixed-size chunks and hands back one segment per call.

pub mod buffer;
pub mod errors;
pub mod reader;
pub mod source;

pub use errors::{Result, StreamLinesError};
pub use reader::{SegmentReader, Segments};
pub use source::{StreamSource, StreamTable};

/// Opaque small-integer identifier naming one underlying readable stream.
pub type HandleId = usize;

// Defaults; all of them can be overridden per reader
// through `SegmentReader::with_config`.

/// Bytes requested from the source per refill.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Number of handle identifiers accepted, i.e. valid handles
/// are `0..DEFAULT_MAX_HANDLES`.
pub const DEFAULT_MAX_HANDLES: usize = 1024;

/// Delimiter used by [`SegmentReader::next_line`].
pub const DEFAULT_DELIMITER: u8 = b'\n';
