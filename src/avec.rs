//! Decoding from a byte source.
//!
//! [`channel::Decoder`] is the usual entry point: it runs the segment driver
//! on a background thread and streams messages back over a bounded channel.
//! [`reader::Reader`] is the same driver as a plain iterator, for callers who
//! would rather decode on their own thread.

use std::io;

use thiserror::Error;

use crate::sans::{
    definition::DefinitionError, header::SegmentHeaderError, table::UndefinedLocalType,
};

pub mod channel;
pub mod reader;

/// Errors ending a decode session.
///
/// Every error is terminal: once the byte position is lost there is no way
/// to find the next record boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte source ended or failed inside a segment header, or the header
    /// declares a length shorter than its fixed fields.
    #[error("Segment header ended early.")]
    TruncatedHeader(#[source] io::Error),
    /// The byte source ended or failed inside a record or trailer, or the
    /// records overran the length declared by the segment header.
    #[error("Record stream ended early.")]
    TruncatedStream(#[source] io::Error),
    /// A field definition block could not be parsed.
    #[error("Malformed definition: {0}")]
    MalformedDefinition(#[from] DefinitionError),
    /// A data record referenced a local type with no definition.
    #[error("Undefined local type {0}.")]
    UndefinedLocalType(u8),
    /// Found a compressed timestamp record header (not supported).
    #[error("Found unsupported compressed timestamp header ({0:#04x}).")]
    CompressedTimestamp(u8),
    /// Calculated and found CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    CyclicRedundancyCheck { found: u16, calculated: u16 },
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<SegmentHeaderError> for Error {
    fn from(err: SegmentHeaderError) -> Self {
        Self::TruncatedHeader(io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

impl From<UndefinedLocalType> for Error {
    fn from(UndefinedLocalType(local): UndefinedLocalType) -> Self {
        Self::UndefinedLocalType(local)
    }
}

/// What to do with the two-byte trailer closing each segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Trailer {
    /// Read and discard the trailer.
    #[default]
    Skip,
    /// Compare the trailer against a check value computed over the segment's
    /// header and records.
    Verify,
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub trailer: Trailer,
    /// Messages the channel holds before the decode thread blocks. Values
    /// below 1 are raised to 1.
    pub capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            trailer: Trailer::Skip,
            capacity: 1,
        }
    }
}
