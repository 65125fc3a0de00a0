//! Segment headers and record header classification.

use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::FromBytes;

/// Number of bytes every segment header begins with.
pub const FIXED_HEADER_SIZE: usize = 8;

/// An error decoding a segment header.
#[derive(Debug, Error)]
pub enum SegmentHeaderError {
    /// The declared header length cannot hold the fixed fields.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
}

#[repr(C)]
#[derive(FromBytes)]
struct FixedHeader {
    header_size: u8,
    protocol_version: u8,
    profile_version: [u8; 2],
    data_size: [u8; 4],
}

/// The fixed fields of a segment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Total header length in bytes, including any extension.
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Number of record bytes between the header and the trailer.
    pub data_size: u32,
}

impl SegmentHeader {
    /// Decode the fixed fields of a segment header.
    pub fn decode(r: [u8; FIXED_HEADER_SIZE]) -> Result<Self, SegmentHeaderError> {
        let FixedHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
        } = zerocopy::transmute!(r);

        if (header_size as usize) < FIXED_HEADER_SIZE {
            Err(SegmentHeaderError::UnknownHeaderLength(header_size))?;
        }

        Ok(Self {
            header_size,
            protocol_version,
            profile_version: u16::from_le_bytes(profile_version),
            data_size: u32::from_le_bytes(data_size),
        })
    }

    /// Number of header bytes following the fixed fields (the data type
    /// marker, and the header's own check value when present).
    pub fn extension_size(&self) -> usize {
        self.header_size as usize - FIXED_HEADER_SIZE
    }
}

bitfield! {
    struct HeaderByte(u8) {
        [0..4] local_type: u8,
        [5] is_developer,
        [6] is_definition,
        [7] is_compressed,
    }
}

/// A classified record header byte.
///
/// Classification is total: every byte value maps to some header. Whether a
/// header is acceptable is the segment driver's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// The record installs a definition rather than carrying data.
    pub is_definition: bool,
    /// The definition is followed by developer field descriptors. Always
    /// false for data records.
    pub has_developer_fields: bool,
    /// The byte uses the compressed timestamp layout, which this crate does
    /// not decode.
    pub is_compressed: bool,
    /// Local type identifier, from 0 to 15.
    pub local_type: u8,
}

impl RecordHeader {
    /// Classify a record header byte.
    pub fn classify(r: u8) -> Self {
        let header = HeaderByte(r);
        let is_definition = header.is_definition();

        Self {
            is_definition,
            has_developer_fields: is_definition && header.is_developer(),
            is_compressed: header.is_compressed(),
            local_type: header.local_type(),
        }
    }
}
