//! States processing definition records.
//!
//! A definition record body is a five-byte preamble (reserved byte,
//! architecture, global message number, field count) followed by a block of
//! three-byte field descriptors. When the record header carries the developer
//! flag, a developer field count and a second block of descriptors follow.

use either::Either::{self, Left, Right};
use thiserror::Error;
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Size in bytes of a single field descriptor.
pub const DESCRIPTOR_SIZE: usize = 3;

/// An error decoding a definition record.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A descriptor block ended part way through a descriptor.
    #[error("Field definition block of {len} bytes is not a multiple of 3.")]
    Malformed { len: usize },
}

/// Layout of one field of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field number, a key into an external dictionary.
    pub number: u8,
    /// Number of bytes the field occupies in each data record.
    pub size: u8,
    /// Base type code (low four bits of the type byte).
    pub base_type: u8,
    /// Endianness hint (bit 6 of the type byte).
    pub is_endian: bool,
    /// The type byte as it appeared on the wire.
    pub type_byte: u8,
}

/// Layout of one developer field of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevFieldSpec {
    pub number: u8,
    pub size: u8,
    /// Developer data index naming the description message for this field.
    pub developer_index: u8,
}

/// A complete message definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDefinition {
    /// 0 for little-endian fields, anything else for big-endian.
    pub architecture: u8,
    /// Global message number.
    pub global: u16,
    /// Regular fields, in wire order.
    pub fields: Vec<FieldSpec>,
    /// Developer fields, in wire order, following the regular fields.
    pub dev_fields: Vec<DevFieldSpec>,
}

impl MessageDefinition {
    pub fn is_little_endian(&self) -> bool {
        self.architecture == 0
    }

    /// Number of bytes in a data record body laid out by this definition.
    pub fn data_size(&self) -> usize {
        let regular = self.fields.iter().map(|f| f.size as usize);
        let developer = self.dev_fields.iter().map(|f| f.size as usize);
        regular.chain(developer).sum()
    }
}

#[repr(C)]
#[derive(Debug, FromBytes, KnownLayout, Immutable)]
struct Descriptor {
    number: u8,
    size: u8,
    extra: u8,
}

fn descriptors(r: &[u8]) -> Result<&[Descriptor], DefinitionError> {
    <[Descriptor]>::ref_from_bytes(r).map_err(|_| DefinitionError::Malformed { len: r.len() })
}

/// Parse a block of regular field descriptors.
pub fn parse_fields(r: &[u8]) -> Result<Vec<FieldSpec>, DefinitionError> {
    let fields = descriptors(r)?
        .iter()
        .map(|d| FieldSpec {
            number: d.number,
            size: d.size,
            base_type: d.extra & 0x0F,
            is_endian: d.extra & 0x40 != 0,
            type_byte: d.extra,
        })
        .collect();

    Ok(fields)
}

/// Parse a block of developer field descriptors.
pub fn parse_dev_fields(r: &[u8]) -> Result<Vec<DevFieldSpec>, DefinitionError> {
    let fields = descriptors(r)?
        .iter()
        .map(|d| DevFieldSpec {
            number: d.number,
            size: d.size,
            developer_index: d.extra,
        })
        .collect();

    Ok(fields)
}

#[repr(C)]
#[derive(Debug, FromBytes)]
struct DefinitionMessage {
    _reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    field_count: u8,
}

/// State token to decode a definition record.
#[derive(Debug)]
pub struct Definition {
    architecture: u8,
    global: u16,
    field_count: u8,
}

impl Definition {
    /// Decode the preamble of a definition record.
    pub fn decode(r: [u8; 5]) -> Self {
        let DefinitionMessage {
            architecture,
            global_message,
            field_count,
            ..
        } = zerocopy::transmute!(r);

        let global = if architecture == 0 {
            u16::from_le_bytes(global_message)
        } else {
            u16::from_be_bytes(global_message)
        };

        Self {
            architecture,
            global,
            field_count,
        }
    }

    /// Number of bytes in the regular field descriptor block.
    pub fn block_size(&self) -> usize {
        self.field_count as usize * DESCRIPTOR_SIZE
    }

    /// Transition to another state by decoding the regular field descriptor
    /// block.
    ///
    /// Returns a developer state token if `has_developer_fields` is set, or
    /// the finished definition otherwise.
    pub fn advance(
        self,
        r: &[u8],
        has_developer_fields: bool,
    ) -> Result<Either<DeveloperDefinition, MessageDefinition>, DefinitionError> {
        let definition = MessageDefinition {
            architecture: self.architecture,
            global: self.global,
            fields: parse_fields(r)?,
            dev_fields: Vec::new(),
        };

        Ok(if has_developer_fields {
            Left(DeveloperDefinition(definition))
        } else {
            Right(definition)
        })
    }
}

/// State token to decode the developer descriptors of a definition record.
#[derive(Debug)]
pub struct DeveloperDefinition(MessageDefinition);

impl DeveloperDefinition {
    /// Number of bytes in a developer descriptor block of `count` fields.
    pub fn block_size(count: u8) -> usize {
        count as usize * DESCRIPTOR_SIZE
    }

    /// Transition to the finished definition by decoding the developer field
    /// descriptor block.
    pub fn advance(self, r: &[u8]) -> Result<MessageDefinition, DefinitionError> {
        let Self(mut definition) = self;
        definition.dev_fields = parse_dev_fields(r)?;
        Ok(definition)
    }
}
