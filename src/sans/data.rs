//! Data records and views over their raw field bytes.

use std::collections::BTreeMap;

use super::definition::MessageDefinition;

/// A decoded data record.
///
/// Field bytes are kept exactly as they appeared on the wire. Interpreting
/// them requires an external dictionary keyed by [`Self::global`] and the
/// field numbers; [`Self::value`] covers the common case of reading a single
/// base-type value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Global message number.
    pub global: u16,
    /// Architecture byte of the definition (0 for little-endian).
    pub architecture: u8,
    /// Local type identifier the record arrived on.
    pub local: u8,
    /// Raw bytes of each regular field, keyed by field number.
    pub fields: BTreeMap<u8, Vec<u8>>,
    /// Raw bytes of each developer field, keyed by developer data index and
    /// then field number.
    pub dev_fields: BTreeMap<u8, BTreeMap<u8, Vec<u8>>>,
}

impl DecodedMessage {
    /// Split a data record body laid out by `definition`.
    ///
    /// The body is expected to hold [`MessageDefinition::data_size`] bytes.
    /// Fields past the end of a shorter body are left short or empty, and
    /// extra bytes are ignored. A field number repeated within a definition
    /// keeps its last occurrence.
    pub fn from_body(local: u8, definition: &MessageDefinition, body: &[u8]) -> Self {
        let mut message = Self {
            global: definition.global,
            architecture: definition.architecture,
            local,
            ..Default::default()
        };

        let mut rest = body.iter().copied();

        for field in &definition.fields {
            let bytes = rest.by_ref().take(field.size as usize).collect();
            message.fields.insert(field.number, bytes);
        }

        for field in &definition.dev_fields {
            let bytes = rest.by_ref().take(field.size as usize).collect();
            message
                .dev_fields
                .entry(field.developer_index)
                .or_default()
                .insert(field.number, bytes);
        }

        message
    }

    pub fn is_little_endian(&self) -> bool {
        self.architecture == 0
    }

    /// Read the first element of a regular field as base type `T`.
    ///
    /// Returns `None` if the field is absent, too short, or holds the base
    /// type's 'invalid' marker value.
    pub fn value<T: BaseType>(&self, field: u8) -> Option<T::Into> {
        T::from(self.fields.get(&field)?, self.is_little_endian())
    }

    /// Read the first element of a developer field as base type `T`.
    pub fn dev_value<T: BaseType>(&self, index: u8, field: u8) -> Option<T::Into> {
        let bytes = self.dev_fields.get(&index)?.get(&field)?;
        T::from(bytes, self.is_little_endian())
    }
}

/// A FIT base type.
pub trait BaseType {
    /// The primitive corresponding to this base type.
    type Into;

    /// Convert the leading bytes of `r` to the corresponding primitive, if
    /// present and valid.
    fn from(r: &[u8], is_le: bool) -> Option<Self::Into>;
}

macro_rules! base_type {
    ($t:ident, $into:ident, $invalid:expr, $(#[$attr:meta])*) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $t;

        impl BaseType for $t {
            type Into = $into;

            fn from(r: &[u8], is_le: bool) -> Option<Self::Into> {
                let r = *r.first_chunk::<{ size_of::<$into>() }>()?;

                let x = if is_le {
                    $into::from_le_bytes(r)
                } else {
                    $into::from_be_bytes(r)
                };

                let is_invalid: fn($into) -> bool = $invalid;
                (!is_invalid(x)).then_some(x)
            }
        }
    };
}

base_type!(U8, u8, |x| x == u8::MAX, /** `uint8`, `enum`, `byte` */);
base_type!(U8Z, u8, |x| x == 0, /** `uint8z`, `string` */);
base_type!(U16, u16, |x| x == u16::MAX, /** `uint16` */);
base_type!(U16Z, u16, |x| x == 0, /** `uint16z` */);
base_type!(U32, u32, |x| x == u32::MAX, /** `uint32` */);
base_type!(U32Z, u32, |x| x == 0, /** `uint32z` */);
base_type!(U64, u64, |x| x == u64::MAX, /** `uint64` */);
base_type!(U64Z, u64, |x| x == 0, /** `uint64z` */);

base_type!(I8, i8, |x| x == i8::MAX, /** `sint8` */);
base_type!(I16, i16, |x| x == i16::MAX, /** `sint16` */);
base_type!(I32, i32, |x| x == i32::MAX, /** `sint32` */);
base_type!(I64, i64, |x| x == i64::MAX, /** `sint64` */);

base_type!(F32, f32, |x| x.to_bits() == u32::MAX, /** `float32` */);
base_type!(F64, f64, |x| x.to_bits() == u64::MAX, /** `float64` */);
