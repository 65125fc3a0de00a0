//! A streaming, schema-free decoder for Garmin's Flexible and Interoperable
//! Data Transfer protocol.
//!
//! Freewheel turns a FIT byte stream into a sequence of [`DecodedMessage`]s:
//! the global message number plus the raw bytes of every field, keyed by
//! field number. Resolving those numbers to names and units is left to the
//! caller's own dictionary.
//!
//! Most users should construct a [`Decoder`] and call [`Decoder::start`],
//! which decodes on a background thread and streams messages back over a
//! bounded channel.
//!
//! ```
//! let file = std::fs::File::open("activity.fit")?;
//!
//! for message in freewheel::Decoder::new(file).start() {
//!     let message = message?;
//!     println!("{} {:?}", message.global, message.fields);
//! }
//! ```
//!
//! The pure building blocks (header classification, the field-definition
//! grammar, the local-definition table) live in [`sans`], and the parts that
//! read from a byte source live in [`avec`].

pub mod avec;
pub mod sans;

pub use avec::{
    Error, Options, Trailer,
    channel::{Decoder, Messages},
};
pub use sans::data::DecodedMessage;
