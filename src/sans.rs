//! Pure building blocks of the decoder.
//!
//! Nothing in this module touches a byte source. Each piece takes bytes that
//! have already been read and returns what they mean, so the segment driver in
//! [`crate::avec::reader`] only has to decide how many bytes to read next.
//!
//! # Architecture
//!
//! A FIT stream is one or more segments. Each segment is a header, a run of
//! records, and a two-byte trailer. Records are either definitions, which
//! install a byte layout under a 4-bit local type identifier, or data records,
//! which are laid out according to the most recent definition for their local
//! type.
//!
//! - [`header`] decodes segment headers and classifies record header bytes.
//! - [`definition`] implements the field-definition grammar. Decoding a
//!   definition record is a short sequence of state tokens, in the same way
//!   as the rest of the crate: [`definition::Definition`] may hand back a
//!   [`definition::DeveloperDefinition`] when more bytes are required.
//! - [`table`] holds the sixteen local-definition slots for one segment.
//! - [`data`] splits a data record body into a [`data::DecodedMessage`] and
//!   offers typed views over its raw bytes.
//! - [`check`] accumulates the trailer's cyclic redundancy check, for callers
//!   who opt into verification.

pub mod check;
pub mod data;
pub mod definition;
pub mod header;
pub mod table;
