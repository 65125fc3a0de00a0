//! Local-definition table.

use thiserror::Error;

use super::definition::MessageDefinition;

/// Number of local type identifiers.
pub const LOCAL_TYPES: usize = 16;

/// A data record referenced a local type with no definition in this segment.
#[derive(Debug, Error)]
#[error("Local type {0} has no definition in this segment.")]
pub struct UndefinedLocalType(pub u8);

/// The most recent definition for each local type identifier.
///
/// A table belongs to exactly one segment; the segment driver resets it when
/// the next segment begins.
#[derive(Debug, Default)]
pub struct DefinitionTable {
    slots: [Option<MessageDefinition>; LOCAL_TYPES],
}

impl DefinitionTable {
    /// Install a definition, replacing any earlier one for the same local type.
    pub fn define(&mut self, local: u8, definition: MessageDefinition) {
        self.slots[slot(local)] = Some(definition);
    }

    /// Look up the definition for a local type.
    pub fn resolve(&self, local: u8) -> Result<&MessageDefinition, UndefinedLocalType> {
        self.slots[slot(local)]
            .as_ref()
            .ok_or(UndefinedLocalType(local))
    }

    /// Forget every definition.
    pub fn reset(&mut self) {
        self.slots = Default::default();
    }
}

fn slot(local: u8) -> usize {
    (local as usize) % LOCAL_TYPES
}
