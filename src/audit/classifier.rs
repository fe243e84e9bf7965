//! Change classification
//!
//! Narrows a batch of pending mutations down to the ones that must be
//! audited. Pure: no I/O, input order preserved.

use super::entry::Action;
use super::registry::{Capability, CapabilityRegistry};
use super::value::FieldSnapshot;

/// One pending mutation as reported by the persistence layer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub entity_type: String,
    pub action: Action,
    /// Values before the mutation (type defaults for a creation)
    pub original: FieldSnapshot,
    /// Values after the mutation
    pub current: FieldSnapshot,
}

/// A mutation that passed classification, paired with its capability
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedMutation<'a> {
    pub mutation: &'a PendingMutation,
    pub capability: &'a Capability,
}

/// Keep the mutations whose type is auditable and not overridden
///
/// Types absent from the registry are dropped silently.
pub fn classify<'a>(
    registry: &'a CapabilityRegistry,
    batch: &'a [PendingMutation],
) -> Vec<ClassifiedMutation<'a>> {
    batch
        .iter()
        .filter_map(|mutation| {
            registry
                .capability(&mutation.entity_type)
                .filter(|capability| capability.is_audited())
                .map(|capability| ClassifiedMutation {
                    mutation,
                    capability,
                })
        })
        .collect()
}
