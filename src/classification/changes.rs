use std::collections::{BTreeMap, BTreeSet};

use crate::taxonomy::{ConceptId, FragmentKey, StatementFragment};

/// Difference between the persisted and the freshly generated normal form of
/// one concept.
///
/// Fragments are matched on [`StatementFragment::content_key`], so a fragment
/// that only changed its statement identity or stated-pair flag is neither
/// added nor removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalFormChanges {
    pub added: Vec<StatementFragment>,
    pub removed: Vec<StatementFragment>,
}

impl NormalFormChanges {
    #[must_use]
    pub fn between(existing: &[StatementFragment], generated: &[StatementFragment]) -> Self {
        let existing_keys = keys(existing);
        let generated_keys = keys(generated);
        Self {
            added: generated
                .iter()
                .filter(|fragment| !existing_keys.contains(&fragment.content_key()))
                .cloned()
                .collect(),
            removed: existing
                .iter()
                .filter(|fragment| !generated_keys.contains(&fragment.content_key()))
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

fn keys(fragments: &[StatementFragment]) -> BTreeSet<FragmentKey> {
    fragments.iter().map(StatementFragment::content_key).collect()
}

/// Receives the changes computed for each concept during a run.
///
/// Called once per concept whose normal form differs from the persisted one,
/// in ancestor-first order.
pub trait ChangeProcessor {
    fn process(
        &mut self,
        concept: ConceptId,
        added: &[StatementFragment],
        removed: &[StatementFragment],
    );
}

/// Keeps every reported change in memory, keyed by concept.
#[derive(Debug, Default)]
pub struct RecordingChangeProcessor {
    changes: BTreeMap<ConceptId, NormalFormChanges>,
}

impl RecordingChangeProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded changes, leaving the processor empty.
    #[must_use]
    pub fn take(&mut self) -> BTreeMap<ConceptId, NormalFormChanges> {
        std::mem::take(&mut self.changes)
    }

    #[must_use]
    pub fn changes_for(&self, concept: ConceptId) -> Option<&NormalFormChanges> {
        self.changes.get(&concept)
    }

    #[must_use]
    pub fn changes(&self) -> &BTreeMap<ConceptId, NormalFormChanges> {
        &self.changes
    }
}

impl ChangeProcessor for RecordingChangeProcessor {
    fn process(
        &mut self,
        concept: ConceptId,
        added: &[StatementFragment],
        removed: &[StatementFragment],
    ) {
        self.changes.insert(
            concept,
            NormalFormChanges {
                added: added.to_vec(),
                removed: removed.to_vec(),
            },
        );
    }
}
