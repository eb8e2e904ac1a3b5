use std::sync::Arc;

use dashmap::DashMap;

use crate::taxonomy::{ConceptId, StatementFragment};

/// Non-hierarchical fragments computed for each concept during a run.
///
/// Entries are written once per concept and read by every direct child, so a
/// concept must be processed after all of its ancestors. The map is safe to
/// share between workers processing concepts of the same rank.
#[derive(Debug, Default)]
pub struct FragmentCache {
    entries: DashMap<ConceptId, Arc<[StatementFragment]>>,
}

impl FragmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fragments stored for `concept`.
    #[must_use]
    pub fn get(&self, concept: ConceptId) -> Option<Arc<[StatementFragment]>> {
        self.entries.get(&concept).map(|entry| Arc::clone(entry.value()))
    }

    /// Stores the fragments of `concept`; an existing entry is kept.
    ///
    /// Returns `true` when the entry was inserted.
    pub fn insert(&self, concept: ConceptId, fragments: Vec<StatementFragment>) -> bool {
        let mut inserted = false;
        self.entries.entry(concept).or_insert_with(|| {
            inserted = true;
            fragments.into()
        });
        inserted
    }

    /// Drops the entries of `concepts`. Callers must include descendants, whose
    /// entries were derived from the invalidated ones.
    pub fn invalidate<'a>(&self, concepts: impl IntoIterator<Item = &'a ConceptId>) {
        for concept in concepts {
            self.entries.remove(concept);
        }
    }

    #[must_use]
    pub fn contains(&self, concept: ConceptId) -> bool {
        self.entries.contains_key(&concept)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
