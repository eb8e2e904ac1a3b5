use std::collections::BTreeSet;

use super::{fragment::StatementFragment, value_objects::ConceptId};

/// Read-only view of the reasoner output and of previously persisted state.
///
/// A snapshot is loaded once per classification run and queried from the
/// generator without any I/O. Implementations must be cheap to query
/// repeatedly; the comparison core asks for ancestors many times per concept.
pub trait TaxonomySnapshot {
    /// Returns every concept taking part in the run.
    fn concept_ids(&self) -> Vec<ConceptId>;

    /// Returns the inferred ancestors of `concept`, optionally including itself.
    fn inferred_ancestors(&self, concept: ConceptId, include_self: bool) -> BTreeSet<ConceptId>;

    /// Returns the direct inferred parents of `concept`.
    fn direct_parents(&self, concept: ConceptId) -> BTreeSet<ConceptId>;

    /// Returns whether the direct subtypes of `concept` cover every case.
    fn is_exhaustive(&self, concept: ConceptId) -> bool;

    /// Returns the stated relationships of `concept`, `IS A` excluded.
    fn stated_non_isa_relationships(&self, concept: ConceptId) -> Vec<StatementFragment>;

    /// Returns the inferred relationships persisted by the previous run.
    ///
    /// Both hierarchical and non-hierarchical relationships are returned.
    fn existing_inferred_relationships(&self, concept: ConceptId) -> Vec<StatementFragment>;

    /// Returns `true` if `candidate` is `concept` or one of its ancestors.
    fn closure_contains(&self, concept: ConceptId, candidate: ConceptId) -> bool {
        concept == candidate || self.is_strict_ancestor(concept, candidate)
    }

    /// Returns `true` if `candidate` is a proper ancestor of `concept`.
    fn is_strict_ancestor(&self, concept: ConceptId, candidate: ConceptId) -> bool {
        self.inferred_ancestors(concept, false).contains(&candidate)
    }

    /// Returns the proper descendants of `concept` among [`Self::concept_ids`].
    fn descendants(&self, concept: ConceptId) -> BTreeSet<ConceptId> {
        self.concept_ids()
            .into_iter()
            .filter(|candidate| self.is_strict_ancestor(*candidate, concept))
            .collect()
    }

    /// Returns `true` if the two concepts have a proper ancestor in common that
    /// is exhaustive.
    fn has_common_exhaustive_ancestor(&self, left: ConceptId, right: ConceptId) -> bool {
        let right_ancestors = self.inferred_ancestors(right, false);
        self.inferred_ancestors(left, false)
            .intersection(&right_ancestors)
            .any(|ancestor| self.is_exhaustive(*ancestor))
    }
}
