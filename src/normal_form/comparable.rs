use std::hash::{Hash, Hasher};

use crate::taxonomy::{ConceptId, StatementFragment, TaxonomySnapshot};

/// Semantic ordering shared by fragments, union groups and groups.
///
/// `a.is_same_or_stronger_than(b)` holds when everything `b` states about a
/// concept already follows from `a`.
pub trait SameOrStrongerThan<T: ?Sized = Self> {
    fn is_same_or_stronger_than<S>(&self, other: &T, taxonomy: &S) -> bool
    where
        S: TaxonomySnapshot + ?Sized;
}

/// Semantic content of a fragment; identity and numbering excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticKey {
    pub type_id: ConceptId,
    pub destination_id: ConceptId,
    pub destination_negated: bool,
    pub universal: bool,
}

/// A non-hierarchical fragment taking part in redundancy elimination.
#[derive(Clone, Debug)]
pub struct RelationshipFragment {
    fragment: StatementFragment,
}

impl RelationshipFragment {
    #[must_use]
    pub fn new(fragment: StatementFragment) -> Self {
        Self { fragment }
    }

    #[must_use]
    pub fn fragment(&self) -> &StatementFragment {
        &self.fragment
    }

    #[must_use]
    pub fn into_fragment(self) -> StatementFragment {
        self.fragment
    }

    #[must_use]
    pub fn key(&self) -> SemanticKey {
        SemanticKey {
            type_id: self.fragment.type_id,
            destination_id: self.fragment.destination_id,
            destination_negated: self.fragment.destination_negated,
            universal: self.fragment.universal,
        }
    }

    fn type_id(&self) -> ConceptId {
        self.fragment.type_id
    }

    fn destination_id(&self) -> ConceptId {
        self.fragment.destination_id
    }

    fn is_negated(&self) -> bool {
        self.fragment.destination_negated
    }
}

impl PartialEq for RelationshipFragment {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RelationshipFragment {}

impl Hash for RelationshipFragment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl SameOrStrongerThan for RelationshipFragment {
    fn is_same_or_stronger_than<S>(&self, other: &Self, taxonomy: &S) -> bool
    where
        S: TaxonomySnapshot + ?Sized,
    {
        if self == other {
            return true;
        }

        if self.fragment.universal != other.fragment.universal {
            return false;
        }

        match (self.is_negated(), other.is_negated()) {
            // A more specific type and/or value is at least as strong as a more general one.
            (false, false) => {
                taxonomy.closure_contains(self.type_id(), other.type_id())
                    && taxonomy.closure_contains(self.destination_id(), other.destination_id())
            }
            // Excluding a value says as much as asserting one of its subtypes only when
            // exhaustiveness rules out any third alternative.
            (true, false) => {
                taxonomy.closure_contains(self.type_id(), other.type_id())
                    && (taxonomy.has_common_exhaustive_ancestor(
                        self.destination_id(),
                        other.destination_id(),
                    ) || taxonomy.is_exhaustive(other.destination_id()))
                    && taxonomy.is_strict_ancestor(other.destination_id(), self.destination_id())
            }
            // Contradicting combinations are removed by the reasoner beforehand.
            (false, true) => {
                taxonomy.closure_contains(self.type_id(), other.type_id())
                    && taxonomy.has_common_exhaustive_ancestor(
                        self.destination_id(),
                        other.destination_id(),
                    )
            }
            // Negating a broader predicate is stronger, so the direction flips.
            (true, true) => {
                taxonomy.closure_contains(other.type_id(), self.type_id())
                    && taxonomy.closure_contains(other.destination_id(), self.destination_id())
            }
        }
    }
}
