use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::value_objects::ConceptId;

/// A candidate relationship considered for a concept's normal form.
///
/// Fragments are produced by the generator and consumed by whatever records
/// the resulting changes. `group` and `union_group` use `0` for "ungrouped".
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementFragment {
    pub type_id: ConceptId,
    pub destination_id: ConceptId,
    #[serde(default)]
    pub destination_negated: bool,
    #[serde(default)]
    pub group: u32,
    #[serde(default)]
    pub union_group: u32,
    #[serde(default)]
    pub universal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_id: Option<u64>,
    #[serde(default)]
    pub has_stated_pair: bool,
}

impl StatementFragment {
    /// Creates an ungrouped, existential, positive fragment.
    #[must_use]
    pub fn new(type_id: ConceptId, destination_id: ConceptId) -> Self {
        Self {
            type_id,
            destination_id,
            destination_negated: false,
            group: 0,
            union_group: 0,
            universal: false,
            statement_id: None,
            has_stated_pair: false,
        }
    }

    /// Creates an `IS A` fragment pointing at `parent`.
    #[must_use]
    pub fn isa(parent: ConceptId) -> Self {
        Self::new(ConceptId::IS_A, parent)
    }

    #[must_use]
    pub fn with_group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }

    #[must_use]
    pub fn with_union_group(mut self, union_group: u32) -> Self {
        self.union_group = union_group;
        self
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.destination_negated = true;
        self
    }

    #[must_use]
    pub fn universal(mut self) -> Self {
        self.universal = true;
        self
    }

    #[must_use]
    pub fn with_statement_id(mut self, statement_id: u64) -> Self {
        self.statement_id = Some(statement_id);
        self
    }

    #[must_use]
    pub fn with_stated_pair(mut self, has_stated_pair: bool) -> Self {
        self.has_stated_pair = has_stated_pair;
        self
    }

    /// Returns `true` for hierarchical (`IS A`) fragments.
    #[must_use]
    pub fn is_isa(&self) -> bool {
        self.type_id == ConceptId::IS_A
    }

    /// Key used when comparing generated fragments with persisted ones.
    ///
    /// Statement identity and the stated-pair flag do not take part.
    #[must_use]
    pub fn content_key(&self) -> FragmentKey {
        FragmentKey {
            type_id: self.type_id,
            destination_id: self.destination_id,
            destination_negated: self.destination_negated,
            group: self.group,
            union_group: self.union_group,
            universal: self.universal,
        }
    }
}

/// Persisted content of a fragment, minus its identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentKey {
    pub type_id: ConceptId,
    pub destination_id: ConceptId,
    pub destination_negated: bool,
    pub group: u32,
    pub union_group: u32,
    pub universal: bool,
}

impl Display for StatementFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let quantifier = if self.universal { "all" } else { "some" };
        let negation = if self.destination_negated { "not " } else { "" };
        write!(
            f,
            "[{}:{}] {} {} {}{}",
            self.group, self.union_group, self.type_id, quantifier, negation, self.destination_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::StatementFragment;
    use crate::taxonomy::ConceptId;

    #[test]
    fn content_key_ignores_statement_identity() {
        let a = StatementFragment::new(ConceptId::new(10), ConceptId::new(20))
            .with_group(1)
            .with_statement_id(7);
        let b = StatementFragment::new(ConceptId::new(10), ConceptId::new(20))
            .with_group(1)
            .with_stated_pair(true);
        assert_ne!(a, b);
        assert_eq!(a.content_key(), b.content_key());
    }

    #[test]
    fn renders_group_numbers_and_polarity() {
        let fragment = StatementFragment::new(ConceptId::new(10), ConceptId::new(20))
            .with_group(2)
            .with_union_group(1)
            .negated()
            .universal();
        assert_eq!(fragment.to_string(), "[2:1] 10 all not 20");
        assert!(StatementFragment::isa(ConceptId::new(3)).is_isa());
    }
}
