use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::{fragment::StatementFragment, snapshot::TaxonomySnapshot, value_objects::ConceptId};
use crate::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ConceptEntry {
    parents: BTreeSet<ConceptId>,
    exhaustive: bool,
    stated: Vec<StatementFragment>,
    existing: Vec<StatementFragment>,
}

/// Snapshot held entirely in memory, with ancestor closures computed up front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryTaxonomy {
    concepts: BTreeMap<ConceptId, ConceptEntry>,
    ancestors: BTreeMap<ConceptId, BTreeSet<ConceptId>>,
    children: BTreeMap<ConceptId, BTreeSet<ConceptId>>,
}

impl InMemoryTaxonomy {
    /// Starts building a taxonomy.
    #[must_use]
    pub fn builder() -> TaxonomyBuilder {
        TaxonomyBuilder::default()
    }

    /// Builds a taxonomy from a deserialized fixture.
    pub fn from_fixture(fixture: TaxonomyFixture) -> Result<Self> {
        let mut builder = Self::builder();
        for concept in fixture.concepts {
            builder = builder.concept(concept.id);
            for parent in concept.parents {
                builder = builder.parent(concept.id, parent);
            }
            if concept.exhaustive {
                builder = builder.exhaustive(concept.id);
            }
            for fragment in concept.stated {
                builder = builder.stated(concept.id, fragment);
            }
            for fragment in concept.existing {
                builder = builder.existing(concept.id, fragment);
            }
        }
        builder.build()
    }

    /// Parses a YAML fixture and builds the taxonomy it describes.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let fixture: TaxonomyFixture = serde_yaml::from_str(yaml)?;
        Self::from_fixture(fixture)
    }

    /// Parses a JSON fixture and builds the taxonomy it describes.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let fixture: TaxonomyFixture = serde_json::from_str(json)?;
        Self::from_fixture(fixture)
    }

    /// Returns a copy of this taxonomy whose persisted inferred relationships
    /// are replaced by `existing`; concepts missing from the map lose theirs.
    ///
    /// Used to feed the output of one run back in as the state of the next.
    #[must_use]
    pub fn with_existing(&self, existing: &BTreeMap<ConceptId, Vec<StatementFragment>>) -> Self {
        let mut next = self.clone();
        for (id, entry) in &mut next.concepts {
            entry.existing = existing.get(id).cloned().unwrap_or_default();
        }
        next
    }

    /// Returns the proper descendants of `concept`.
    #[must_use]
    pub fn descendants_of(&self, concept: ConceptId) -> BTreeSet<ConceptId> {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<ConceptId> = VecDeque::from([concept]);
        while let Some(current) = queue.pop_front() {
            if let Some(children) = self.children.get(&current) {
                for child in children {
                    if visited.insert(*child) {
                        queue.push_back(*child);
                    }
                }
            }
        }
        visited
    }

    /// Returns `true` if the concept is known to this taxonomy.
    #[must_use]
    pub fn contains(&self, concept: ConceptId) -> bool {
        self.concepts.contains_key(&concept)
    }

    /// Returns the number of concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

impl TaxonomySnapshot for InMemoryTaxonomy {
    fn concept_ids(&self) -> Vec<ConceptId> {
        self.concepts.keys().copied().collect()
    }

    fn inferred_ancestors(&self, concept: ConceptId, include_self: bool) -> BTreeSet<ConceptId> {
        let mut ancestors = self.ancestors.get(&concept).cloned().unwrap_or_default();
        if include_self {
            ancestors.insert(concept);
        }
        ancestors
    }

    fn direct_parents(&self, concept: ConceptId) -> BTreeSet<ConceptId> {
        self.concepts
            .get(&concept)
            .map(|entry| entry.parents.clone())
            .unwrap_or_default()
    }

    fn is_exhaustive(&self, concept: ConceptId) -> bool {
        self.concepts
            .get(&concept)
            .is_some_and(|entry| entry.exhaustive)
    }

    fn stated_non_isa_relationships(&self, concept: ConceptId) -> Vec<StatementFragment> {
        self.concepts
            .get(&concept)
            .map(|entry| entry.stated.clone())
            .unwrap_or_default()
    }

    fn existing_inferred_relationships(&self, concept: ConceptId) -> Vec<StatementFragment> {
        self.concepts
            .get(&concept)
            .map(|entry| entry.existing.clone())
            .unwrap_or_default()
    }

    fn is_strict_ancestor(&self, concept: ConceptId, candidate: ConceptId) -> bool {
        self.ancestors
            .get(&concept)
            .is_some_and(|ancestors| ancestors.contains(&candidate))
    }

    fn descendants(&self, concept: ConceptId) -> BTreeSet<ConceptId> {
        self.descendants_of(concept)
    }

    fn has_common_exhaustive_ancestor(&self, left: ConceptId, right: ConceptId) -> bool {
        let (Some(left), Some(right)) = (self.ancestors.get(&left), self.ancestors.get(&right))
        else {
            return false;
        };
        left.intersection(right)
            .any(|ancestor| self.is_exhaustive(*ancestor))
    }
}

/// Incrementally describes an [`InMemoryTaxonomy`].
#[derive(Clone, Debug, Default)]
pub struct TaxonomyBuilder {
    concepts: BTreeMap<ConceptId, ConceptEntry>,
}

impl TaxonomyBuilder {
    /// Registers a concept without any parent.
    #[must_use]
    pub fn concept(mut self, id: impl Into<ConceptId>) -> Self {
        self.concepts.entry(id.into()).or_default();
        self
    }

    /// Declares `parent` as a direct inferred parent of `child`.
    #[must_use]
    pub fn parent(mut self, child: impl Into<ConceptId>, parent: impl Into<ConceptId>) -> Self {
        let parent = parent.into();
        self.concepts.entry(parent).or_default();
        self.concepts
            .entry(child.into())
            .or_default()
            .parents
            .insert(parent);
        self
    }

    /// Marks a concept as exhaustive.
    #[must_use]
    pub fn exhaustive(mut self, id: impl Into<ConceptId>) -> Self {
        self.concepts.entry(id.into()).or_default().exhaustive = true;
        self
    }

    /// Adds a stated non-hierarchical relationship.
    #[must_use]
    pub fn stated(mut self, id: impl Into<ConceptId>, fragment: StatementFragment) -> Self {
        self.concepts
            .entry(id.into())
            .or_default()
            .stated
            .push(fragment);
        self
    }

    /// Adds a previously persisted inferred relationship.
    #[must_use]
    pub fn existing(mut self, id: impl Into<ConceptId>, fragment: StatementFragment) -> Self {
        self.concepts
            .entry(id.into())
            .or_default()
            .existing
            .push(fragment);
        self
    }

    /// Computes ancestor closures, rejecting cyclic hierarchies.
    pub fn build(self) -> Result<InMemoryTaxonomy> {
        let mut children: BTreeMap<ConceptId, BTreeSet<ConceptId>> = BTreeMap::new();
        let mut pending: BTreeMap<ConceptId, usize> = BTreeMap::new();
        for (id, entry) in &self.concepts {
            pending.insert(*id, entry.parents.len());
            for parent in &entry.parents {
                children.entry(*parent).or_default().insert(*id);
            }
        }

        let mut queue: VecDeque<ConceptId> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut ancestors: BTreeMap<ConceptId, BTreeSet<ConceptId>> = BTreeMap::new();

        while let Some(current) = queue.pop_front() {
            let mut closure = BTreeSet::new();
            if let Some(entry) = self.concepts.get(&current) {
                for parent in &entry.parents {
                    closure.insert(*parent);
                    if let Some(inherited) = ancestors.get(parent) {
                        closure.extend(inherited.iter().copied());
                    }
                }
            }
            ancestors.insert(current, closure);

            if let Some(next) = children.get(&current) {
                for child in next {
                    if let Some(count) = pending.get_mut(child) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(*child);
                        }
                    }
                }
            }
        }

        if ancestors.len() != self.concepts.len() {
            return Err(Error::CyclicTaxonomy {
                remaining: self.concepts.len() - ancestors.len(),
            });
        }

        Ok(InMemoryTaxonomy {
            concepts: self.concepts,
            ancestors,
            children,
        })
    }
}

/// Serializable description of a taxonomy, used for fixtures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyFixture {
    #[serde(default)]
    pub concepts: Vec<ConceptFixture>,
}

/// One concept of a [`TaxonomyFixture`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptFixture {
    pub id: ConceptId,
    #[serde(default)]
    pub parents: Vec<ConceptId>,
    #[serde(default)]
    pub exhaustive: bool,
    #[serde(default)]
    pub stated: Vec<StatementFragment>,
    #[serde(default)]
    pub existing: Vec<StatementFragment>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::InMemoryTaxonomy;
    use crate::taxonomy::{ConceptId, TaxonomySnapshot};
    use crate::Error;

    fn id(value: u64) -> ConceptId {
        ConceptId::new(value)
    }

    #[test]
    fn computes_transitive_ancestors() {
        let taxonomy = InMemoryTaxonomy::builder()
            .parent(2_u64, 1_u64)
            .parent(3_u64, 2_u64)
            .parent(4_u64, 1_u64)
            .build()
            .expect("acyclic");

        assert_eq!(
            taxonomy.inferred_ancestors(id(3), false),
            BTreeSet::from([id(1), id(2)])
        );
        assert_eq!(
            taxonomy.inferred_ancestors(id(3), true),
            BTreeSet::from([id(1), id(2), id(3)])
        );
        assert!(taxonomy.closure_contains(id(3), id(3)));
        assert!(taxonomy.is_strict_ancestor(id(3), id(1)));
        assert!(!taxonomy.is_strict_ancestor(id(1), id(3)));
        assert_eq!(taxonomy.descendants_of(id(1)), BTreeSet::from([id(2), id(3), id(4)]));
    }

    #[test]
    fn rejects_cycles() {
        let err = InMemoryTaxonomy::builder()
            .parent(1_u64, 2_u64)
            .parent(2_u64, 1_u64)
            .concept(3_u64)
            .build()
            .expect_err("cycle");
        assert!(matches!(err, Error::CyclicTaxonomy { remaining: 2 }));
    }

    #[test]
    fn finds_common_exhaustive_ancestors() {
        let taxonomy = InMemoryTaxonomy::builder()
            .parent(2_u64, 1_u64)
            .parent(3_u64, 1_u64)
            .parent(5_u64, 4_u64)
            .exhaustive(1_u64)
            .build()
            .expect("acyclic");

        assert!(taxonomy.has_common_exhaustive_ancestor(id(2), id(3)));
        assert!(!taxonomy.has_common_exhaustive_ancestor(id(2), id(5)));
        assert!(!taxonomy.has_common_exhaustive_ancestor(id(1), id(2)));
    }

    #[test]
    fn loads_yaml_fixtures() {
        let taxonomy = InMemoryTaxonomy::from_yaml_str(
            r"
concepts:
  - id: 1
  - id: 2
    parents: [1]
    exhaustive: true
    stated:
      - { type_id: 10, destination_id: 20, group: 1 }
",
        )
        .expect("fixture");

        assert_eq!(taxonomy.len(), 2);
        assert!(taxonomy.is_exhaustive(id(2)));
        let stated = taxonomy.stated_non_isa_relationships(id(2));
        assert_eq!(stated.len(), 1);
        assert_eq!(stated[0].group, 1);
        assert!(!stated[0].universal);
    }

    #[test]
    fn loads_json_fixtures() {
        let taxonomy = InMemoryTaxonomy::from_json_str(
            r#"{"concepts": [{"id": 1}, {"id": 2, "parents": [1]}]}"#,
        )
        .expect("fixture");
        assert_eq!(taxonomy.direct_parents(id(2)), BTreeSet::from([id(1)]));

        let err = InMemoryTaxonomy::from_json_str("{\"concepts\": 3}").expect_err("invalid");
        assert!(matches!(err, Error::Json(_)));
    }
}
