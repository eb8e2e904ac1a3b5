use tracing::{debug, warn};

use super::{
    cache::FragmentCache,
    group::{to_groups, Group, Numbering},
    numbering::Assignment,
    redundancy::GroupSet,
};
use crate::{
    taxonomy::{ConceptId, StatementFragment, TaxonomySnapshot},
    Error, Result,
};

/// Produces the normal form of one concept at a time.
///
/// Concepts must be generated ancestor before descendant. Both operations read
/// the in-memory snapshot only.
pub trait NormalFormGenerator {
    /// Kind of fragment this generator emits.
    type Fragment;

    /// Computes the fragments that should be persisted for `concept`.
    fn generate(&self, concept: ConceptId) -> Result<Vec<Self::Fragment>>;

    /// Returns the fragments persisted for `concept` by the previous run.
    fn get_existing(&self, concept: ConceptId) -> Vec<Self::Fragment>;
}

/// Normal form generator for relationships, including `IS A`.
pub struct RelationshipNormalFormGenerator<'a, S: ?Sized> {
    taxonomy: &'a S,
    cache: FragmentCache,
    check_redundancy: bool,
}

impl<'a, S> RelationshipNormalFormGenerator<'a, S>
where
    S: TaxonomySnapshot + ?Sized,
{
    #[must_use]
    pub fn new(taxonomy: &'a S) -> Self {
        Self {
            taxonomy,
            cache: FragmentCache::new(),
            check_redundancy: false,
        }
    }

    /// Re-validates that no generated group implies another one after each
    /// concept, logging a warning otherwise.
    #[must_use]
    pub fn with_redundancy_check(mut self, enabled: bool) -> Self {
        self.check_redundancy = enabled;
        self
    }

    #[must_use]
    pub fn taxonomy(&self) -> &'a S {
        self.taxonomy
    }

    #[must_use]
    pub fn cache(&self) -> &FragmentCache {
        &self.cache
    }

    /// Forgets the cached results of `concepts`; see [`FragmentCache::invalidate`].
    pub fn invalidate<'c>(&self, concepts: impl IntoIterator<Item = &'c ConceptId>) {
        self.cache.invalidate(concepts);
    }

    fn inherited_groups(&self, concept: ConceptId, parent: ConceptId) -> Result<Vec<Group>> {
        let cached = self
            .cache
            .get(parent)
            .ok_or(Error::ParentNotProcessed { concept, parent })?;
        let fragments = cached
            .iter()
            .map(|fragment| fragment.clone().with_stated_pair(false));
        Ok(to_groups(fragments, Numbering::Fresh, self.taxonomy))
    }
}

impl<'a, S> NormalFormGenerator for RelationshipNormalFormGenerator<'a, S>
where
    S: TaxonomySnapshot + ?Sized,
{
    type Fragment = StatementFragment;

    fn generate(&self, concept: ConceptId) -> Result<Vec<StatementFragment>> {
        let parents = self.taxonomy.direct_parents(concept);

        let stated = self
            .taxonomy
            .stated_non_isa_relationships(concept)
            .into_iter()
            .filter(|fragment| !fragment.is_isa())
            .map(|fragment| fragment.with_stated_pair(true));
        let existing = self
            .taxonomy
            .existing_inferred_relationships(concept)
            .into_iter()
            .filter(|fragment| !fragment.is_isa());

        let mut previous = GroupSet::new();
        for group in to_groups(existing, Numbering::Preserve, self.taxonomy) {
            previous.add_unique(group);
        }

        let mut groups = GroupSet::new();
        groups.extend(to_groups(stated, Numbering::Fresh, self.taxonomy), self.taxonomy);
        for parent in &parents {
            groups.extend(self.inherited_groups(concept, *parent)?, self.taxonomy);
        }

        if self.check_redundancy && !groups.is_minimal(self.taxonomy) {
            warn!(concept = %concept, "normal_form_redundant_groups");
        }

        let assignment = Assignment::compute(&groups, &previous);
        let non_isa = flatten(&groups, &assignment);

        debug!(
            concept = %concept,
            parents = parents.len(),
            groups = groups.len(),
            fragments = non_isa.len(),
            "normal_form_generated"
        );

        let mut fragments: Vec<StatementFragment> = parents
            .iter()
            .map(|parent| StatementFragment::isa(*parent))
            .collect();
        fragments.extend(non_isa.iter().cloned());
        self.cache.insert(concept, non_isa);
        Ok(fragments)
    }

    fn get_existing(&self, concept: ConceptId) -> Vec<StatementFragment> {
        self.taxonomy.existing_inferred_relationships(concept)
    }
}

/// Writes assigned numbers back onto the grouped fragments.
fn flatten(groups: &GroupSet, assignment: &Assignment) -> Vec<StatementFragment> {
    let mut fragments = Vec::new();
    for (group_index, group) in groups.iter().enumerate() {
        for (union_index, union_group) in group.union_groups().iter().enumerate() {
            for member in union_group.fragments() {
                let mut fragment = member.fragment().clone();
                fragment.group = assignment.group(group_index);
                fragment.union_group = assignment.union_group(group_index, union_index);
                fragments.push(fragment);
            }
        }
    }
    fragments
}
