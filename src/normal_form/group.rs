use std::collections::BTreeMap;

use super::{
    comparable::{RelationshipFragment, SameOrStrongerThan, SemanticKey},
    redundancy::NonRedundantSet,
};
use crate::taxonomy::{StatementFragment, TaxonomySnapshot};

/// How numbers found on incoming fragments are treated when grouping them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Numbering {
    /// Keep the persisted numbers and skip redundancy checks; used for the
    /// relationships of the previous run, which act as numbering anchors.
    Preserve,
    /// Forget non-zero numbers and drop redundant union groups.
    Fresh,
}

/// Disjunction of fragments sharing a union-group number.
///
/// Equality is structural: two union groups are equal when they hold the same
/// multiset of fragments, whatever their numbers.
#[derive(Clone, Debug)]
pub struct UnionGroup {
    fragments: Vec<RelationshipFragment>,
    source_number: Option<u32>,
    canonical: Vec<SemanticKey>,
}

impl UnionGroup {
    #[must_use]
    pub fn new(fragments: Vec<RelationshipFragment>, source_number: Option<u32>) -> Self {
        let mut canonical: Vec<SemanticKey> = fragments.iter().map(RelationshipFragment::key).collect();
        canonical.sort_unstable();
        Self {
            fragments,
            source_number,
            canonical,
        }
    }

    #[must_use]
    pub fn fragments(&self) -> &[RelationshipFragment] {
        &self.fragments
    }

    /// Number carried over from the input, `None` when one must be assigned.
    #[must_use]
    pub fn source_number(&self) -> Option<u32> {
        self.source_number
    }
}

impl PartialEq for UnionGroup {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for UnionGroup {}

impl SameOrStrongerThan for UnionGroup {
    fn is_same_or_stronger_than<S>(&self, other: &Self, taxonomy: &S) -> bool
    where
        S: TaxonomySnapshot + ?Sized,
    {
        other.fragments.iter().all(|weaker| {
            self.fragments
                .iter()
                .any(|stronger| stronger.is_same_or_stronger_than(weaker, taxonomy))
        })
    }
}

/// Conjunction of union groups sharing a group number.
#[derive(Clone, Debug)]
pub struct Group {
    union_groups: Vec<UnionGroup>,
    source_number: Option<u32>,
    canonical: Vec<Vec<SemanticKey>>,
}

impl Group {
    #[must_use]
    pub fn new(union_groups: Vec<UnionGroup>, source_number: Option<u32>) -> Self {
        let mut canonical: Vec<Vec<SemanticKey>> = union_groups
            .iter()
            .map(|union_group| union_group.canonical.clone())
            .collect();
        canonical.sort_unstable();
        Self {
            union_groups,
            source_number,
            canonical,
        }
    }

    #[must_use]
    pub fn union_groups(&self) -> &[UnionGroup] {
        &self.union_groups
    }

    #[must_use]
    pub fn source_number(&self) -> Option<u32> {
        self.source_number
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Group {}

impl SameOrStrongerThan for Group {
    fn is_same_or_stronger_than<S>(&self, other: &Self, taxonomy: &S) -> bool
    where
        S: TaxonomySnapshot + ?Sized,
    {
        other.union_groups.iter().all(|weaker| {
            self.union_groups
                .iter()
                .any(|stronger| stronger.is_same_or_stronger_than(weaker, taxonomy))
        })
    }
}

/// Splits flat fragments into groups.
///
/// Fragments in group 0 become one singleton group per union group; every
/// other group number yields one group. The same rule applies one level down
/// to union-group numbers. Groups come out ordered by group number, group 0
/// first.
pub fn to_groups<S>(
    fragments: impl IntoIterator<Item = StatementFragment>,
    numbering: Numbering,
    taxonomy: &S,
) -> Vec<Group>
where
    S: TaxonomySnapshot + ?Sized,
{
    let mut by_group: BTreeMap<u32, Vec<StatementFragment>> = BTreeMap::new();
    for fragment in fragments {
        by_group.entry(fragment.group).or_default().push(fragment);
    }

    let mut groups = Vec::new();
    for (group_number, members) in by_group {
        let union_groups = to_union_groups(members, numbering, taxonomy);
        if group_number == 0 {
            groups.extend(
                union_groups
                    .into_iter()
                    .map(|union_group| Group::new(vec![union_group], Some(0))),
            );
        } else {
            let source_number = match numbering {
                Numbering::Preserve => Some(group_number),
                Numbering::Fresh => None,
            };
            groups.push(Group::new(union_groups, source_number));
        }
    }
    groups
}

fn to_union_groups<S>(
    fragments: Vec<StatementFragment>,
    numbering: Numbering,
    taxonomy: &S,
) -> Vec<UnionGroup>
where
    S: TaxonomySnapshot + ?Sized,
{
    let mut by_union: BTreeMap<u32, Vec<StatementFragment>> = BTreeMap::new();
    for fragment in fragments {
        by_union.entry(fragment.union_group).or_default().push(fragment);
    }

    let mut union_groups = NonRedundantSet::new();
    for (union_number, members) in by_union {
        let candidates: Vec<UnionGroup> = if union_number == 0 {
            members
                .into_iter()
                .map(|fragment| UnionGroup::new(vec![RelationshipFragment::new(fragment)], Some(0)))
                .collect()
        } else {
            let source_number = match numbering {
                Numbering::Preserve => Some(union_number),
                Numbering::Fresh => None,
            };
            let disjuncts = members.into_iter().map(RelationshipFragment::new).collect();
            vec![UnionGroup::new(disjuncts, source_number)]
        };

        for candidate in candidates {
            match numbering {
                Numbering::Preserve => union_groups.add_unique(candidate),
                Numbering::Fresh => union_groups.add(candidate, taxonomy),
            };
        }
    }
    union_groups.into_vec()
}

#[cfg(test)]
mod tests {
    use super::{to_groups, Group, Numbering, UnionGroup};
    use crate::normal_form::comparable::{RelationshipFragment, SameOrStrongerThan};
    use crate::taxonomy::{ConceptId, InMemoryTaxonomy, StatementFragment};

    fn fragment(type_id: u64, destination: u64) -> StatementFragment {
        StatementFragment::new(ConceptId::new(type_id), ConceptId::new(destination))
    }

    fn union_group(fragments: &[(u64, u64)]) -> UnionGroup {
        UnionGroup::new(
            fragments
                .iter()
                .map(|(t, d)| RelationshipFragment::new(fragment(*t, *d)))
                .collect(),
            None,
        )
    }

    fn taxonomy() -> InMemoryTaxonomy {
        InMemoryTaxonomy::builder()
            .parent(21_u64, 20_u64)
            .parent(31_u64, 30_u64)
            .build()
            .expect("acyclic")
    }

    #[test]
    fn equality_is_order_independent() {
        let left = Group::new(vec![union_group(&[(1, 20)]), union_group(&[(2, 30)])], Some(1));
        let right = Group::new(vec![union_group(&[(2, 30)]), union_group(&[(1, 20)])], Some(2));
        assert_eq!(left, right);
        assert_ne!(left, Group::new(vec![union_group(&[(1, 20)])], Some(1)));
    }

    #[test]
    fn disjunctions_compare_member_by_member() {
        let taxonomy = taxonomy();
        let narrow = union_group(&[(1, 21)]);
        let wide = union_group(&[(1, 20), (1, 30)]);
        // Every disjunct of the weaker side needs its own stronger counterpart.
        assert!(!narrow.is_same_or_stronger_than(&wide, &taxonomy));
        assert!(!wide.is_same_or_stronger_than(&narrow, &taxonomy));

        let covering = union_group(&[(1, 21), (1, 31)]);
        assert!(covering.is_same_or_stronger_than(&wide, &taxonomy));
        assert!(!wide.is_same_or_stronger_than(&covering, &taxonomy));
    }

    #[test]
    fn larger_conjunction_is_stronger() {
        let taxonomy = taxonomy();
        let both = Group::new(vec![union_group(&[(1, 21)]), union_group(&[(2, 31)])], None);
        let one = Group::new(vec![union_group(&[(1, 20)])], None);
        assert!(both.is_same_or_stronger_than(&one, &taxonomy));
        assert!(!one.is_same_or_stronger_than(&both, &taxonomy));
    }

    #[test]
    fn zero_group_fragments_stay_separate() {
        let taxonomy = taxonomy();
        let groups = to_groups(
            vec![fragment(1, 20), fragment(2, 30)],
            Numbering::Fresh,
            &taxonomy,
        );
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|group| group.source_number() == Some(0)));
        assert!(groups.iter().all(|group| group.union_groups().len() == 1));
    }

    #[test]
    fn numbered_fragments_are_merged_per_number() {
        let taxonomy = taxonomy();
        let groups = to_groups(
            vec![
                fragment(1, 20).with_group(4),
                fragment(2, 30).with_group(4),
                fragment(3, 30).with_group(7).with_union_group(2),
                fragment(3, 31).with_group(7).with_union_group(2),
            ],
            Numbering::Preserve,
            &taxonomy,
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].source_number(), Some(4));
        assert_eq!(groups[0].union_groups().len(), 2);
        assert_eq!(groups[1].source_number(), Some(7));
        assert_eq!(groups[1].union_groups().len(), 1);
        assert_eq!(groups[1].union_groups()[0].source_number(), Some(2));
        assert_eq!(groups[1].union_groups()[0].fragments().len(), 2);
    }

    #[test]
    fn fresh_grouping_drops_redundant_union_groups() {
        let taxonomy = taxonomy();
        let groups = to_groups(
            vec![
                fragment(1, 20).with_group(1),
                fragment(1, 21).with_group(1),
            ],
            Numbering::Fresh,
            &taxonomy,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].source_number(), None);
        let union_groups = groups[0].union_groups();
        assert_eq!(union_groups.len(), 1);
        assert_eq!(union_groups[0].fragments()[0].fragment().destination_id, ConceptId::new(21));
    }
}
