use std::collections::BTreeMap;

use normal_form::{
    normal_form::{RelationshipFragment, SameOrStrongerThan},
    taxonomy::{ConceptId, InMemoryTaxonomy, StatementFragment},
    NormalFormGenerator, RelationshipNormalFormGenerator,
};
use rstest::rstest;

fn id(value: u64) -> ConceptId {
    ConceptId::new(value)
}

fn fragment(type_id: u64, destination_id: u64) -> StatementFragment {
    StatementFragment::new(id(type_id), id(destination_id))
}

fn groups_by_type(fragments: &[StatementFragment]) -> BTreeMap<u64, u32> {
    fragments
        .iter()
        .filter(|fragment| !fragment.is_isa())
        .map(|fragment| (fragment.type_id.get(), fragment.group))
        .collect()
}

#[test]
fn identical_inherited_group_is_not_doubled() {
    let taxonomy = InMemoryTaxonomy::builder()
        .parent(200_u64, 100_u64)
        .stated(100_u64, fragment(10, 20).with_group(1))
        .stated(200_u64, fragment(10, 20).with_group(1))
        .stated(200_u64, fragment(30, 40))
        .build()
        .expect("acyclic");
    let generator = RelationshipNormalFormGenerator::new(&taxonomy);

    generator.generate(id(100)).expect("parent");
    let fragments = generator.generate(id(200)).expect("child");

    assert_eq!(
        fragments.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "[0:0] 116680003 some 100",
            "[0:0] 30 some 40",
            "[1:0] 10 some 20",
        ]
    );
    assert!(fragments[1..].iter().all(|fragment| fragment.has_stated_pair));
}

#[test]
fn more_specific_stated_relationship_replaces_inherited_one() {
    let taxonomy = InMemoryTaxonomy::builder()
        .parent(11_u64, 10_u64)
        .parent(21_u64, 20_u64)
        .parent(200_u64, 100_u64)
        .stated(100_u64, fragment(10, 20))
        .stated(200_u64, fragment(11, 21))
        .build()
        .expect("acyclic");
    let generator = RelationshipNormalFormGenerator::new(&taxonomy);

    let parent = generator.generate(id(100)).expect("parent");
    let child = generator.generate(id(200)).expect("child");

    assert_eq!(child.len(), 2);
    assert_eq!(child[1].content_key(), fragment(11, 21).content_key());

    let stronger = RelationshipFragment::new(child[1].clone());
    let inherited = RelationshipFragment::new(parent[0].clone());
    assert!(stronger.is_same_or_stronger_than(&inherited, &taxonomy));
}

#[rstest]
#[case::new_group_takes_next_number(
    vec![(10, 20, 5), (30, 40, 6), (50, 60, 7)],
    BTreeMap::from([(10, 1), (30, 2), (50, 3)])
)]
#[case::swapped_groups_keep_numbers(
    vec![(30, 40, 1), (10, 20, 2)],
    BTreeMap::from([(10, 1), (30, 2)])
)]
#[case::removed_group_frees_nothing(
    vec![(30, 40, 9)],
    BTreeMap::from([(30, 2)])
)]
fn persisted_group_numbers_are_kept(
    #[case] stated: Vec<(u64, u64, u32)>,
    #[case] expected: BTreeMap<u64, u32>,
) {
    let mut builder = InMemoryTaxonomy::builder()
        .existing(1_u64, fragment(10, 20).with_group(1).with_statement_id(1001))
        .existing(1_u64, fragment(30, 40).with_group(2).with_statement_id(1002));
    for (type_id, destination_id, group) in stated {
        builder = builder.stated(1_u64, fragment(type_id, destination_id).with_group(group));
    }
    let taxonomy = builder.build().expect("acyclic");

    let fragments = RelationshipNormalFormGenerator::new(&taxonomy)
        .generate(id(1))
        .expect("root");

    assert_eq!(groups_by_type(&fragments), expected);
}

#[test]
fn ungrouped_fragments_stay_apart_and_numbered_ones_merge() {
    let taxonomy = InMemoryTaxonomy::builder()
        .stated(1_u64, fragment(10, 20))
        .stated(1_u64, fragment(30, 40))
        .stated(1_u64, fragment(50, 60).with_group(3))
        .stated(1_u64, fragment(70, 80).with_group(3))
        .build()
        .expect("acyclic");

    let fragments = RelationshipNormalFormGenerator::new(&taxonomy)
        .generate(id(1))
        .expect("root");

    assert_eq!(
        groups_by_type(&fragments),
        BTreeMap::from([(10, 0), (30, 0), (50, 1), (70, 1)])
    );
}

#[test]
fn union_group_numbers_are_unique_within_a_concept() {
    let taxonomy = InMemoryTaxonomy::builder()
        .stated(1_u64, fragment(10, 20).with_union_group(4))
        .stated(1_u64, fragment(30, 40).with_union_group(4))
        .stated(1_u64, fragment(50, 60).with_union_group(7))
        .stated(1_u64, fragment(70, 80).with_union_group(7))
        .build()
        .expect("acyclic");

    let fragments = RelationshipNormalFormGenerator::new(&taxonomy)
        .generate(id(1))
        .expect("root");

    let unions: BTreeMap<u64, (u32, u32)> = fragments
        .iter()
        .map(|fragment| {
            (
                fragment.type_id.get(),
                (fragment.group, fragment.union_group),
            )
        })
        .collect();
    assert_eq!(
        unions,
        BTreeMap::from([(10, (0, 1)), (30, (0, 1)), (50, (0, 2)), (70, (0, 2))])
    );
}

#[rstest]
#[case::existential_does_not_imply_universal(fragment(11, 21), fragment(10, 20).universal(), false)]
#[case::universal_narrows_like_existential(fragment(11, 21).universal(), fragment(10, 20).universal(), true)]
#[case::negated_parent_value_is_stronger(fragment(10, 20).negated(), fragment(10, 21).negated(), true)]
#[case::negated_child_value_is_weaker(fragment(10, 21).negated(), fragment(10, 20).negated(), false)]
fn fragment_strength(
    #[case] candidate: StatementFragment,
    #[case] other: StatementFragment,
    #[case] expected: bool,
) {
    let taxonomy = InMemoryTaxonomy::builder()
        .parent(11_u64, 10_u64)
        .parent(21_u64, 20_u64)
        .build()
        .expect("acyclic");

    let candidate = RelationshipFragment::new(candidate);
    let other = RelationshipFragment::new(other);
    assert_eq!(candidate.is_same_or_stronger_than(&other, &taxonomy), expected);
}
