//! Stable group and union-group numbering.
//!
//! Groups are never mutated; numbers live in an [`Assignment`] computed from
//! the freshly generated groups and the groups persisted by the previous run.
//! Re-running classification over unchanged content must reproduce the same
//! numbers, and partial changes should disturb as few numbers as possible.
//!
//! Group numbers are unique among the non-zero groups of a concept. Union-group
//! numbers are unique across the whole concept, so that several group 0 entries
//! holding a disjunction never share a union-group number once flattened.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::{group::Group, redundancy::GroupSet};

/// Final numbers of a [`GroupSet`], addressed by position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    groups: Vec<u32>,
    union_groups: Vec<Vec<u32>>,
}

impl Assignment {
    /// Number of the group at `group` index.
    #[must_use]
    pub fn group(&self, group: usize) -> u32 {
        self.groups[group]
    }

    /// Number of the union group at `union_group` index inside `group`.
    #[must_use]
    pub fn union_group(&self, group: usize, union_group: usize) -> u32 {
        self.union_groups[group][union_group]
    }

    #[must_use]
    pub fn groups(&self) -> &[u32] {
        &self.groups
    }

    /// Numbers `groups` stably with respect to the `previous` run.
    #[must_use]
    pub fn compute(groups: &GroupSet, previous: &GroupSet) -> Self {
        adjust_order(fill_numbers(groups), groups, previous)
    }
}

/// Gives every unassigned group and union group the smallest unused positive
/// number, in iteration order. Numbers already present are kept.
#[must_use]
pub fn fill_numbers(groups: &GroupSet) -> Assignment {
    let mut group_numbers = NumberPool::new(groups.iter().filter_map(Group::source_number));
    let mut union_numbers = NumberPool::new(
        groups
            .iter()
            .flat_map(Group::union_groups)
            .filter_map(|union_group| union_group.source_number()),
    );

    let mut assignment = Assignment::default();
    for group in groups {
        assignment
            .groups
            .push(group.source_number().unwrap_or_else(|| group_numbers.next()));
        assignment.union_groups.push(
            group
                .union_groups()
                .iter()
                .map(|union_group| {
                    union_group
                        .source_number()
                        .unwrap_or_else(|| union_numbers.next())
                })
                .collect(),
        );
    }
    assignment
}

/// Reuses the numbers of structurally equal groups from the previous run,
/// swapping numbers with any group that would otherwise collide.
///
/// Number 0 is never handed out or taken away, and groups whose numbers
/// already coincide are left alone.
#[must_use]
pub fn adjust_order(mut assignment: Assignment, groups: &GroupSet, previous: &GroupSet) -> Assignment {
    let mut group_map = NumberMap::default();
    let mut union_map = NumberMap::default();
    let mut matched = vec![false; groups.len()];

    for old_group in previous {
        let Some(index) = groups
            .iter()
            .zip(&matched)
            .position(|(group, taken)| !taken && group == old_group)
        else {
            continue;
        };
        matched[index] = true;

        if let Some(old_number) = old_group.source_number() {
            group_map.insert(assignment.groups[index], old_number);
        }

        let new_group = &groups.as_slice()[index];
        let mut union_matched = vec![false; new_group.union_groups().len()];
        for old_union in old_group.union_groups() {
            let Some(union_index) = new_group
                .union_groups()
                .iter()
                .zip(&union_matched)
                .position(|(union_group, taken)| !taken && union_group == old_union)
            else {
                continue;
            };
            union_matched[union_index] = true;

            if let Some(old_number) = old_union.source_number() {
                union_map.insert(assignment.union_groups[index][union_index], old_number);
            }
        }
    }

    trace!(groups = ?group_map.forward, union_groups = ?union_map.forward, "group_renumbering");

    group_map.apply(assignment.groups.iter_mut());
    union_map.apply(assignment.union_groups.iter_mut().flatten());
    assignment
}

/// Hands out the smallest positive numbers not taken yet.
struct NumberPool {
    used: BTreeSet<u32>,
    candidate: u32,
}

impl NumberPool {
    fn new(used: impl IntoIterator<Item = u32>) -> Self {
        Self {
            used: used.into_iter().collect(),
            candidate: 1,
        }
    }

    fn next(&mut self) -> u32 {
        while self.used.contains(&self.candidate) {
            self.candidate += 1;
        }
        self.used.insert(self.candidate);
        self.candidate
    }
}

/// Injective mapping from current numbers to desired numbers.
#[derive(Default)]
struct NumberMap {
    forward: BTreeMap<u32, u32>,
    inverse: BTreeMap<u32, u32>,
}

impl NumberMap {
    fn insert(&mut self, current: u32, desired: u32) {
        if current == 0 || desired == 0 || current == desired {
            return;
        }
        if self.forward.contains_key(&current) || self.inverse.contains_key(&desired) {
            return;
        }
        self.forward.insert(current, desired);
        self.inverse.insert(desired, current);
    }

    fn apply<'a>(&self, numbers: impl Iterator<Item = &'a mut u32>) {
        if self.forward.is_empty() {
            return;
        }
        for number in numbers {
            let current = *number;
            if let Some(desired) = self.forward.get(&current) {
                *number = *desired;
            } else if self.inverse.contains_key(&current) {
                // Someone else takes this number; move into the one vacated at
                // the end of the chain of displaced holders.
                let mut vacated = current;
                while let Some(holder) = self.inverse.get(&vacated) {
                    vacated = *holder;
                }
                *number = vacated;
            }
        }
    }
}
