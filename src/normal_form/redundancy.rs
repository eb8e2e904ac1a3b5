use super::{comparable::SameOrStrongerThan, group::Group};
use crate::taxonomy::TaxonomySnapshot;

/// Set of elements none of which is implied by another member.
///
/// Survivors keep their insertion order, which makes numbering and output
/// order deterministic.
#[derive(Clone, Debug)]
pub struct NonRedundantSet<T> {
    members: Vec<T>,
}

/// Non-redundant groups of one concept.
pub type GroupSet = NonRedundantSet<Group>;

impl<T> Default for NonRedundantSet<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<T> NonRedundantSet<T>
where
    T: SameOrStrongerThan + PartialEq,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `element` unless a member already implies it; members implied
    /// by `element` are removed first.
    ///
    /// Returns `true` when the element was inserted.
    pub fn add<S>(&mut self, element: T, taxonomy: &S) -> bool
    where
        S: TaxonomySnapshot + ?Sized,
    {
        if self
            .members
            .iter()
            .any(|member| member.is_same_or_stronger_than(&element, taxonomy))
        {
            return false;
        }

        self.members
            .retain(|member| !element.is_same_or_stronger_than(member, taxonomy));
        self.members.push(element);
        true
    }

    /// Inserts `element` without redundancy checks; only exact duplicates are
    /// skipped.
    pub fn add_unique(&mut self, element: T) -> bool {
        if self.members.contains(&element) {
            return false;
        }
        self.members.push(element);
        true
    }

    /// Adds every element of `elements` with [`Self::add`].
    pub fn extend<S>(&mut self, elements: impl IntoIterator<Item = T>, taxonomy: &S)
    where
        S: TaxonomySnapshot + ?Sized,
    {
        for element in elements {
            self.add(element, taxonomy);
        }
    }

    /// Returns `true` if no member is implied by another one.
    pub fn is_minimal<S>(&self, taxonomy: &S) -> bool
    where
        S: TaxonomySnapshot + ?Sized,
    {
        self.members.iter().enumerate().all(|(i, left)| {
            self.members
                .iter()
                .enumerate()
                .all(|(j, right)| i == j || !left.is_same_or_stronger_than(right, taxonomy))
        })
    }
}

impl<T> NonRedundantSet<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.members.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.members
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.members
    }
}

impl<'a, T> IntoIterator for &'a NonRedundantSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
