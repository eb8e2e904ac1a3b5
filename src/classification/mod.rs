//! Whole-taxonomy normal form runs.
//!
//! A [`Classifier`] ranks concepts so that every concept comes after all of its
//! direct parents, generates each rank (concurrently when enabled), and reports
//! what changed against the persisted state to a [`ChangeProcessor`].

pub mod changes;

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display, Formatter},
};

use serde::Serialize;
use tracing::{debug, info, info_span};

pub use self::changes::{ChangeProcessor, NormalFormChanges, RecordingChangeProcessor};
use crate::{
    config::ClassificationSettings,
    normal_form::{NormalFormGenerator, RelationshipNormalFormGenerator},
    taxonomy::{ConceptId, StatementFragment, TaxonomySnapshot},
    Error, Result,
};

/// Normal forms produced by one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationOutput {
    normal_forms: BTreeMap<ConceptId, Vec<StatementFragment>>,
    changed: usize,
}

impl ClassificationOutput {
    #[must_use]
    pub fn normal_form(&self, concept: ConceptId) -> Option<&[StatementFragment]> {
        self.normal_forms.get(&concept).map(Vec::as_slice)
    }

    #[must_use]
    pub fn normal_forms(&self) -> &BTreeMap<ConceptId, Vec<StatementFragment>> {
        &self.normal_forms
    }

    #[must_use]
    pub fn into_normal_forms(self) -> BTreeMap<ConceptId, Vec<StatementFragment>> {
        self.normal_forms
    }

    /// Number of concepts whose normal form differs from the persisted one.
    #[must_use]
    pub fn changed_concepts(&self) -> usize {
        self.changed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.normal_forms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normal_forms.is_empty()
    }
}

impl Display for ClassificationOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (concept, fragments) in &self.normal_forms {
            writeln!(f, "{concept}:")?;
            for fragment in fragments {
                writeln!(f, "  {fragment}")?;
            }
        }
        Ok(())
    }
}

type GeneratedConcept = (ConceptId, Vec<StatementFragment>);

/// Drives the generator over every concept of a snapshot.
pub struct Classifier<'a, S: ?Sized> {
    generator: RelationshipNormalFormGenerator<'a, S>,
    settings: ClassificationSettings,
}

impl<'a, S> Classifier<'a, S>
where
    S: TaxonomySnapshot + Sync + ?Sized,
{
    #[must_use]
    pub fn new(taxonomy: &'a S, settings: ClassificationSettings) -> Self {
        let generator = RelationshipNormalFormGenerator::new(taxonomy)
            .with_redundancy_check(settings.check_redundancy);
        Self {
            generator,
            settings,
        }
    }

    #[must_use]
    pub fn generator(&self) -> &RelationshipNormalFormGenerator<'a, S> {
        &self.generator
    }

    #[must_use]
    pub fn settings(&self) -> &ClassificationSettings {
        &self.settings
    }

    /// Generates the normal form of every concept and reports the differences
    /// with the persisted relationships to `processor`.
    ///
    /// # Errors
    ///
    /// Fails on a cyclic hierarchy, or when a concept's parent is not part of
    /// the snapshot. Nothing is reported past the failing rank.
    pub fn run<P>(&self, processor: &mut P) -> Result<ClassificationOutput>
    where
        P: ChangeProcessor + ?Sized,
    {
        let taxonomy = self.generator.taxonomy();
        let ranks = rank_concepts(taxonomy)?;
        let span = info_span!(
            "classification_run",
            ranks = ranks.len(),
            parallel = self.settings.parallel
        );
        let _guard = span.enter();

        let mut output = ClassificationOutput::default();
        for (rank, concepts) in ranks.iter().enumerate() {
            let generated = self.generate_rank(concepts)?;
            debug!(rank, concepts = concepts.len(), "classification_rank_generated");

            for (concept, fragments) in generated {
                let existing = self.generator.get_existing(concept);
                let changes = NormalFormChanges::between(&existing, &fragments);
                if !changes.is_empty() {
                    processor.process(concept, &changes.added, &changes.removed);
                    output.changed += 1;
                }
                output.normal_forms.insert(concept, fragments);
            }
        }

        info!(
            concepts = output.len(),
            changed = output.changed,
            "classification_completed"
        );
        Ok(output)
    }

    /// Drops the cached normal forms of `concepts` and all of their
    /// descendants, returning how many concepts were invalidated.
    pub fn invalidate_with_descendants(
        &self,
        concepts: impl IntoIterator<Item = ConceptId>,
    ) -> usize {
        let taxonomy = self.generator.taxonomy();
        let mut affected = BTreeSet::new();
        for concept in concepts {
            affected.insert(concept);
            affected.extend(taxonomy.descendants(concept));
        }
        self.generator.invalidate(&affected);
        debug!(concepts = affected.len(), "normal_form_cache_invalidated");
        affected.len()
    }

    #[cfg(feature = "parallel")]
    fn generate_rank(&self, concepts: &[ConceptId]) -> Result<Vec<GeneratedConcept>> {
        use rayon::prelude::*;

        if self.settings.parallel {
            return concepts
                .par_iter()
                .map(|concept| self.generate_one(*concept))
                .collect();
        }
        self.generate_sequential(concepts)
    }

    #[cfg(not(feature = "parallel"))]
    fn generate_rank(&self, concepts: &[ConceptId]) -> Result<Vec<GeneratedConcept>> {
        self.generate_sequential(concepts)
    }

    fn generate_sequential(&self, concepts: &[ConceptId]) -> Result<Vec<GeneratedConcept>> {
        concepts
            .iter()
            .map(|concept| self.generate_one(*concept))
            .collect()
    }

    fn generate_one(&self, concept: ConceptId) -> Result<GeneratedConcept> {
        self.generator
            .generate(concept)
            .map(|fragments| (concept, fragments))
    }
}

/// Splits the concepts of `taxonomy` into ranks.
///
/// A concept's rank is the length of the longest path from a root through
/// direct parents, so every parent sits in an earlier rank than its children.
/// Parents outside [`TaxonomySnapshot::concept_ids`] are ignored here.
pub fn rank_concepts<S>(taxonomy: &S) -> Result<Vec<Vec<ConceptId>>>
where
    S: TaxonomySnapshot + ?Sized,
{
    let known: BTreeSet<ConceptId> = taxonomy.concept_ids().into_iter().collect();
    let mut pending: BTreeMap<ConceptId, usize> = BTreeMap::new();
    let mut children: BTreeMap<ConceptId, Vec<ConceptId>> = BTreeMap::new();

    for concept in &known {
        let parents: Vec<ConceptId> = taxonomy
            .direct_parents(*concept)
            .into_iter()
            .filter(|parent| known.contains(parent))
            .collect();
        pending.insert(*concept, parents.len());
        for parent in parents {
            children.entry(parent).or_default().push(*concept);
        }
    }

    let mut current: Vec<ConceptId> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(concept, _)| *concept)
        .collect();
    let mut ranks = Vec::new();
    let mut placed = 0;

    while !current.is_empty() {
        let mut next = Vec::new();
        for concept in &current {
            for child in children.get(concept).into_iter().flatten() {
                if let Some(count) = pending.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        next.push(*child);
                    }
                }
            }
        }
        next.sort_unstable();
        placed += current.len();
        ranks.push(current);
        current = next;
    }

    if placed < known.len() {
        return Err(Error::CyclicTaxonomy {
            remaining: known.len() - placed,
        });
    }
    Ok(ranks)
}
