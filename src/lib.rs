//! Distribution normal form generation for description-logic taxonomies.
//!
//! Given a classified taxonomy, the crate computes for every concept the
//! minimal set of relationships it carries: the direct parents as `IS A`
//! fragments, plus the non-hierarchical relationships inherited from those
//! parents or stated on the concept, with every relationship implied by a
//! stronger one removed. Relationship groups keep the numbers persisted by the
//! previous run whenever their content is unchanged.
//!
//! ```
//! use normal_form::{
//!     config::ClassificationSettings,
//!     taxonomy::{ConceptId, InMemoryTaxonomy, StatementFragment},
//!     Classifier, RecordingChangeProcessor,
//! };
//!
//! let finding = ConceptId::new(404_684_003);
//! let site = ConceptId::new(363_698_007);
//! let lung = ConceptId::new(39_607_008);
//!
//! let taxonomy = InMemoryTaxonomy::builder()
//!     .concept(finding)
//!     .parent(19_829_001_u64, finding)
//!     .stated(19_829_001_u64, StatementFragment::new(site, lung).with_group(1))
//!     .build()?;
//!
//! let classifier = Classifier::new(&taxonomy, ClassificationSettings::default());
//! let mut changes = RecordingChangeProcessor::new();
//! let output = classifier.run(&mut changes)?;
//!
//! let normal_form = output.normal_form(ConceptId::new(19_829_001)).unwrap_or_default();
//! assert_eq!(normal_form.len(), 2);
//! assert_eq!(normal_form[1].group, 1);
//! # Ok::<(), normal_form::Error>(())
//! ```

pub mod classification;
pub mod config;
mod errors;
pub mod logger;
pub mod normal_form;
pub mod taxonomy;

pub use classification::{
    ChangeProcessor, ClassificationOutput, Classifier, NormalFormChanges, RecordingChangeProcessor,
};
pub use config::Config;
pub use errors::{Error, Result};
pub use normal_form::{NormalFormGenerator, RelationshipNormalFormGenerator};
