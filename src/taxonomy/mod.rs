//! Taxonomy primitives consumed by the normal form generator.
//!
//! The reasoner, the revision-controlled store and the persister live outside
//! this crate. They meet the generator through [`TaxonomySnapshot`], a pure
//! read-only port, and through [`StatementFragment`], the value exchanged in
//! both directions.

pub mod fragment;
pub mod memory;
pub mod snapshot;
pub mod value_objects;

pub use fragment::{FragmentKey, StatementFragment};
pub use memory::{ConceptFixture, InMemoryTaxonomy, TaxonomyBuilder, TaxonomyFixture};
pub use snapshot::TaxonomySnapshot;
pub use value_objects::{ConceptId, ConceptIdError};
