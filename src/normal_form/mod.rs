//! Distribution normal form generation.
//!
//! For each concept the generator inherits the non-hierarchical relationships
//! of its direct parents, adds the concept's own stated relationships, drops
//! everything implied by something stronger, and numbers the surviving groups
//! so that unchanged content keeps the numbers persisted by the previous run.

pub mod cache;
pub mod comparable;
pub mod generator;
pub mod group;
pub mod numbering;
pub mod redundancy;

pub use cache::FragmentCache;
pub use comparable::{RelationshipFragment, SameOrStrongerThan, SemanticKey};
pub use generator::{NormalFormGenerator, RelationshipNormalFormGenerator};
pub use group::{to_groups, Group, Numbering, UnionGroup};
pub use numbering::{adjust_order, fill_numbers, Assignment};
pub use redundancy::{GroupSet, NonRedundantSet};
