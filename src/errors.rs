//! Crate-wide error type.
//!
//! Taxonomy-level contradictions are not represented here: they are expected to
//! be removed by the reasoner before the generator runs.

use std::path::PathBuf;

use crate::taxonomy::ConceptId;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A concept was generated before one of its direct parents. This is a
    /// traversal order defect in the caller, and the run has to be aborted.
    #[error("concept `{concept}` was generated before its parent `{parent}`")]
    ParentNotProcessed { concept: ConceptId, parent: ConceptId },

    /// The direct-parent relation loops; `remaining` concepts could not be
    /// ordered.
    #[error("taxonomy hierarchy contains a cycle involving {remaining} concept(s)")]
    CyclicTaxonomy { remaining: usize },

    /// A configuration or fixture file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed YAML configuration or fixture.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON fixture.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The tracing subscriber could not be installed, either because the
    /// filter directive is invalid or because a global subscriber exists.
    #[error("failed to initialise logger: {0}")]
    Logger(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
