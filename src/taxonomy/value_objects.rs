use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value object identifying a concept of the terminology.
///
/// SNOMED CT identifiers are 64-bit integers; relationship types and
/// destinations are concepts as well, so the same type is used for every
/// position of a statement.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConceptId(u64);

impl ConceptId {
    /// `116680003 |Is a (attribute)|`, the hierarchical relationship type.
    pub const IS_A: Self = Self(116_680_003);

    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ConceptId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for ConceptId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConceptId {
    type Err = ConceptIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ConceptIdError::Invalid {
                value: s.to_owned(),
            })
    }
}

/// Errors produced when parsing a [`ConceptId`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConceptIdError {
    /// The provided text is not a decimal 64-bit identifier.
    #[error("invalid concept identifier: {value}")]
    Invalid { value: String },
}

#[cfg(test)]
mod tests {
    use super::ConceptId;

    #[test]
    fn parses_decimal_identifiers() {
        let id: ConceptId = "116680003".parse().expect("valid id");
        assert_eq!(id, ConceptId::IS_A);
        assert_eq!(id.to_string(), "116680003");
    }

    #[test]
    fn rejects_non_numeric_identifiers() {
        let err = "is-a".parse::<ConceptId>().expect_err("invalid id");
        assert!(matches!(err, super::ConceptIdError::Invalid { value } if value == "is-a"));
    }
}
