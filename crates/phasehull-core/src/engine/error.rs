use thiserror::Error;

use super::config::ConfigError;
use crate::core::geometry::hull::GeometryError;
use crate::core::geometry::simplex::SimplexError;
use crate::core::models::composition::Composition;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HullError {
    #[error("A phase diagram needs at least 2 endpoints, got {found}")]
    TooFewEndpoints { found: usize },

    #[error("Endpoint #{index} has an empty formula")]
    EmptyEndpoint { index: usize },

    #[error("Endpoints #{first} and #{second} both reduce to '{formula}'")]
    DuplicateEndpoint {
        first: usize,
        second: usize,
        formula: Composition,
    },

    #[error(
        "Endpoint #{index} ('{formula}') contains an earlier endpoint and can never be observed as pure"
    )]
    ShadowedEndpoint { index: usize, formula: Composition },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Hull geometry failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },
}

impl From<SimplexError> for HullError {
    fn from(error: SimplexError) -> Self {
        match error {
            SimplexError::TooFewVertices(found) => Self::TooFewEndpoints { found },
        }
    }
}
