//! # Core Models Module
//!
//! Data structures describing what is being classified.
//!
//! - [`composition`] - Element-count maps, formula parsing, reduction and decomposition helpers
//! - [`ids`] - Typed identifiers for endpoints, entries, hull points and bound candidates
//!
//! ```ignore
//! use phasehull::core::models::composition::Composition;
//!
//! let spinel: Composition = "MgAl2O4".parse()?;
//! assert_eq!(spinel.total_atoms(), 7);
//! ```

pub mod composition;
pub mod ids;
