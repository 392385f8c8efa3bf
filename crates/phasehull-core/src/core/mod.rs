//! # Core Module
//!
//! Stateless foundations shared by the phase-stability engine.
//!
//! - **Chemical Representation** ([`models`]) - Compositions, formula parsing and identifiers
//! - **Geometry** ([`geometry`]) - Regular-simplex embedding, exact rational predicates and
//!   a d-dimensional convex hull over exact coordinates
//!
//! Everything in this module is free of hull-cache state; the [`crate::engine`] layer owns
//! the mutable parts (chemical potentials, entries, cached hulls).

pub mod geometry;
pub mod models;
