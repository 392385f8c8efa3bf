//! # Phasehull Core Library
//!
//! An exact convex-hull engine for thermodynamic phase stability. Given a set of scored
//! candidates (a composition plus a scalar energetic score such as an enthalpy), the library
//! builds the lower convex envelope in composition/energy space and classifies every candidate
//! as on the hull (stable) or above it (metastable, with a measured distance).
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: the `Composition` model and
//!   formula parsing, typed identifiers, the regular-simplex embedder, exact rational linear
//!   algebra and a generic exact convex hull.
//!
//! - **[`engine`]: The Logic Core.** The stateful phase-stability engine. It tracks chemical
//!   potentials, validates and stores entries, caches the hull with explicit invalidation and
//!   answers stability and hull-distance queries through the `PhaseDiagram` facade.
//!
//! - **[`workflows`]: The Public API.** Binds caller-owned candidate objects to hull entries
//!   and writes the results back onto them.

pub mod core;
pub mod engine;
pub mod workflows;
