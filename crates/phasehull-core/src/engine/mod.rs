//! # Engine Module
//!
//! The stateful phase-stability engine: it turns scored compositions into points of a
//! composition/energy space, keeps the convex hull of those points up to date and answers
//! stability and hull-distance queries against it.
//!
//! ## Overview
//!
//! A phase diagram is defined by a fixed list of endpoint compositions. Every candidate is
//! decomposed into whole multiples of those endpoints; candidates made of a single endpoint
//! set that endpoint's chemical potential (the lowest score per formula unit seen so far),
//! and every other candidate is measured against the linear combination of potentials that
//! matches its composition. The lower convex envelope of the resulting points is the set of
//! stable phases.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Endpoint list and hull-build switches
//! - **Error Handling** ([`error`]) - Fatal configuration and geometry errors
//! - **Embedding** ([`embedding`]) - Endpoint positions in the regular simplex and the exact
//!   barycentric frame used for predicates
//! - **Chemical Potentials** ([`potentials`]) - Monotone per-endpoint reference energies
//! - **Entry Registry** ([`registry`]) - Validation, decomposition and storage of candidates
//! - **Hull Builder** ([`builder`]) - Point selection, vertical-facet filtering and caching
//! - **Phase Hull** ([`phase_hull`]) - Classified facets and the stability/distance queries
//! - **Phase Diagram** ([`diagram`]) - The facade tying the pieces together
//!
//! ## Key Capabilities
//!
//! - **Exact boundary predicates** so that "on the hull" is decided without tolerances
//! - **Explicit cache invalidation** whenever an entry is added or a potential drops
//! - **Indeterminate results** represented as `None` rather than defaulting to unstable

pub mod builder;
pub mod config;
pub mod diagram;
pub mod embedding;
pub mod error;
pub mod phase_hull;
pub mod potentials;
pub mod registry;
