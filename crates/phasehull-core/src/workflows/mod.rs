//! # Workflows Module
//!
//! High-level entry points for callers that own their own candidate objects.
//!
//! ## Overview
//!
//! Callers usually hold structures or records that carry a composition and a score among
//! many other things. The workflows here bind those objects to phase-diagram entries,
//! classify them against the hull and write the results back through the caller's own
//! property interface.
//!
//! ## Architecture
//!
//! - **Structure Binding** ([`binding`]) - The [`binding::Candidate`] trait and the
//!   [`binding::StructureHull`] container mapping candidates to entries
//!
//! ## Key Capabilities
//!
//! - **Opaque handles** for every inserted candidate, rejected ones included
//! - **Stable subsets** computed on demand from the current hull
//! - **Bulk publication** of stability, formation energy and hull distance

pub mod binding;
