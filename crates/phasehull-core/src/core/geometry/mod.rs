//! # Geometry Module
//!
//! Geometric machinery behind the phase hull.
//!
//! - [`simplex`] - Regular-simplex placement of endpoint compositions (floating point, used
//!   for reported embedded points)
//! - [`exact`] - Arbitrary-precision rational arithmetic: determinants, linear solves and
//!   oriented hyperplanes
//! - [`hull`] - An incremental d-dimensional convex hull evaluated entirely with exact
//!   predicates
//!
//! Boundary predicates ("lies on this hyperplane", "has no energy component", "is inside
//! this facet") are only ever decided in [`exact`] arithmetic; floating point appears only
//! in values handed back to callers.

pub mod exact;
pub mod hull;
pub mod simplex;
