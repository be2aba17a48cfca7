//! # Registration Core
//!
//! This library provides the shared abstractions and types for paired 3D
//! point-set registration. The registration crates in this workspace
//! (`absolute-orientation` and `orthogonal-procrustes`) both depend on this
//! crate and interoperate through it.
//!
//! A point set is an ordered sequence of N 3D coordinates. Callers may lay
//! the data out as 3×N (one point per column) or N×3 (one point per row);
//! everything in this workspace normalizes to 3×N internally and restores the
//! caller's orientation on output. Query and target sets are assumed to be
//! paired one-to-one and in corresponding order — finding correspondences is
//! the job of an upstream producer, not of this workspace.
//!
//! The crate contains:
//!
//! * [`ShapeError`] and [`RegistrationError`] — the failure taxonomy.
//! * [`PreparedPair`] — validated, orientation-normalized, centered inputs.
//! * [`SimilarityTransform`] — rotation, uniform scale, and translation,
//!   together with their 3×4 homogeneous composition.
//! * [`RegistrationMetrics`] — squared-distance error summary between a
//!   registered set and its target.
//! * [`Registrar`] — the capability implemented by each registration
//!   strategy, along with [`complete_registration`], the strategy-independent
//!   tail every implementation shares.

#![warn(missing_docs)]

mod error;
mod metrics;
mod point_set;
mod registrar;
mod transform;

pub use error::*;
pub use metrics::*;
pub use nalgebra;
pub use point_set::*;
pub use registrar::*;
pub use transform::*;

/// Below this threshold a sum of squares or a Frobenius norm is considered
/// degenerate (a point set collapsed onto its own centroid).
pub const NEAR_ZERO_TOLERANCE: f64 = 1e-9;
