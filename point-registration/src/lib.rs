//! # `point-registration`
//!
//! Batteries-included paired 3D point-set registration.
//!
//! This crate re-exports the whole registration workspace in one place for
//! discoverability and for quickly writing a registration routine. If you
//! are making a production application, import the crates you need
//! individually:
//!
//! * `registration-core` - shared types: point-set preparation, the
//!   similarity transform, error metrics, and the [`Registrar`] capability.
//! * `absolute-orientation` - Horn's quaternion-based absolute orientation.
//! * `orthogonal-procrustes` - SVD-based orthogonal Procrustes / Kabsch
//!   alignment.
//!
//! Both strategies accept the same inputs and produce the same
//! [`RegistrationResult`] schema, so they are interchangeable behind the
//! [`Registrar`] trait:
//!
//! ```
//! use point_registration::{
//!     nalgebra::DMatrix, HornRegistration, ProcrustesRegistration, Registrar,
//! };
//!
//! let query = DMatrix::from_row_slice(4, 3, &[
//!     0.0, 0.0, 0.0,
//!     1.0, 0.0, 0.0,
//!     0.0, 1.0, 0.0,
//!     0.0, 0.0, 1.0,
//! ]);
//! // The query translated by (5, 0, -2).
//! let mut target = query.clone();
//! for mut row in target.row_iter_mut() {
//!     row[0] += 5.0;
//!     row[2] -= 2.0;
//! }
//!
//! let strategies: [&dyn Registrar; 2] =
//!     [&HornRegistration::new(), &ProcrustesRegistration::new()];
//! for strategy in strategies {
//!     let result = strategy.register(&query, &target).unwrap();
//!     assert!(result.metrics.rms_error < 1e-9);
//! }
//! ```

#![warn(missing_docs)]

pub use absolute_orientation::HornRegistration;
pub use orthogonal_procrustes::{ProcrustesRegistration, ScaleMethod};
pub use registration_core::*;
