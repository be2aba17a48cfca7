//! This package estimates the similarity transform (rotation, uniform scale,
//! translation) aligning one 3D point set onto another, using Horn's
//! closed-form quaternion solution to the [absolute orientation][absor]
//! problem.
//!
//! The point sets must be paired one-to-one and in corresponding order. The
//! optimal rotation falls out of the eigendecomposition of a symmetric 4×4
//! matrix built from the cross-covariance of the centered point sets: the
//! eigenvector of the dominant eigenvalue is the optimal unit quaternion.
//! Scale is recovered from the variance ratio of the two sets and
//! translation from their centroids.
//!
//! [absor]: https://people.csail.mit.edu/bkph/papers/Absolute_Orientation
#![warn(missing_docs)]

use log::{info, warn};
use registration_core::{
    complete_registration,
    nalgebra::{DMatrix, Matrix3, Matrix4, Vector4},
    PreparedPair, Registrar, RegistrationError, RegistrationResult, NEAR_ZERO_TOLERANCE,
};

const EIGEN_CONVERGENCE: f64 = 1e-12;
const EIGEN_ITERATIONS: usize = 1000;

/// Horn's quaternion-based absolute orientation.
///
/// The options mirror the knobs of the method itself: whether to solve for a
/// uniform scale, whether to solve for a translation, and how to treat a
/// dominant eigenvalue that indicates the optimal alignment is a reflection
/// rather than a proper rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HornRegistration {
    /// Solve for a uniform scale factor. When disabled the scale is exactly 1.
    pub do_scale: bool,
    /// Solve for a translation. When disabled the translation is zero.
    pub do_translation: bool,
    /// Keep the returned rotation proper (determinant +1) by selecting the
    /// largest positive eigenvalue. When disabled, the largest-magnitude
    /// eigenvalue is selected instead, and if it is negative the result is
    /// the optimal reflection rather than a rotation.
    pub enforce_valid_rotation: bool,
    /// The epsilon on which convergence is considered achieved for the
    /// symmetric eigen solver.
    pub epsilon: f64,
    /// The maximum number of iterations of the symmetric eigen solver.
    pub iterations: usize,
}

impl HornRegistration {
    /// Creates a registration with all options enabled.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets [`HornRegistration::do_scale`].
    #[must_use]
    pub fn do_scale(self, do_scale: bool) -> Self {
        Self { do_scale, ..self }
    }

    /// Sets [`HornRegistration::do_translation`].
    #[must_use]
    pub fn do_translation(self, do_translation: bool) -> Self {
        Self {
            do_translation,
            ..self
        }
    }

    /// Sets [`HornRegistration::enforce_valid_rotation`].
    #[must_use]
    pub fn enforce_valid_rotation(self, enforce_valid_rotation: bool) -> Self {
        Self {
            enforce_valid_rotation,
            ..self
        }
    }

    /// Registers the query points onto the target points.
    ///
    /// Both arguments may be 3×N or N×3 with equal N; the registered points
    /// come back in the query's orientation.
    ///
    /// ```
    /// use absolute_orientation::HornRegistration;
    /// use registration_core::nalgebra::DMatrix;
    ///
    /// let query = DMatrix::from_row_slice(3, 4, &[
    ///     0.0, 1.0, 0.0, 0.0,
    ///     0.0, 0.0, 1.0, 0.0,
    ///     0.0, 0.0, 0.0, 1.0,
    /// ]);
    /// // The query shifted by (1, 2, 3).
    /// let mut target = query.clone();
    /// for mut column in target.column_iter_mut() {
    ///     column[0] += 1.0;
    ///     column[1] += 2.0;
    ///     column[2] += 3.0;
    /// }
    /// let result = HornRegistration::new().register(&query, &target).unwrap();
    /// assert!(result.metrics.rms_error < 1e-9);
    /// assert!((result.transform.scale - 1.0).abs() < 1e-9);
    /// ```
    pub fn register(
        &self,
        points_query: &DMatrix<f64>,
        points_target: &DMatrix<f64>,
    ) -> Result<RegistrationResult, RegistrationError> {
        let pair = PreparedPair::new(points_query, points_target)?;

        // Cross-covariance of the centered sets. The rotation and scale are
        // estimated from the centered points; the centroids only come back
        // into play for the translation.
        let covariance = &pair.query.centered * pair.target.centered.transpose();

        let eigen = horn_matrix(&covariance)
            .try_symmetric_eigen(self.epsilon, self.iterations)
            .ok_or(RegistrationError::NonConvergent(
                "symmetric eigendecomposition of the Horn matrix",
            ))?;

        // The eigenvector of the dominant eigenvalue is the optimal unit
        // quaternion. A negative dominant eigenvalue means the best alignment
        // is a reflection, not a rotation.
        let mut is_reflection = false;
        let selected = if self.enforce_valid_rotation {
            let largest = eigen.eigenvalues.imax();
            if eigen.eigenvalues[largest] < 0.0 {
                is_reflection = true;
                warn!(
                    "largest eigenvalue is negative: the optimal alignment is a reflection; \
                     keeping the largest-magnitude eigenvector, but consider disabling \
                     rotation validity enforcement"
                );
                eigen.eigenvalues.iamax()
            } else {
                largest
            }
        } else {
            let largest = eigen.eigenvalues.iamax();
            if eigen.eigenvalues[largest] < 0.0 {
                is_reflection = true;
                warn!(
                    "largest-magnitude eigenvalue is negative: the optimal alignment is a \
                     reflection"
                );
            }
            largest
        };

        let quaternion = eigen.eigenvectors.column(selected).into_owned();
        let mut rotation = quaternion_to_rotation(quaternion);
        if is_reflection && !self.enforce_valid_rotation {
            rotation.neg_mut();
        }

        let mut scale = 1.0;
        if self.do_scale {
            let sum_squares_query = pair.query.centered.norm_squared();
            let sum_squares_target = pair.target.centered.norm_squared();
            if sum_squares_query < NEAR_ZERO_TOLERANCE || sum_squares_target < NEAR_ZERO_TOLERANCE
            {
                info!("query or target points are degenerate with zero norm, setting scale factor to 1.0");
            } else {
                // Ratio of the variance of the target set (trace of the
                // rotated covariance) to the variance of the query set.
                scale = (rotation * covariance).trace() / sum_squares_query;
            }
        }

        Ok(complete_registration(
            rotation,
            scale,
            self.do_translation,
            &pair,
        ))
    }
}

impl Default for HornRegistration {
    fn default() -> Self {
        Self {
            do_scale: true,
            do_translation: true,
            enforce_valid_rotation: true,
            epsilon: EIGEN_CONVERGENCE,
            iterations: EIGEN_ITERATIONS,
        }
    }
}

impl Registrar for HornRegistration {
    fn register(
        &self,
        points_query: &DMatrix<f64>,
        points_target: &DMatrix<f64>,
    ) -> Result<RegistrationResult, RegistrationError> {
        HornRegistration::register(self, points_query, points_target)
    }
}

/// Builds the symmetric 4×4 matrix of Horn's method from the 3×3
/// cross-covariance matrix.
fn horn_matrix(covariance: &Matrix3<f64>) -> Matrix4<f64> {
    let (sxx, sxy, sxz) = (covariance.m11, covariance.m12, covariance.m13);
    let (syx, syy, syz) = (covariance.m21, covariance.m22, covariance.m23);
    let (szx, szy, szz) = (covariance.m31, covariance.m32, covariance.m33);
    #[rustfmt::skip]
    let matrix = Matrix4::new(
        sxx + syy + szz,  syz - szy,        szx - sxz,        sxy - syx,
        syz - szy,        sxx - syy - szz,  sxy + syx,        szx + sxz,
        szx - sxz,        sxy + syx,       -sxx + syy - szz,  syz + szy,
        sxy - syx,        szx + sxz,        syz + szy,       -sxx - syy + szz,
    );
    matrix
}

/// Converts a scalar-first unit quaternion into a rotation matrix.
///
/// The eigenvectors of a symmetric eigendecomposition are already unit norm,
/// and the formula is quadratic in the quaternion, so either sign of the
/// eigenvector produces the same matrix.
fn quaternion_to_rotation(quaternion: Vector4<f64>) -> Matrix3<f64> {
    let (q0, q1, q2, q3) = (quaternion[0], quaternion[1], quaternion[2], quaternion[3]);
    #[rustfmt::skip]
    let rotation = Matrix3::new(
        q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,  2.0 * (q1 * q2 - q0 * q3),              2.0 * (q1 * q3 + q0 * q2),
        2.0 * (q1 * q2 + q0 * q3),              q0 * q0 - q1 * q1 + q2 * q2 - q3 * q3,  2.0 * (q2 * q3 - q0 * q1),
        2.0 * (q1 * q3 - q0 * q2),              2.0 * (q2 * q3 + q0 * q1),              q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
    );
    rotation
}
