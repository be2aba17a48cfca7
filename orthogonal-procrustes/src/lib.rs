//! This package estimates the similarity transform (rotation, uniform scale,
//! translation) aligning one 3D point set onto another by solving the
//! [orthogonal Procrustes problem][procrustes] with a singular value
//! decomposition, also known as the [Kabsch algorithm][kabsch].
//!
//! The point sets must be paired one-to-one and in corresponding order. The
//! optimal rotation is composed from the orthogonal factors of the SVD of
//! the cross-covariance of the centered (optionally Frobenius-standardized)
//! point sets, with a sign correction available to guarantee a proper
//! rotation when the best orthogonal alignment would be a reflection.
//!
//! [procrustes]: https://en.wikipedia.org/wiki/Procrustes_analysis
//! [kabsch]: https://en.wikipedia.org/wiki/Kabsch_algorithm
#![warn(missing_docs)]

use log::{info, warn};
use registration_core::{
    complete_registration,
    nalgebra::DMatrix,
    PreparedPair, Registrar, RegistrationError, RegistrationResult, NEAR_ZERO_TOLERANCE,
};

const SVD_CONVERGENCE: f64 = 1e-12;
const SVD_ITERATIONS: usize = 1000;
/// How far the singular values of the standardized covariance may sum away
/// from 1 before a no-scale registration is warned about.
const SINGULAR_VALUE_SUM_TOLERANCE: f64 = 0.1;

/// How the uniform scale factor is computed when scaling is enabled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScaleMethod {
    /// The trace of the rotated covariance matrix over the summed squares of
    /// the centered query points: the variance ratio between the two sets.
    #[default]
    Trace,
    /// The ratio of the target-to-query RMS deviations. May be more
    /// sensitive to outliers.
    Rms,
}

/// SVD-based orthogonal Procrustes registration.
///
/// Closely related to Horn's quaternion method (`absolute-orientation` in
/// this workspace); the rotation simply comes out of a singular value
/// decomposition instead of a quaternion eigenproblem.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProcrustesRegistration {
    /// Solve for a uniform scale factor. When disabled the scale is exactly 1.
    pub do_scale: bool,
    /// Solve for a translation. When disabled the translation is zero.
    pub do_translation: bool,
    /// Divide each centered set by its own Frobenius norm before estimating
    /// the rotation, removing scale effects from the estimation itself.
    pub standardize_points: bool,
    /// Keep the returned rotation proper (determinant +1) by flipping the
    /// sign of the singular vector of the smallest singular value when the
    /// orthogonal factor composition comes out as a reflection. Disable this
    /// only when the transformation is known to involve a reflection.
    pub enforce_valid_rotation: bool,
    /// How to compute the scale factor. Ignored when
    /// [`ProcrustesRegistration::do_scale`] is disabled.
    pub scale_method: ScaleMethod,
    /// The epsilon on which convergence is considered achieved for the SVD
    /// solver.
    pub epsilon: f64,
    /// The maximum number of iterations of the SVD solver.
    pub iterations: usize,
}

impl ProcrustesRegistration {
    /// Creates a registration with all options enabled and trace-based
    /// scaling.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets [`ProcrustesRegistration::do_scale`].
    #[must_use]
    pub fn do_scale(self, do_scale: bool) -> Self {
        Self { do_scale, ..self }
    }

    /// Sets [`ProcrustesRegistration::do_translation`].
    #[must_use]
    pub fn do_translation(self, do_translation: bool) -> Self {
        Self {
            do_translation,
            ..self
        }
    }

    /// Sets [`ProcrustesRegistration::standardize_points`].
    #[must_use]
    pub fn standardize_points(self, standardize_points: bool) -> Self {
        Self {
            standardize_points,
            ..self
        }
    }

    /// Sets [`ProcrustesRegistration::enforce_valid_rotation`].
    #[must_use]
    pub fn enforce_valid_rotation(self, enforce_valid_rotation: bool) -> Self {
        Self {
            enforce_valid_rotation,
            ..self
        }
    }

    /// Sets [`ProcrustesRegistration::scale_method`].
    #[must_use]
    pub fn scale_method(self, scale_method: ScaleMethod) -> Self {
        Self {
            scale_method,
            ..self
        }
    }

    /// Registers the query points onto the target points.
    ///
    /// Both arguments may be 3×N or N×3 with equal N; the registered points
    /// come back in the query's orientation.
    ///
    /// ```
    /// use orthogonal_procrustes::ProcrustesRegistration;
    /// use registration_core::nalgebra::DMatrix;
    ///
    /// let query = DMatrix::from_row_slice(3, 4, &[
    ///     0.0, 1.0, 0.0, 0.0,
    ///     0.0, 0.0, 1.0, 0.0,
    ///     0.0, 0.0, 0.0, 1.0,
    /// ]);
    /// // The query uniformly scaled by 2.
    /// let target = query.clone() * 2.0;
    /// let result = ProcrustesRegistration::new().register(&query, &target).unwrap();
    /// assert!(result.metrics.rms_error < 1e-9);
    /// assert!((result.transform.scale - 2.0).abs() < 1e-9);
    /// ```
    pub fn register(
        &self,
        points_query: &DMatrix<f64>,
        points_target: &DMatrix<f64>,
    ) -> Result<RegistrationResult, RegistrationError> {
        let pair = PreparedPair::new(points_query, points_target)?;

        // Standardization removes scale from the rotation estimation by
        // dividing each centered set by its own Frobenius norm. The norms are
        // tracked so the scale computation can undo the division later; they
        // stay at 1.0 whenever standardization is disabled or skipped.
        let mut centered_query = pair.query.centered.clone();
        let mut centered_target = pair.target.centered.clone();
        let mut norm_query = 1.0;
        let mut norm_target = 1.0;
        if self.standardize_points {
            let frobenius_query = centered_query.norm();
            let frobenius_target = centered_target.norm();
            if frobenius_query > NEAR_ZERO_TOLERANCE && frobenius_target > NEAR_ZERO_TOLERANCE {
                centered_query.unscale_mut(frobenius_query);
                centered_target.unscale_mut(frobenius_target);
                norm_query = frobenius_query;
                norm_target = frobenius_target;
            } else if frobenius_query <= NEAR_ZERO_TOLERANCE {
                warn!("query points are degenerate with zero norm, skipping standardization");
            } else {
                warn!("target points are degenerate with zero norm, skipping standardization");
            }
        }
        let norm_product = norm_query * norm_target;

        // Cross-covariance of the (possibly standardized) centered sets,
        // divided by the combined norm so the rotation estimate carries no
        // scaling effect.
        let covariance = (&centered_query * centered_target.transpose()) / norm_product;

        // Typically with covariance H = U S Vᵀ the rotation is recovered as
        // R = V Uᵀ. Decomposing Hᵀ instead turns that into R = U Vᵀ and
        // saves the final transpose.
        let svd = covariance
            .transpose()
            .try_svd(true, true, self.epsilon, self.iterations)
            .ok_or(RegistrationError::NonConvergent(
                "singular value decomposition of the covariance matrix",
            ))?;
        let (u, mut v_t) = match (svd.u, svd.v_t) {
            (Some(u), Some(v_t)) => (u, v_t),
            _ => {
                return Err(RegistrationError::NonConvergent(
                    "singular value decomposition of the covariance matrix",
                ))
            }
        };

        let singular_sum = svd.singular_values.sum();
        if (1.0 - singular_sum).abs() > SINGULAR_VALUE_SUM_TOLERANCE && !self.do_scale {
            warn!(
                "singular values sum to {singular_sum}, off from 1.0 by more than \
                 {SINGULAR_VALUE_SUM_TOLERANCE}: a non-unity scale is likely being forced into \
                 a rigid transformation; consider enabling scaling to estimate a similarity \
                 transformation instead"
            );
        }

        let mut rotation = u * v_t;
        if rotation.determinant() < 0.0 && self.enforce_valid_rotation {
            // Proper rotation fix: negate the singular vector of the smallest
            // singular value. `try_svd` sorts singular values descending, so
            // that is the last row of Vᵀ.
            info!("rotation matrix determinant is negative, flipping the last singular vector");
            v_t.row_mut(2).neg_mut();
            rotation = u * v_t;
        }

        let mut scale = 1.0;
        if self.do_scale {
            // The standardized points have unit scale by construction, so the
            // scale estimate always uses the unstandardized centered sets.
            let sum_squares_query = pair.query.centered.norm_squared();
            let sum_squares_target = pair.target.centered.norm_squared();
            if sum_squares_query < NEAR_ZERO_TOLERANCE || sum_squares_target < NEAR_ZERO_TOLERANCE
            {
                info!("query or target points are degenerate with zero norm, setting scale factor to 1.0");
            } else {
                match self.scale_method {
                    ScaleMethod::Rms => {
                        let num_points = pair.len() as f64;
                        let mean_sum_squares_query = sum_squares_query / num_points;
                        let mean_sum_squares_target = sum_squares_target / num_points;
                        scale = (mean_sum_squares_target / mean_sum_squares_query).sqrt();
                    }
                    ScaleMethod::Trace => {
                        // The rotation and covariance were estimated in the
                        // standardized frame; multiplying by the squared norm
                        // product undoes the standardization of the trace.
                        let trace_covariance =
                            (rotation * covariance).trace() * norm_product * norm_product;
                        scale = trace_covariance / sum_squares_query;
                    }
                }
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

impl Default for ProcrustesRegistration {
    fn default() -> Self {
        Self {
            do_scale: true,
            do_translation: true,
            standardize_points: true,
            enforce_valid_rotation: true,
            scale_method: ScaleMethod::Trace,
            epsilon: SVD_CONVERGENCE,
            iterations: SVD_ITERATIONS,
        }
    }
}

impl Registrar for ProcrustesRegistration {
    fn register(
        &self,
        points_query: &DMatrix<f64>,
        points_target: &DMatrix<f64>,
    ) -> Result<RegistrationResult, RegistrationError> {
        ProcrustesRegistration::register(self, points_query, points_target)
    }
}
