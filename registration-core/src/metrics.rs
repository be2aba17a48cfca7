use crate::{normalize_layout, PointSetName, ShapeError};
use nalgebra::{DMatrix, Matrix3xX};

/// Error summary between registered query points and target points.
///
/// Every metric derives from the per-point squared Euclidean distances, so
/// `max_error`, `lse_error`, and `mse_error` are in squared units while
/// `rms_error` is back in the units of the inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistrationMetrics {
    /// Maximum squared distance between corresponding points.
    pub max_error: f64,
    /// Least-squares error: the sum of squared distances.
    pub lse_error: f64,
    /// Mean squared error: `lse_error` divided by the number of points.
    pub mse_error: f64,
    /// Root mean square error: the square root of `mse_error`.
    pub rms_error: f64,
}

impl RegistrationMetrics {
    /// Computes the error metrics between two point sets of identical shape.
    ///
    /// Accepts 3×N or N×3 just like registration itself, but the two arrays
    /// must agree exactly on orientation as well as point count.
    pub fn compute(
        registered_points: &DMatrix<f64>,
        points_target: &DMatrix<f64>,
    ) -> Result<Self, ShapeError> {
        if registered_points.shape() != points_target.shape() {
            let (rows_a, cols_a) = registered_points.shape();
            let (rows_b, cols_b) = points_target.shape();
            return Err(ShapeError::ShapeMismatch {
                rows_a,
                cols_a,
                rows_b,
                cols_b,
            });
        }
        let (target, _) = normalize_layout(points_target, PointSetName::Target)?;
        let (registered, _) = normalize_layout(registered_points, PointSetName::Registered)?;
        Ok(Self::from_aligned(&registered, &target))
    }

    /// Metrics for two sets already normalized to 3×N with equal counts.
    pub(crate) fn from_aligned(
        registered: &Matrix3xX<f64>,
        target: &Matrix3xX<f64>,
    ) -> Self {
        debug_assert_eq!(registered.ncols(), target.ncols());
        let num_points = registered.ncols();
        let mut max_error = 0.0_f64;
        let mut lse_error = 0.0_f64;
        for (registered, target) in registered.column_iter().zip(target.column_iter()) {
            let squared_distance = (registered - target).norm_squared();
            max_error = max_error.max(squared_distance);
            lse_error += squared_distance;
        }
        let mse_error = lse_error / num_points as f64;
        Self {
            max_error,
            lse_error,
            mse_error,
            rms_error: mse_error.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn known_distances() {
        let registered = DMatrix::from_row_slice(3, 2, &[
            0.0, 1.0, //
            0.0, 0.0, //
            0.0, 0.0,
        ]);
        let target = DMatrix::from_row_slice(3, 2, &[
            0.0, 1.0, //
            3.0, 0.0, //
            4.0, 2.0,
        ]);
        let metrics = RegistrationMetrics::compute(&registered, &target).unwrap();
        // Distances are 5 and 2, so squared distances are 25 and 4.
        assert_relative_eq!(metrics.max_error, 25.0);
        assert_relative_eq!(metrics.lse_error, 29.0);
        assert_relative_eq!(metrics.mse_error, 14.5);
        assert_relative_eq!(metrics.rms_error, 14.5_f64.sqrt());
    }

    #[test]
    fn orientation_does_not_change_metrics() {
        let registered = DMatrix::from_row_slice(3, 4, &[
            0.1, 1.2, -0.3, 2.0, //
            0.5, -1.0, 0.0, 1.5, //
            2.0, 0.25, 1.0, -0.5,
        ]);
        let target = DMatrix::from_row_slice(3, 4, &[
            0.0, 1.0, -0.5, 2.5, //
            0.75, -1.25, 0.25, 1.0, //
            1.5, 0.5, 1.25, 0.0,
        ]);
        let wide = RegistrationMetrics::compute(&registered, &target).unwrap();
        let tall =
            RegistrationMetrics::compute(&registered.transpose(), &target.transpose()).unwrap();
        assert_relative_eq!(wide.max_error, tall.max_error);
        assert_relative_eq!(wide.lse_error, tall.lse_error);
        assert_relative_eq!(wide.mse_error, tall.mse_error);
        assert_relative_eq!(wide.rms_error, tall.rms_error);
    }

    #[test]
    fn identical_sets_have_zero_error() {
        let points = DMatrix::from_row_slice(3, 3, &[
            1.0, 2.0, 3.0, //
            4.0, 5.0, 6.0, //
            7.0, 8.0, 9.0,
        ]);
        let metrics = RegistrationMetrics::compute(&points, &points).unwrap();
        assert_eq!(metrics.max_error, 0.0);
        assert_eq!(metrics.lse_error, 0.0);
        assert_eq!(metrics.mse_error, 0.0);
        assert_eq!(metrics.rms_error, 0.0);
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let a = DMatrix::<f64>::zeros(3, 5);
        let b = DMatrix::<f64>::zeros(3, 6);
        assert_eq!(
            RegistrationMetrics::compute(&a, &b).unwrap_err(),
            ShapeError::ShapeMismatch {
                rows_a: 3,
                cols_a: 5,
                rows_b: 3,
                cols_b: 6,
            }
        );
    }

    #[test]
    fn rejects_non_point_dimensions() {
        let a = DMatrix::<f64>::zeros(4, 4);
        let b = DMatrix::<f64>::zeros(4, 4);
        assert!(matches!(
            RegistrationMetrics::compute(&a, &b),
            Err(ShapeError::InvalidDimensions {
                name: PointSetName::Target,
                ..
            })
        ));
    }
}
