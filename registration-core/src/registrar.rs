use crate::{
    restore_layout, PreparedPair, RegistrationError, RegistrationMetrics, SimilarityTransform,
};
use nalgebra::{DMatrix, Matrix3, Vector3};

/// Result of registering a query point set onto a target point set.
///
/// A plain value: nothing is shared or retained between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationResult {
    /// The original query points with the estimated transform applied, in
    /// the same orientation the query was provided in.
    pub registered_points: DMatrix<f64>,
    /// The estimated transform mapping query points onto target points.
    pub transform: SimilarityTransform,
    /// Error metrics between the registered points and the target points.
    pub metrics: RegistrationMetrics,
}

/// The capability every registration strategy exposes: estimate the
/// similarity (or rigid) transform aligning `points_query` onto
/// `points_target` and report the residual error.
///
/// Both point sets may be 3×N or N×3 and must hold the same number of
/// points, paired one-to-one in corresponding order. Implementations are
/// stateless between calls and safe to share across threads.
pub trait Registrar {
    /// Registers the query points onto the target points.
    fn register(
        &self,
        points_query: &DMatrix<f64>,
        points_target: &DMatrix<f64>,
    ) -> Result<RegistrationResult, RegistrationError>;
}

/// The strategy-independent tail of registration.
///
/// Given the rotation and scale a strategy estimated from the centered
/// points, this computes the translation from the centroids, assembles the
/// transform, applies it to the original (uncentered) query points, and
/// scores the result against the target.
pub fn complete_registration(
    rotation: Matrix3<f64>,
    scale: f64,
    do_translation: bool,
    pair: &PreparedPair,
) -> RegistrationResult {
    // The centroids live in the original coordinate space, so the resulting
    // translation is defined in that same space.
    let translation = if do_translation {
        pair.target.centroid - scale * rotation * pair.query.centroid
    } else {
        Vector3::zeros()
    };
    let transform = SimilarityTransform::from_parts(rotation, scale, translation);
    let registered = transform.apply(&pair.query.points);
    let metrics = RegistrationMetrics::from_aligned(&registered, &pair.target.points);
    RegistrationResult {
        registered_points: restore_layout(registered, pair.query_layout),
        transform,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_inputs_give_identity_result() {
        let points = DMatrix::from_row_slice(3, 4, &[
            0.0, 1.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, 1.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        let pair = PreparedPair::new(&points, &points).unwrap();
        let result = complete_registration(Matrix3::identity(), 1.0, true, &pair);
        assert_relative_eq!(result.registered_points, points, epsilon = 1e-12);
        assert_relative_eq!(result.transform.translation, Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(result.metrics.rms_error, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn translation_disabled_leaves_zero_vector() {
        let query = DMatrix::from_row_slice(3, 2, &[
            1.0, 2.0, //
            0.0, 1.0, //
            3.0, -1.0,
        ]);
        let target = query.clone().add_scalar(10.0);
        let pair = PreparedPair::new(&query, &target).unwrap();
        let result = complete_registration(Matrix3::identity(), 1.0, false, &pair);
        assert_eq!(result.transform.translation, Vector3::zeros());
        // Without translation the offset shows up as residual error.
        assert!(result.metrics.rms_error > 1.0);
    }
}
