use nalgebra::{Matrix3, Matrix3x4, Matrix3xX, Matrix4xX, Vector3};

/// The transformation produced by registration: a rotation, a uniform scale
/// factor, and a translation, mapping query points onto target points as
/// `p' = scale * rotation * p + translation`.
///
/// When scaling is disabled the scale factor is exactly 1 and the transform
/// is rigid. The 3×4 homogeneous composition satisfies
/// `matrix.columns(0, 3) == rotation * scale` and
/// `matrix.column(3) == translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityTransform {
    /// The 3×4 homogeneous composition of the parts.
    pub matrix: Matrix3x4<f64>,
    /// The rotation component. Orthonormal with determinant +1 whenever a
    /// valid rotation is enforced by the producing strategy.
    pub rotation: Matrix3<f64>,
    /// The translation component, in the coordinate space of the inputs.
    pub translation: Vector3<f64>,
    /// The uniform scale factor.
    pub scale: f64,
}

impl SimilarityTransform {
    /// Composes the homogeneous matrix from the individual parts.
    pub fn from_parts(rotation: Matrix3<f64>, scale: f64, translation: Vector3<f64>) -> Self {
        let mut matrix = Matrix3x4::zeros();
        matrix
            .fixed_columns_mut::<3>(0)
            .copy_from(&(rotation * scale));
        matrix.set_column(3, &translation);
        Self {
            matrix,
            rotation,
            translation,
            scale,
        }
    }

    /// The transform that maps every point onto itself.
    pub fn identity() -> Self {
        Self::from_parts(Matrix3::identity(), 1.0, Vector3::zeros())
    }

    /// Applies the transform to a 3×N point set.
    ///
    /// The points are augmented with a row of ones and multiplied through the
    /// homogeneous matrix, so rotation, scale, and translation are applied in
    /// one pass.
    pub fn apply(&self, points: &Matrix3xX<f64>) -> Matrix3xX<f64> {
        let mut homogeneous = Matrix4xX::from_element(points.ncols(), 1.0);
        homogeneous.fixed_rows_mut::<3>(0).copy_from(points);
        self.matrix * homogeneous
    }
}

impl Default for SimilarityTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    #[test]
    fn matrix_composition_invariant() {
        let rotation = *Rotation3::from_euler_angles(0.3, -0.2, 0.9).matrix();
        let translation = Vector3::new(-1.0, 4.0, 0.5);
        let transform = SimilarityTransform::from_parts(rotation, 2.5, translation);
        assert_relative_eq!(
            transform.matrix.fixed_columns::<3>(0).into_owned(),
            rotation * 2.5
        );
        assert_relative_eq!(transform.matrix.column(3).into_owned(), translation);
    }

    #[test]
    fn applies_scale_rotation_then_translation() {
        let rotation = *Rotation3::from_euler_angles(0.1, 0.2, 0.3).matrix();
        let translation = Vector3::new(1.0, 2.0, 3.0);
        let scale = 2.0;
        let transform = SimilarityTransform::from_parts(rotation, scale, translation);
        let points = Matrix3xX::from_column_slice(&[0.5, -1.0, 2.0, 4.0, 0.0, -3.0]);
        let transformed = transform.apply(&points);
        for (input, output) in points.column_iter().zip(transformed.column_iter()) {
            let expected = scale * rotation * input + translation;
            assert_relative_eq!(output.into_owned(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn identity_leaves_points_unchanged() {
        let points = Matrix3xX::from_column_slice(&[1.0, 2.0, 3.0, -4.0, 5.0, -6.0]);
        assert_relative_eq!(SimilarityTransform::identity().apply(&points), points);
    }
}
