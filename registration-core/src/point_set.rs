use crate::{PointSetName, ShapeError};
use nalgebra::{DMatrix, Matrix3xX, Vector3};

/// How the caller laid out a point set.
///
/// A 3×3 array is ambiguous and is taken as already being one point per
/// column, so no transpose happens in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLayout {
    /// One point per column.
    ThreeByN,
    /// One point per row.
    NByThree,
}

/// Validates a point-set array and normalizes it to one point per column.
///
/// Returns the 3×N matrix together with the layout the caller used, so that
/// output produced from it can be restored with [`restore_layout`].
pub fn normalize_layout(
    points: &DMatrix<f64>,
    name: PointSetName,
) -> Result<(Matrix3xX<f64>, PointLayout), ShapeError> {
    let (rows, cols) = points.shape();
    if rows != 3 && cols != 3 {
        return Err(ShapeError::InvalidDimensions { name, rows, cols });
    }
    let (normalized, layout) = if rows == 3 {
        (
            Matrix3xX::from_iterator(cols, points.iter().copied()),
            PointLayout::ThreeByN,
        )
    } else {
        let transposed = points.transpose();
        (
            Matrix3xX::from_iterator(transposed.ncols(), transposed.iter().copied()),
            PointLayout::NByThree,
        )
    };
    if normalized.ncols() == 0 {
        return Err(ShapeError::Empty { name });
    }
    Ok((normalized, layout))
}

/// Returns a 3×N point set to the orientation the caller provided it in.
pub fn restore_layout(points: Matrix3xX<f64>, layout: PointLayout) -> DMatrix<f64> {
    match layout {
        PointLayout::ThreeByN => {
            DMatrix::from_iterator(3, points.ncols(), points.iter().copied())
        }
        PointLayout::NByThree => {
            let transposed = points.transpose();
            DMatrix::from_iterator(points.ncols(), 3, transposed.iter().copied())
        }
    }
}

/// Mean position of a point set.
pub fn centroid(points: &Matrix3xX<f64>) -> Vector3<f64> {
    points.column_mean()
}

/// Subtracts the centroid from every point.
pub fn center(points: &Matrix3xX<f64>, centroid: &Vector3<f64>) -> Matrix3xX<f64> {
    let mut centered = points.clone();
    for mut column in centered.column_iter_mut() {
        column -= centroid;
    }
    centered
}

/// A point set normalized to 3×N, with its centroid and centered form.
///
/// The centered points feed rotation and scale estimation only. Translation
/// is computed from the centroids, which live in the original coordinate
/// space of the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSet {
    /// Orientation-normalized points, one per column.
    pub points: Matrix3xX<f64>,
    /// Mean position of the set.
    pub centroid: Vector3<f64>,
    /// `points` with the centroid subtracted from every column.
    pub centered: Matrix3xX<f64>,
}

impl PreparedSet {
    fn new(points: Matrix3xX<f64>) -> Self {
        let centroid = centroid(&points);
        let centered = center(&points, &centroid);
        Self {
            points,
            centroid,
            centered,
        }
    }
}

/// Validated query/target inputs, ready for rotation estimation.
///
/// This is the preprocessing shared by every registration strategy: shape
/// validation, orientation normalization, count matching, and centering.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPair {
    /// The points being registered onto the target.
    pub query: PreparedSet,
    /// The reference points.
    pub target: PreparedSet,
    /// Layout of the query input, restored on the registered output.
    pub query_layout: PointLayout,
}

impl PreparedPair {
    /// Validates and preprocesses a query/target pair.
    pub fn new(
        points_query: &DMatrix<f64>,
        points_target: &DMatrix<f64>,
    ) -> Result<Self, ShapeError> {
        let (query, query_layout) = normalize_layout(points_query, PointSetName::Query)?;
        let (target, _) = normalize_layout(points_target, PointSetName::Target)?;
        if query.ncols() != target.ncols() {
            return Err(ShapeError::CountMismatch {
                query: query.ncols(),
                target: target.ncols(),
            });
        }
        Ok(Self {
            query: PreparedSet::new(query),
            target: PreparedSet::new(target),
            query_layout,
        })
    }

    /// Number of points in each set.
    pub fn len(&self) -> usize {
        self.query.points.ncols()
    }

    /// Always false: empty inputs are rejected during validation.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
