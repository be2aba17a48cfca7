use core::fmt;
use thiserror::Error;

/// Identifies which point-set argument a [`ShapeError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSetName {
    /// The points being transformed onto the target.
    Query,
    /// The reference points the query is aligned onto.
    Target,
    /// Query points that have already been registered onto the target.
    Registered,
}

impl fmt::Display for PointSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PointSetName::Query => "query",
            PointSetName::Target => "target",
            PointSetName::Registered => "registered",
        })
    }
}

/// Fatal input-validation failure. Shape and count mismatches are
/// unrecoverable and abort the call before any numeric work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Neither dimension of the array is 3, so it cannot be interpreted as a
    /// set of 3D points in either orientation.
    #[error("{name} points must be 3xN or Nx3, got {rows}x{cols}")]
    InvalidDimensions {
        /// Which argument failed.
        name: PointSetName,
        /// Number of rows in the offending array.
        rows: usize,
        /// Number of columns in the offending array.
        cols: usize,
    },
    /// The array holds zero points.
    #[error("{name} points must contain at least one point")]
    Empty {
        /// Which argument failed.
        name: PointSetName,
    },
    /// Query and target hold different numbers of points.
    #[error(
        "query and target point arrays must have the same number of points \
         (query has {query}, target has {target})"
    )]
    CountMismatch {
        /// Number of points in the query set.
        query: usize,
        /// Number of points in the target set.
        target: usize,
    },
    /// The two arrays handed to the metrics computation differ in shape.
    #[error("point sets must have the same shape ({rows_a}x{cols_a} vs {rows_b}x{cols_b})")]
    ShapeMismatch {
        /// Rows of the first array.
        rows_a: usize,
        /// Columns of the first array.
        cols_a: usize,
        /// Rows of the second array.
        rows_b: usize,
        /// Columns of the second array.
        cols_b: usize,
    },
}

/// Any failure a registration strategy can report.
///
/// Shape violations pass through [`ShapeError`] unchanged; the extra variant
/// covers the iterative eigen/SVD solvers failing to converge, which is a
/// hard error rather than a condition to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Invalid input shapes or counts.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// An iterative decomposition did not converge.
    #[error("{0} did not converge")]
    NonConvergent(&'static str),
}
