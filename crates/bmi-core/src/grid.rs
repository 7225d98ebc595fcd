//! Grid metadata types.
//!
//! Every variable is defined on a grid identified by an integer id.
//! Several variables may share a grid.
//! The grid describes how the flat exchange buffer of a variable maps onto space:
//! a buffer holds `product(shape)` values in row-major order.
//!
//! ```rust
//! use bmi_core::grid::{GridDescriptor, GridType};
//!
//! let grid = GridDescriptor {
//!     id: 0,
//!     grid_type: GridType::UniformRectilinear,
//!     rank: 2,
//!     shape: vec![100, 200],
//!     spacing: Some(vec![1000.0, 1000.0]),
//!     origin: Some(vec![0.0, 0.0]),
//! };
//! grid.validate().unwrap();
//! assert_eq!(grid.size(), 20000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{BmiError, BmiResult};

/// Identifier of a grid within a model.
pub type GridId = i32;

/// Topology of a grid, using the BMI type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridType {
    /// A single value with no spatial structure (rank 0)
    Scalar,
    Points,
    Vector,
    Unstructured,
    StructuredQuadrilateral,
    Rectilinear,
    /// Regular grid described fully by shape, spacing and origin
    UniformRectilinear,
}

impl GridType {
    /// Whether spacing and origin are defined for this grid type.
    pub fn is_uniform(&self) -> bool {
        matches!(self, GridType::UniformRectilinear)
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GridType::Scalar => "scalar",
            GridType::Points => "points",
            GridType::Vector => "vector",
            GridType::Unstructured => "unstructured",
            GridType::StructuredQuadrilateral => "structured_quadrilateral",
            GridType::Rectilinear => "rectilinear",
            GridType::UniformRectilinear => "uniform_rectilinear",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for GridType {
    type Err = BmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older BMI implementations used "uniform_rectilinear_grid" and friends
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_suffix("_grid").unwrap_or(&name);
        match name {
            "scalar" => Ok(GridType::Scalar),
            "points" => Ok(GridType::Points),
            "vector" => Ok(GridType::Vector),
            "unstructured" => Ok(GridType::Unstructured),
            "structured_quadrilateral" => Ok(GridType::StructuredQuadrilateral),
            "rectilinear" => Ok(GridType::Rectilinear),
            "uniform_rectilinear" => Ok(GridType::UniformRectilinear),
            other => Err(BmiError::Remote(format!("unsupported grid type '{}'", other))),
        }
    }
}

/// Number of values held by a grid of the given shape.
///
/// A rank-0 (scalar) grid holds a single value.
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Snapshot of a grid's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    pub id: GridId,
    pub grid_type: GridType,
    /// Number of dimensions
    pub rank: usize,
    /// Extent of each dimension, slowest varying first
    pub shape: Vec<usize>,
    /// Distance between nodes along each dimension (uniform grids only)
    pub spacing: Option<Vec<f64>>,
    /// Coordinates of the first node along each dimension (uniform grids only)
    pub origin: Option<Vec<f64>>,
}

impl GridDescriptor {
    /// Number of values a buffer for a variable on this grid must hold.
    pub fn size(&self) -> usize {
        shape_size(&self.shape)
    }

    /// Checks that the per-dimension sequences all have `rank` entries.
    pub fn validate(&self) -> BmiResult<()> {
        check_length(format!("shape of grid {}", self.id), self.rank, self.shape.len())?;

        match (&self.spacing, &self.origin) {
            (Some(spacing), Some(origin)) => {
                check_length(
                    format!("spacing of grid {}", self.id),
                    self.rank,
                    spacing.len(),
                )?;
                check_length(
                    format!("origin of grid {}", self.id),
                    self.rank,
                    origin.len(),
                )?;
            }
            (None, None) if !self.grid_type.is_uniform() => {}
            _ => {
                return Err(BmiError::Remote(format!(
                    "grid {} of type {} has inconsistent spacing/origin metadata",
                    self.id, self.grid_type
                )))
            }
        }
        Ok(())
    }
}

/// Fails with [`BmiError::BufferSize`] unless `actual == expected`.
pub(crate) fn check_length(target: String, expected: usize, actual: usize) -> BmiResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(BmiError::BufferSize {
            target,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(shape: Vec<usize>, spacing: Vec<f64>) -> GridDescriptor {
        let rank = shape.len();
        GridDescriptor {
            id: 3,
            grid_type: GridType::UniformRectilinear,
            rank,
            shape,
            origin: Some(vec![0.0; spacing.len()]),
            spacing: Some(spacing),
        }
    }

    #[test]
    fn parse_grid_types() {
        assert_eq!(
            "uniform_rectilinear".parse::<GridType>().unwrap(),
            GridType::UniformRectilinear
        );
        assert_eq!(
            "uniform_rectilinear_grid".parse::<GridType>().unwrap(),
            GridType::UniformRectilinear
        );
        assert_eq!("Scalar".parse::<GridType>().unwrap(), GridType::Scalar);
        assert!("hexagonal".parse::<GridType>().is_err());
        assert_eq!(
            GridType::StructuredQuadrilateral.to_string(),
            "structured_quadrilateral"
        );
    }

    #[test]
    fn size_is_product_of_shape() {
        assert_eq!(shape_size(&[100, 200]), 20000);
        assert_eq!(shape_size(&[7]), 7);
        assert_eq!(shape_size(&[]), 1);
        assert_eq!(uniform(vec![3, 4, 5], vec![1.0, 1.0, 1.0]).size(), 60);
    }

    #[test]
    fn validate_uniform_grid() {
        assert!(uniform(vec![100, 200], vec![1000.0, 1000.0])
            .validate()
            .is_ok());

        let err = uniform(vec![100, 200], vec![1000.0]).validate().unwrap_err();
        assert_eq!(
            err,
            BmiError::BufferSize {
                target: "spacing of grid 3".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn validate_rank_mismatch() {
        let mut grid = uniform(vec![100, 200], vec![1.0, 1.0]);
        grid.rank = 3;
        assert!(matches!(
            grid.validate(),
            Err(BmiError::BufferSize { expected: 3, .. })
        ));
    }

    #[test]
    fn validate_non_uniform_grid() {
        let grid = GridDescriptor {
            id: 1,
            grid_type: GridType::Scalar,
            rank: 0,
            shape: vec![],
            spacing: None,
            origin: None,
        };
        assert!(grid.validate().is_ok());
        assert_eq!(grid.size(), 1);

        let grid = GridDescriptor {
            grid_type: GridType::UniformRectilinear,
            ..grid
        };
        assert!(grid.validate().is_err());
    }
}
