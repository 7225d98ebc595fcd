//! Caller-side helpers for giving flat exchange buffers a shape.
//!
//! The exchange primitives move flat buffers only.
//! These helpers sit on top of them for callers that want to work with multi-dimensional
//! arrays, using the shape reported by grid introspection.
//!
//! ```rust
//! use bmi_core::array::{fill_region, reshape, RegionFill};
//!
//! // Sediment discharge at ten cells along the first row of a 3 x 20 grid
//! let shape = [3, 20];
//! let mut discharge = vec![0.0; 60];
//! fill_region(
//!     &mut discharge,
//!     &shape,
//!     &RegionFill { start: vec![0, 5], end: vec![1, 15], value: 5000.0 },
//! )
//! .unwrap();
//!
//! let array = reshape(discharge, &shape).unwrap();
//! assert_eq!(array[[0, 5]], 5000.0);
//! assert_eq!(array[[1, 5]], 0.0);
//! ```

use ndarray::{ArrayD, ArrayViewMutD, IxDyn, Slice};
use serde::{Deserialize, Serialize};

use crate::errors::{BmiError, BmiResult};
use crate::grid::{check_length, shape_size};

/// Assign a constant to the half-open box `start..end` of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFill {
    /// First index along each dimension (inclusive)
    pub start: Vec<usize>,
    /// Last index along each dimension (exclusive)
    pub end: Vec<usize>,
    pub value: f64,
}

/// Gives a flat row-major buffer the shape `shape`.
pub fn reshape(values: Vec<f64>, shape: &[usize]) -> BmiResult<ArrayD<f64>> {
    check_length(
        format!("array of shape {:?}", shape),
        shape_size(shape),
        values.len(),
    )?;
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|e| BmiError::Configuration(e.to_string()))
}

/// Flattens an array back into row-major order, ready for `set_value`.
pub fn flatten(array: &ArrayD<f64>) -> Vec<f64> {
    array.iter().copied().collect()
}

/// Sets every element of `region` in the flat buffer `values` to `region.value`.
pub fn fill_region(values: &mut [f64], shape: &[usize], region: &RegionFill) -> BmiResult<()> {
    let rank = shape.len();
    if region.start.len() != rank || region.end.len() != rank {
        return Err(BmiError::Configuration(format!(
            "region {:?}..{:?} does not match the rank {} of shape {:?}",
            region.start, region.end, rank, shape
        )));
    }
    for (axis, extent) in shape.iter().enumerate() {
        if region.start[axis] > region.end[axis] || region.end[axis] > *extent {
            return Err(BmiError::Configuration(format!(
                "region {:?}..{:?} is outside of shape {:?}",
                region.start, region.end, shape
            )));
        }
    }
    check_length(
        format!("array of shape {:?}", shape),
        shape_size(shape),
        values.len(),
    )?;

    let mut view = ArrayViewMutD::from_shape(IxDyn(shape), values)
        .map_err(|e| BmiError::Configuration(e.to_string()))?;
    view.slice_each_axis_mut(|ax| {
        let axis = ax.axis.index();
        Slice::from(region.start[axis]..region.end[axis])
    })
    .fill(region.value);
    Ok(())
}
