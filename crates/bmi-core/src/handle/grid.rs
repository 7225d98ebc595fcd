//! Grid introspection.
//!
//! Shape discovery is decoupled from value exchange: a caller resolves a variable's grid,
//! asks for its rank, and allocates exactly `rank` entries to receive the shape, spacing or
//! origin.
//! The `*_into` methods take such caller-allocated buffers and reject any whose length
//! differs from the rank before calling the model.

use crate::errors::{BmiError, BmiResult};
use crate::grid::{check_length, shape_size, GridDescriptor, GridId, GridType};
use crate::lifecycle::Operation;
use crate::session::Session;

use super::ModelHandle;

impl<S: Session> ModelHandle<S> {
    /// Resolves the grid on which `name` is defined.
    pub fn grid_id_for(&mut self, name: &str) -> BmiResult<GridId> {
        self.lifecycle.check(Operation::Query)?;
        self.catalog.require(name)?;
        self.session.var_grid(name)
    }

    pub fn grid_type(&mut self, grid: GridId) -> BmiResult<GridType> {
        self.lifecycle.check(Operation::Query)?;
        self.session.grid_type(grid)
    }

    pub fn grid_rank(&mut self, grid: GridId) -> BmiResult<usize> {
        self.lifecycle.check(Operation::Query)?;
        self.session.grid_rank(grid)
    }

    /// Number of values held by a variable on `grid`.
    ///
    /// For structured grids this is the product of the shape (1 for a rank-0 grid).
    pub fn grid_size(&mut self, grid: GridId) -> BmiResult<usize> {
        self.lifecycle.check(Operation::Query)?;
        self.size_of(grid)
    }

    pub fn grid_shape(&mut self, grid: GridId) -> BmiResult<Vec<usize>> {
        self.lifecycle.check(Operation::Query)?;
        self.shape_of(grid)
    }

    /// Fills a caller-allocated `shape` buffer of exactly `grid_rank(grid)` entries.
    pub fn grid_shape_into(&mut self, grid: GridId, shape: &mut [usize]) -> BmiResult<()> {
        self.lifecycle.check(Operation::Query)?;
        let rank = self.session.grid_rank(grid)?;
        check_length(format!("shape of grid {}", grid), rank, shape.len())?;
        self.session.grid_shape(grid, shape)
    }

    pub fn grid_spacing(&mut self, grid: GridId) -> BmiResult<Vec<f64>> {
        self.lifecycle.check(Operation::Query)?;
        let rank = self.uniform_rank(grid, "spacing")?;
        let mut spacing = vec![0.0; rank];
        self.session.grid_spacing(grid, &mut spacing)?;
        Ok(spacing)
    }

    /// Fills a caller-allocated `spacing` buffer of exactly `grid_rank(grid)` entries.
    pub fn grid_spacing_into(&mut self, grid: GridId, spacing: &mut [f64]) -> BmiResult<()> {
        self.lifecycle.check(Operation::Query)?;
        let rank = self.uniform_rank(grid, "spacing")?;
        check_length(format!("spacing of grid {}", grid), rank, spacing.len())?;
        self.session.grid_spacing(grid, spacing)
    }

    pub fn grid_origin(&mut self, grid: GridId) -> BmiResult<Vec<f64>> {
        self.lifecycle.check(Operation::Query)?;
        let rank = self.uniform_rank(grid, "origin")?;
        let mut origin = vec![0.0; rank];
        self.session.grid_origin(grid, &mut origin)?;
        Ok(origin)
    }

    /// Fills a caller-allocated `origin` buffer of exactly `grid_rank(grid)` entries.
    pub fn grid_origin_into(&mut self, grid: GridId, origin: &mut [f64]) -> BmiResult<()> {
        self.lifecycle.check(Operation::Query)?;
        let rank = self.uniform_rank(grid, "origin")?;
        check_length(format!("origin of grid {}", grid), rank, origin.len())?;
        self.session.grid_origin(grid, origin)
    }

    /// Collects all metadata of `grid` and checks it for consistency.
    pub fn describe_grid(&mut self, grid: GridId) -> BmiResult<GridDescriptor> {
        self.lifecycle.check(Operation::Query)?;
        let grid_type = self.session.grid_type(grid)?;
        let rank = self.session.grid_rank(grid)?;
        let shape = self.shape_of(grid)?;

        let (spacing, origin) = if grid_type.is_uniform() {
            let mut spacing = vec![0.0; rank];
            let mut origin = vec![0.0; rank];
            self.session.grid_spacing(grid, &mut spacing)?;
            self.session.grid_origin(grid, &mut origin)?;
            (Some(spacing), Some(origin))
        } else {
            (None, None)
        };

        let descriptor = GridDescriptor {
            id: grid,
            grid_type,
            rank,
            shape,
            spacing,
            origin,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub(super) fn shape_of(&mut self, grid: GridId) -> BmiResult<Vec<usize>> {
        let rank = self.session.grid_rank(grid)?;
        let mut shape = vec![0; rank];
        self.session.grid_shape(grid, &mut shape)?;
        Ok(shape)
    }

    pub(super) fn size_of(&mut self, grid: GridId) -> BmiResult<usize> {
        match self.session.grid_type(grid)? {
            GridType::Scalar
            | GridType::UniformRectilinear
            | GridType::Rectilinear
            | GridType::StructuredQuadrilateral => Ok(shape_size(&self.shape_of(grid)?)),
            GridType::Points | GridType::Vector | GridType::Unstructured => {
                self.session.grid_size(grid)
            }
        }
    }

    fn uniform_rank(&mut self, grid: GridId, operation: &str) -> BmiResult<usize> {
        let grid_type = self.session.grid_type(grid)?;
        if !grid_type.is_uniform() {
            return Err(BmiError::UnsupportedGrid {
                grid,
                grid_type,
                operation: operation.to_string(),
            });
        }
        self.session.grid_rank(grid)
    }
}
