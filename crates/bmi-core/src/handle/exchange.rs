//! Value exchange.
//!
//! Values cross the boundary as flat buffers in row-major order.
//! Before anything is sent or requested, the buffer is checked against the variable's
//! declared element type and the number of values held by its grid.
//! Grid metadata is re-queried on every exchange, so models whose grids change between
//! updates are handled.

use ndarray::ArrayD;

use crate::array::reshape;
use crate::buffer::{Element, ValueBuffer};
use crate::errors::{BmiError, BmiResult};
use crate::grid::check_length;
use crate::lifecycle::Operation;
use crate::session::Session;
use crate::variable::ElementType;

use super::ModelHandle;

impl<S: Session> ModelHandle<S> {
    /// Copies the current values of `name` into `dest`.
    ///
    /// `dest` must hold exactly as many values as the variable's grid.
    pub fn get_value<T: Element>(&mut self, name: &str, dest: &mut [T]) -> BmiResult<()> {
        self.check_exchange(name, T::ELEMENT_TYPE, dest.len())?;
        self.session.get_value(name, T::values_mut(dest))
    }

    /// Sends new values for `name`.
    ///
    /// `src` must hold exactly as many values as the variable's grid.
    pub fn set_value<T: Element>(&mut self, name: &str, src: &[T]) -> BmiResult<()> {
        self.check_exchange(name, T::ELEMENT_TYPE, src.len())?;
        self.session.set_value(name, T::values(src))
    }

    /// Allocates a buffer of the declared type and size and fills it with the values of `name`.
    pub fn get_values(&mut self, name: &str) -> BmiResult<ValueBuffer> {
        self.lifecycle.check(Operation::Exchange)?;
        self.catalog.require(name)?;

        let element_type = self.session.var_type(name)?;
        let size = self.variable_size(name)?;
        let mut buffer = ValueBuffer::zeros(element_type, size);
        self.session.get_value(name, buffer.as_values_mut())?;
        Ok(buffer)
    }

    pub fn set_values(&mut self, name: &str, values: &ValueBuffer) -> BmiResult<()> {
        self.check_exchange(name, values.element_type(), values.len())?;
        self.session.set_value(name, values.as_values())
    }

    /// The values of `name` shaped like its grid.
    ///
    /// Integer and single precision values are widened to `f64`.
    pub fn get_array(&mut self, name: &str) -> BmiResult<ArrayD<f64>> {
        let values = self.get_values(name)?;
        let grid = self.session.var_grid(name)?;
        let shape = self.shape_of(grid)?;
        reshape(values.to_f64(), &shape)
    }

    fn check_exchange(
        &mut self,
        name: &str,
        element_type: ElementType,
        len: usize,
    ) -> BmiResult<()> {
        self.lifecycle.check(Operation::Exchange)?;
        self.catalog.require(name)?;

        let declared = self.session.var_type(name)?;
        if declared != element_type {
            return Err(BmiError::DataTypeMismatch {
                variable: name.to_string(),
                expected: declared,
                actual: element_type,
            });
        }

        let expected = self.variable_size(name)?;
        check_length(format!("variable '{}'", name), expected, len)
    }

    fn variable_size(&mut self, name: &str) -> BmiResult<usize> {
        let grid = self.session.var_grid(name)?;
        self.size_of(grid)
    }
}
