//! The boundary between the orchestration core and a model reached over a transport.
//!
//! A [`Connector`] establishes a [`Session`] with a remote endpoint.
//! The session exposes the BMI capability set as blocking round trips.
//! It is deliberately thin: it does not track lifecycle state or validate buffers,
//! both of which are the job of [`ModelHandle`](crate::handle::ModelHandle).
//!
//! Every method takes `&mut self`, so a single session can never have two calls in flight.
//! Implementations decide which model is behind the endpoint; the core never branches on it.
//! `Box<dyn Session>` is itself a session, which allows the model variant to be picked at
//! run time.

use crate::buffer::{Values, ValuesMut};
use crate::config::{ConfigSource, EndpointConfig};
use crate::errors::BmiResult;
use crate::grid::{GridId, GridType};
use crate::variable::ElementType;

/// A live connection to a single model instance.
pub trait Session: Send {
    /// Configures the model.
    ///
    /// The contents of `config` belong to the model and are not interpreted by the core.
    fn initialize(&mut self, config: &ConfigSource) -> BmiResult<()>;

    /// Advances the model by one internal time step.
    fn update(&mut self) -> BmiResult<()>;

    /// Advances the model until `time`.
    fn update_until(&mut self, time: f64) -> BmiResult<()>;

    /// Releases remote-side resources.
    fn finalize(&mut self) -> BmiResult<()>;

    fn component_name(&mut self) -> BmiResult<String>;
    fn input_var_names(&mut self) -> BmiResult<Vec<String>>;
    fn output_var_names(&mut self) -> BmiResult<Vec<String>>;

    fn var_grid(&mut self, name: &str) -> BmiResult<GridId>;
    fn var_type(&mut self, name: &str) -> BmiResult<ElementType>;
    fn var_units(&mut self, name: &str) -> BmiResult<String>;

    fn start_time(&mut self) -> BmiResult<f64>;
    fn end_time(&mut self) -> BmiResult<f64>;
    fn current_time(&mut self) -> BmiResult<f64>;
    fn time_step(&mut self) -> BmiResult<f64>;
    fn time_units(&mut self) -> BmiResult<String>;

    fn grid_type(&mut self, grid: GridId) -> BmiResult<GridType>;
    fn grid_rank(&mut self, grid: GridId) -> BmiResult<usize>;
    fn grid_size(&mut self, grid: GridId) -> BmiResult<usize>;

    /// Fills `shape`, which holds exactly `grid_rank(grid)` entries.
    fn grid_shape(&mut self, grid: GridId, shape: &mut [usize]) -> BmiResult<()>;

    /// Fills `spacing`, which holds exactly `grid_rank(grid)` entries.
    fn grid_spacing(&mut self, grid: GridId, spacing: &mut [f64]) -> BmiResult<()>;

    /// Fills `origin`, which holds exactly `grid_rank(grid)` entries.
    fn grid_origin(&mut self, grid: GridId, origin: &mut [f64]) -> BmiResult<()>;

    /// Copies the current values of `name` into `dest` in row-major order.
    fn get_value(&mut self, name: &str, dest: ValuesMut<'_>) -> BmiResult<()>;

    /// Sends new values for `name`, to be used by the next update.
    fn set_value(&mut self, name: &str, src: Values<'_>) -> BmiResult<()>;

    /// Releases the local end of the session.
    ///
    /// This must not fail. Implementations swallow errors and clean up what they can.
    fn disconnect(&mut self);
}

/// Establishes sessions with model endpoints.
pub trait Connector {
    type Session: Session;

    /// Connects to `endpoint`, failing with [`BmiError::Connection`](crate::errors::BmiError)
    /// if it cannot be reached.
    fn connect(&self, endpoint: &EndpointConfig) -> BmiResult<Self::Session>;
}

impl<S: Session + ?Sized> Session for Box<S> {
    fn initialize(&mut self, config: &ConfigSource) -> BmiResult<()> {
        (**self).initialize(config)
    }

    fn update(&mut self) -> BmiResult<()> {
        (**self).update()
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        (**self).update_until(time)
    }

    fn finalize(&mut self) -> BmiResult<()> {
        (**self).finalize()
    }

    fn component_name(&mut self) -> BmiResult<String> {
        (**self).component_name()
    }

    fn input_var_names(&mut self) -> BmiResult<Vec<String>> {
        (**self).input_var_names()
    }

    fn output_var_names(&mut self) -> BmiResult<Vec<String>> {
        (**self).output_var_names()
    }

    fn var_grid(&mut self, name: &str) -> BmiResult<GridId> {
        (**self).var_grid(name)
    }

    fn var_type(&mut self, name: &str) -> BmiResult<ElementType> {
        (**self).var_type(name)
    }

    fn var_units(&mut self, name: &str) -> BmiResult<String> {
        (**self).var_units(name)
    }

    fn start_time(&mut self) -> BmiResult<f64> {
        (**self).start_time()
    }

    fn end_time(&mut self) -> BmiResult<f64> {
        (**self).end_time()
    }

    fn current_time(&mut self) -> BmiResult<f64> {
        (**self).current_time()
    }

    fn time_step(&mut self) -> BmiResult<f64> {
        (**self).time_step()
    }

    fn time_units(&mut self) -> BmiResult<String> {
        (**self).time_units()
    }

    fn grid_type(&mut self, grid: GridId) -> BmiResult<GridType> {
        (**self).grid_type(grid)
    }

    fn grid_rank(&mut self, grid: GridId) -> BmiResult<usize> {
        (**self).grid_rank(grid)
    }

    fn grid_size(&mut self, grid: GridId) -> BmiResult<usize> {
        (**self).grid_size(grid)
    }

    fn grid_shape(&mut self, grid: GridId, shape: &mut [usize]) -> BmiResult<()> {
        (**self).grid_shape(grid, shape)
    }

    fn grid_spacing(&mut self, grid: GridId, spacing: &mut [f64]) -> BmiResult<()> {
        (**self).grid_spacing(grid, spacing)
    }

    fn grid_origin(&mut self, grid: GridId, origin: &mut [f64]) -> BmiResult<()> {
        (**self).grid_origin(grid, origin)
    }

    fn get_value(&mut self, name: &str, dest: ValuesMut<'_>) -> BmiResult<()> {
        (**self).get_value(name, dest)
    }

    fn set_value(&mut self, name: &str, src: Values<'_>) -> BmiResult<()> {
        (**self).set_value(name, src)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}
