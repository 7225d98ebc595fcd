#![allow(dead_code)]
//! In-memory sessions used by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::buffer::{Values, ValueBuffer, ValuesMut};
use crate::config::{ConfigSource, EndpointConfig};
use crate::errors::{BmiError, BmiResult};
use crate::grid::{GridId, GridType};
use crate::session::{Connector, Session};
use crate::variable::ElementType;

pub(crate) const DEPTH: &str = "sea_water__depth";
pub(crate) const WAVE_HEIGHT: &str = "sea_surface_water_wave__height";
pub(crate) const BEDLOAD: &str = "land_surface_water_sediment~bedload__mass_flow_rate";
pub(crate) const CELL_COUNT: &str = "model_grid_cell__count";
pub(crate) const STATIONS: &str = "sea_water_station__elevation";

/// The shared record of every call made against an [`ExampleSession`].
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear()
    }
}

#[derive(Debug, Clone)]
struct ExampleVariable {
    grid: GridId,
    units: &'static str,
    input: bool,
    output: bool,
    values: ValueBuffer,
}

#[derive(Debug, Clone)]
struct ExampleGrid {
    grid_type: GridType,
    shape: Vec<usize>,
    size: usize,
}

/// A small coastline-like model.
///
/// Grid 0 is a 2x3 uniform rectilinear grid, grid 1 is a scalar and grid 2 holds four
/// unstructured points.
/// Each update deepens every cell by the wave height times the time step.
#[derive(Debug)]
pub(crate) struct ExampleSession {
    pub log: CallLog,
    pub time_step: f64,
    pub end_time: f64,
    /// Rejects `initialize` when set
    pub reject_config: bool,
    /// Fails the update which would move past this time
    pub fail_after: Option<f64>,
    /// Leaves the clock untouched on update
    pub frozen_clock: bool,
    /// Fails the variable name queries
    pub hide_names: bool,
    current_time: f64,
    variables: HashMap<&'static str, ExampleVariable>,
    grids: HashMap<GridId, ExampleGrid>,
}

impl ExampleSession {
    pub fn new() -> Self {
        let variables = HashMap::from([
            (
                DEPTH,
                ExampleVariable {
                    grid: 0,
                    units: "m",
                    input: false,
                    output: true,
                    values: ValueBuffer::Float64(vec![0.0; 6]),
                },
            ),
            (
                BEDLOAD,
                ExampleVariable {
                    grid: 0,
                    units: "kg / s",
                    input: true,
                    output: false,
                    values: ValueBuffer::Float64(vec![0.0; 6]),
                },
            ),
            (
                WAVE_HEIGHT,
                ExampleVariable {
                    grid: 1,
                    units: "m",
                    input: true,
                    output: false,
                    values: ValueBuffer::Float64(vec![0.0]),
                },
            ),
            (
                CELL_COUNT,
                ExampleVariable {
                    grid: 1,
                    units: "1",
                    input: false,
                    output: true,
                    values: ValueBuffer::Int32(vec![6]),
                },
            ),
            (
                STATIONS,
                ExampleVariable {
                    grid: 2,
                    units: "m",
                    input: true,
                    output: true,
                    values: ValueBuffer::Float64(vec![0.0; 4]),
                },
            ),
        ]);
        let grids = HashMap::from([
            (
                0,
                ExampleGrid {
                    grid_type: GridType::UniformRectilinear,
                    shape: vec![2, 3],
                    size: 6,
                },
            ),
            (
                1,
                ExampleGrid {
                    grid_type: GridType::Scalar,
                    shape: vec![],
                    size: 1,
                },
            ),
            (
                2,
                ExampleGrid {
                    grid_type: GridType::Unstructured,
                    shape: vec![4],
                    size: 4,
                },
            ),
        ]);

        Self {
            log: CallLog::default(),
            time_step: 1.0,
            end_time: 100.0,
            reject_config: false,
            fail_after: None,
            frozen_clock: false,
            hide_names: false,
            current_time: 0.0,
            variables,
            grids,
        }
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::new()
        }
    }

    fn variable(&self, name: &str) -> BmiResult<&ExampleVariable> {
        self.variables
            .get(name)
            .ok_or_else(|| BmiError::Remote(format!("no such variable: {}", name)))
    }

    fn grid(&self, grid: GridId) -> BmiResult<&ExampleGrid> {
        self.grids
            .get(&grid)
            .ok_or(BmiError::UnknownGrid { grid })
    }

    fn names(&self, select: fn(&ExampleVariable) -> bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .variables
            .iter()
            .filter(|(_, v)| select(v))
            .map(|(n, _)| n.to_string())
            .collect();
        names.sort();
        names
    }

    fn advance_to(&mut self, time: f64) -> BmiResult<()> {
        if let Some(limit) = self.fail_after {
            if time > limit {
                return Err(BmiError::Remote("model blew up".to_string()));
            }
        }
        let dt = time - self.current_time;
        let height = match &self.variables[WAVE_HEIGHT].values {
            ValueBuffer::Float64(v) => v[0],
            _ => 0.0,
        };
        if let Some(ExampleVariable {
            values: ValueBuffer::Float64(depth),
            ..
        }) = self.variables.get_mut(DEPTH)
        {
            depth.iter_mut().for_each(|d| *d += height * dt);
        }
        if !self.frozen_clock {
            self.current_time = time;
        }
        Ok(())
    }
}

impl Session for ExampleSession {
    fn initialize(&mut self, config: &ConfigSource) -> BmiResult<()> {
        self.log.push("initialize");
        if self.reject_config {
            return Err(BmiError::Remote(format!("cannot read {}", config)));
        }
        Ok(())
    }

    fn update(&mut self) -> BmiResult<()> {
        self.log.push("update");
        self.advance_to(self.current_time + self.time_step)
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        self.log.push("update_until");
        self.advance_to(time)
    }

    fn finalize(&mut self) -> BmiResult<()> {
        self.log.push("finalize");
        Ok(())
    }

    fn component_name(&mut self) -> BmiResult<String> {
        self.log.push("component_name");
        Ok("Example Coastline".to_string())
    }

    fn input_var_names(&mut self) -> BmiResult<Vec<String>> {
        self.log.push("input_var_names");
        if self.hide_names {
            return Err(BmiError::Remote("names unavailable".to_string()));
        }
        Ok(self.names(|v| v.input))
    }

    fn output_var_names(&mut self) -> BmiResult<Vec<String>> {
        self.log.push("output_var_names");
        Ok(self.names(|v| v.output))
    }

    fn var_grid(&mut self, name: &str) -> BmiResult<GridId> {
        self.log.push("var_grid");
        Ok(self.variable(name)?.grid)
    }

    fn var_type(&mut self, name: &str) -> BmiResult<ElementType> {
        self.log.push("var_type");
        Ok(self.variable(name)?.values.element_type())
    }

    fn var_units(&mut self, name: &str) -> BmiResult<String> {
        self.log.push("var_units");
        Ok(self.variable(name)?.units.to_string())
    }

    fn start_time(&mut self) -> BmiResult<f64> {
        self.log.push("start_time");
        Ok(0.0)
    }

    fn end_time(&mut self) -> BmiResult<f64> {
        self.log.push("end_time");
        Ok(self.end_time)
    }

    fn current_time(&mut self) -> BmiResult<f64> {
        self.log.push("current_time");
        Ok(self.current_time)
    }

    fn time_step(&mut self) -> BmiResult<f64> {
        self.log.push("time_step");
        Ok(self.time_step)
    }

    fn time_units(&mut self) -> BmiResult<String> {
        self.log.push("time_units");
        Ok("d".to_string())
    }

    fn grid_type(&mut self, grid: GridId) -> BmiResult<GridType> {
        self.log.push("grid_type");
        Ok(self.grid(grid)?.grid_type)
    }

    fn grid_rank(&mut self, grid: GridId) -> BmiResult<usize> {
        self.log.push("grid_rank");
        Ok(self.grid(grid)?.shape.len())
    }

    fn grid_size(&mut self, grid: GridId) -> BmiResult<usize> {
        self.log.push("grid_size");
        Ok(self.grid(grid)?.size)
    }

    fn grid_shape(&mut self, grid: GridId, shape: &mut [usize]) -> BmiResult<()> {
        self.log.push("grid_shape");
        shape.copy_from_slice(&self.grid(grid)?.shape);
        Ok(())
    }

    fn grid_spacing(&mut self, grid: GridId, spacing: &mut [f64]) -> BmiResult<()> {
        self.log.push("grid_spacing");
        self.grid(grid)?;
        spacing.fill(100.0);
        Ok(())
    }

    fn grid_origin(&mut self, grid: GridId, origin: &mut [f64]) -> BmiResult<()> {
        self.log.push("grid_origin");
        self.grid(grid)?;
        origin.fill(0.0);
        Ok(())
    }

    fn get_value(&mut self, name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        self.log.push("get_value");
        let variable = self.variable(name)?;
        if dest.copy_from(&variable.values) {
            Ok(())
        } else {
            Err(BmiError::Remote(format!("bad buffer for {}", name)))
        }
    }

    fn set_value(&mut self, name: &str, src: Values<'_>) -> BmiResult<()> {
        self.log.push("set_value");
        let variable = self
            .variables
            .get_mut(name)
            .ok_or_else(|| BmiError::Remote(format!("no such variable: {}", name)))?;
        variable.values = src.to_buffer();
        Ok(())
    }

    fn disconnect(&mut self) {
        self.log.push("disconnect");
    }
}

/// Hands out [`ExampleSession`]s sharing a single [`CallLog`].
#[derive(Debug, Default)]
pub(crate) struct ExampleConnector {
    pub log: CallLog,
}

impl Connector for ExampleConnector {
    type Session = ExampleSession;

    fn connect(&self, endpoint: &EndpointConfig) -> BmiResult<ExampleSession> {
        if endpoint.address.starts_with("example://") {
            Ok(ExampleSession::with_log(self.log.clone()))
        } else {
            Err(BmiError::Remote(format!(
                "unsupported address {}",
                endpoint.address
            )))
        }
    }
}
