//! The time-stepping loop.
//!
//! A [`TimeLoop`] advances an initialized model over a horizon, one model time step per
//! iteration.
//! Each iteration pushes the configured inputs, calls `update` and pulls the configured
//! outputs.
//! The first failure aborts the loop and is returned as-is; whatever the model did before the
//! failure stays done, and the caller remains responsible for finalizing the model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::buffer::ValueBuffer;
use crate::config::RunConfig;
use crate::errors::BmiResult;
use crate::handle::ModelHandle;
use crate::session::Session;
use crate::time::step_count;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Horizon {
    Duration(f64),
    UntilEnd,
}

/// The state of a run after one iteration.
#[derive(Debug)]
pub struct StepRecord<'a> {
    /// Zero-based iteration index
    pub iteration: usize,
    /// Model time once the update completed
    pub time: f64,
    /// Values pulled for each output during this iteration
    pub outputs: &'a BTreeMap<String, ValueBuffer>,
}

/// The outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub iterations: usize,
    pub start_time: f64,
    pub end_time: f64,
    /// The last values pulled for each output
    pub outputs: BTreeMap<String, ValueBuffer>,
}

/// A stepping plan: how long to run, and what to exchange on every iteration.
///
/// ```rust,ignore
/// let summary = TimeLoop::new(360.0)
///     .with_input("sea_surface_water_wave__height", vec![2.0])
///     .with_output("sea_water__depth")
///     .run(&mut model)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeLoop {
    horizon: Horizon,
    inputs: Vec<(String, ValueBuffer)>,
    outputs: Vec<String>,
}

impl TimeLoop {
    /// Runs for `duration` units of model time.
    pub fn new(duration: f64) -> Self {
        Self {
            horizon: Horizon::Duration(duration),
            inputs: vec![],
            outputs: vec![],
        }
    }

    /// Runs from the model's current time until its declared end time.
    pub fn until_end() -> Self {
        Self {
            horizon: Horizon::UntilEnd,
            inputs: vec![],
            outputs: vec![],
        }
    }

    /// Sends `values` to `name` before every update.
    pub fn with_input(mut self, name: impl Into<String>, values: impl Into<ValueBuffer>) -> Self {
        self.inputs.push((name.into(), values.into()));
        self
    }

    /// Pulls the values of `name` after every update.
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    /// Builds the loop described by a driver's `[run]` section.
    ///
    /// Input buffers are sized and typed from the model's declarations, so `handle` must
    /// already be initialized.
    pub fn from_run_config<S: Session>(
        handle: &mut ModelHandle<S>,
        run: &RunConfig,
    ) -> BmiResult<Self> {
        let mut time_loop = match run.duration {
            Some(duration) => Self::new(duration),
            None => Self::until_end(),
        };

        for input in &run.inputs {
            let element_type = handle.var_type(&input.name)?;
            let grid = handle.grid_id_for(&input.name)?;
            let shape = handle.grid_shape(grid)?;
            time_loop = time_loop.with_input(&input.name, input.build(element_type, &shape)?);
        }
        for name in &run.outputs {
            handle.catalog().require(name)?;
            time_loop = time_loop.with_output(name);
        }
        Ok(time_loop)
    }

    pub fn run<S: Session>(&self, handle: &mut ModelHandle<S>) -> BmiResult<RunSummary> {
        self.run_with(handle, |_| Ok(()))
    }

    /// Runs the loop, calling `on_step` after every iteration.
    ///
    /// An error returned by `on_step` aborts the loop like any other failure.
    pub fn run_with<S, F>(
        &self,
        handle: &mut ModelHandle<S>,
        mut on_step: F,
    ) -> BmiResult<RunSummary>
    where
        S: Session,
        F: FnMut(&StepRecord<'_>) -> BmiResult<()>,
    {
        let time_step = handle.time_step()?;
        let start_time = handle.current_time()?;
        let duration = match self.horizon {
            Horizon::Duration(duration) => duration,
            Horizon::UntilEnd => (handle.end_time()? - start_time).max(0.0),
        };
        let iterations = step_count(duration, time_step)?;
        info!(
            endpoint = handle.endpoint(),
            iterations,
            start_time,
            time_step,
            "Starting time loop"
        );

        let mut outputs = BTreeMap::new();
        for iteration in 0..iterations {
            for (name, values) in &self.inputs {
                handle.set_values(name, values)?;
            }

            handle.update()?;

            for name in &self.outputs {
                outputs.insert(name.clone(), handle.get_values(name)?);
            }

            let time = handle.current_time()?;
            debug!(iteration, time, "Completed iteration");
            on_step(&StepRecord {
                iteration,
                time,
                outputs: &outputs,
            })?;
        }

        let end_time = handle.current_time()?;
        info!(iterations, end_time, "Finished time loop");

        Ok(RunSummary {
            iterations,
            start_time,
            end_time,
            outputs,
        })
    }
}
