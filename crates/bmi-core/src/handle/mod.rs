//! The model handle: exclusive, lifecycle-checked access to one model session.
//!
//! [`ModelHandle`] is the orchestration core.
//! It owns a [`Session`] and guards every call with the [`Lifecycle`] state machine, so that
//! operations issued out of order fail before reaching the remote model.
//! Buffers are validated against the model's declared grids before any value is exchanged.
//!
//! The handle is released on every exit path.
//! An explicit [`disconnect`](ModelHandle::disconnect) consumes it;
//! dropping it without disconnecting performs the same best-effort finalize and disconnect.
//! [`with_model`] wraps a whole session in a scope.
//!
//! ```rust,ignore
//! use bmi_core::config::{ConfigSource, EndpointConfig};
//! use bmi_core::handle::with_model;
//!
//! let depth = with_model(&connector, &EndpointConfig::new("local://reference"), |model| {
//!     model.initialize(&ConfigSource::Path("cem.toml".into()))?;
//!     let grid = model.grid_id_for("sea_water__depth")?;
//!     let mut depth = vec![0.0; model.grid_size(grid)?];
//!     model.get_value("sea_water__depth", &mut depth)?;
//!     Ok(depth)
//! })?;
//! ```

mod discovery;
mod exchange;
mod grid;

#[cfg(test)]
mod tests;

use tracing::{debug, info, warn};

use crate::config::{ConfigSource, EndpointConfig};
use crate::errors::{BmiError, BmiResult};
use crate::lifecycle::{Lifecycle, LifecycleState, Operation};
use crate::session::{Connector, Session};
use crate::time::validate_time_step;
use crate::variable::VariableCatalog;

/// Exclusive owner of a session with a single model instance.
///
/// Handles share no state with each other, so independent handles may be driven from
/// independent threads.
#[derive(Debug)]
pub struct ModelHandle<S: Session> {
    session: S,
    endpoint: String,
    lifecycle: Lifecycle,
    /// Declared variable names, captured when the model is initialized.
    catalog: VariableCatalog,
    released: bool,
}

impl<S: Session> ModelHandle<S> {
    /// Connects to `endpoint` through `connector`.
    pub fn connect<C>(connector: &C, endpoint: &EndpointConfig) -> BmiResult<Self>
    where
        C: Connector<Session = S>,
    {
        let mut lifecycle = Lifecycle::new();
        lifecycle.check(Operation::Connect)?;

        let session = connector.connect(endpoint).map_err(|e| match e {
            BmiError::Connection { .. } => e,
            other => BmiError::Connection {
                endpoint: endpoint.address.clone(),
                reason: other.to_string(),
            },
        })?;
        lifecycle.advance(Operation::Connect);
        info!(endpoint = %endpoint.address, "Connected to model");

        Ok(Self {
            session,
            endpoint: endpoint.address.clone(),
            lifecycle,
            catalog: VariableCatalog::default(),
            released: false,
        })
    }

    /// Wraps a session which has already been established.
    pub fn from_session(session: S, endpoint: impl Into<String>) -> Self {
        Self {
            session,
            endpoint: endpoint.into(),
            lifecycle: Lifecycle::connected(),
            catalog: VariableCatalog::default(),
            released: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The declared variable names captured at initialization.
    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    /// Sends the model its configuration.
    ///
    /// Fails with [`BmiError::Initialization`] if the model rejects the configuration or the
    /// handle has already been initialized.
    /// A repeated call never reaches the model.
    ///
    /// If the model accepts the configuration but its variable names cannot be read, the
    /// handle is left `Initialized` with an empty catalog and the failure is reported as
    /// [`BmiError::Initialization`].
    /// [`refresh_catalog`](ModelHandle::refresh_catalog) retries the query.
    pub fn initialize(&mut self, config: &ConfigSource) -> BmiResult<()> {
        self.lifecycle.check(Operation::Initialize)?;
        info!(endpoint = %self.endpoint, config = %config, "Initializing model");

        let state = self.lifecycle.state();
        self.session
            .initialize(config)
            .map_err(|e| match e {
                BmiError::Initialization { .. } => e,
                other => BmiError::Initialization {
                    state,
                    reason: other.to_string(),
                },
            })?;
        let catalog = self.query_catalog();
        self.lifecycle.advance(Operation::Initialize);

        self.catalog = catalog.map_err(|e| BmiError::Initialization {
            state,
            reason: format!("could not read the declared variables: {}", e),
        })?;
        debug!(
            inputs = self.catalog.inputs().len(),
            outputs = self.catalog.outputs().len(),
            "Captured declared variables"
        );
        Ok(())
    }

    /// Advances the model by a single time step.
    ///
    /// The model's time step must be positive and the model's current time must have
    /// increased once the update completes.
    pub fn update(&mut self) -> BmiResult<()> {
        self.lifecycle.check(Operation::Update)?;
        let state = self.lifecycle.state();

        validate_time_step(self.session.time_step()?)?;
        let before = self.session.current_time()?;

        self.session.update().map_err(|e| step_error(state, e))?;
        self.lifecycle.advance(Operation::Update);

        let after = self.session.current_time()?;
        check_time_advanced(self.lifecycle.state(), before, after)?;
        debug!(time = after, "Model updated");
        Ok(())
    }

    /// Advances the model until `time`.
    ///
    /// `time` must be finite and later than the model's current time.
    pub fn update_until(&mut self, time: f64) -> BmiResult<()> {
        self.lifecycle.check(Operation::Update)?;
        let state = self.lifecycle.state();

        validate_time_step(self.session.time_step()?)?;
        let before = self.session.current_time()?;
        if !time.is_finite() || !(time > before) {
            return Err(BmiError::Step {
                state,
                reason: format!(
                    "target time {} is not a finite time after the current time {}",
                    time, before
                ),
            });
        }

        self.session
            .update_until(time)
            .map_err(|e| step_error(state, e))?;
        self.lifecycle.advance(Operation::Update);

        let after = self.session.current_time()?;
        check_time_advanced(self.lifecycle.state(), before, after)?;
        debug!(time = after, target = time, "Model updated");
        Ok(())
    }

    /// Releases the model's remote resources.
    ///
    /// Finalizing a model which never stepped is allowed; finalizing twice fails with
    /// [`BmiError::AlreadyFinalized`].
    pub fn finalize(&mut self) -> BmiResult<()> {
        self.lifecycle.check(Operation::Finalize)?;
        self.session.finalize()?;
        self.lifecycle.advance(Operation::Finalize);
        info!(endpoint = %self.endpoint, "Model finalized");
        Ok(())
    }

    /// Releases the session.
    ///
    /// This never fails.
    /// A model which is still initialized is finalized first, on a best-effort basis.
    pub fn disconnect(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if self.lifecycle.state().is_active() {
            warn!(
                endpoint = %self.endpoint,
                state = %self.lifecycle.state(),
                "Releasing a model which was not finalized"
            );
            match self.session.finalize() {
                Ok(()) => self.lifecycle.advance(Operation::Finalize),
                Err(e) => {
                    warn!(endpoint = %self.endpoint, error = %e, "Best-effort finalize failed")
                }
            }
        }

        self.session.disconnect();
        self.lifecycle.advance(Operation::Disconnect);
        info!(endpoint = %self.endpoint, "Disconnected from model");
    }
}

impl<S: Session> Drop for ModelHandle<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Runs `f` against a freshly connected model and always releases the model afterwards.
///
/// A model left initialized by `f` is finalized before disconnecting.
/// If `f` fails, its error is returned and any error raised while cleaning up is logged.
pub fn with_model<C, F, T>(connector: &C, endpoint: &EndpointConfig, f: F) -> BmiResult<T>
where
    C: Connector,
    F: FnOnce(&mut ModelHandle<C::Session>) -> BmiResult<T>,
{
    let mut handle = ModelHandle::connect(connector, endpoint)?;
    let result = f(&mut handle);

    let cleanup = if handle.state().is_active() {
        handle.finalize()
    } else {
        Ok(())
    };
    handle.disconnect();

    match (result, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup_error)) => {
            warn!(error = %cleanup_error, "Cleanup failed after an earlier error");
            Err(e)
        }
    }
}

fn step_error(state: LifecycleState, error: BmiError) -> BmiError {
    match error {
        BmiError::Step { .. } | BmiError::Configuration(_) => error,
        other => BmiError::Step {
            state,
            reason: other.to_string(),
        },
    }
}

fn check_time_advanced(state: LifecycleState, before: f64, after: f64) -> BmiResult<()> {
    if after > before {
        Ok(())
    } else {
        Err(BmiError::Step {
            state,
            reason: format!(
                "model time did not advance (before: {}, after: {})",
                before, after
            ),
        })
    }
}
