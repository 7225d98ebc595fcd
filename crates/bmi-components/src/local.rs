//! An in-process connector.
//!
//! [`LocalConnector`] resolves `local://<name>` addresses to registered model factories, so a
//! driver can be pointed at an in-process model exactly as it would be at a remote one.

use bmi_core::buffer::{Values, ValuesMut};
use bmi_core::config::{ConfigSource, EndpointConfig};
use bmi_core::errors::{BmiError, BmiResult};
use bmi_core::grid::{GridId, GridType};
use bmi_core::session::{Connector, Session};
use bmi_core::variable::ElementType;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::reference::ReferenceModel;

const SCHEME: &str = "local://";

type Factory = Box<dyn Fn() -> Box<dyn Session> + Send + Sync>;

/// Connects to models living in the current process.
pub struct LocalConnector {
    factories: HashMap<String, Factory>,
    live: Arc<AtomicUsize>,
}

impl fmt::Debug for LocalConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalConnector")
            .field("models", &self.models())
            .field("live_sessions", &self.live_sessions())
            .finish()
    }
}

impl Default for LocalConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalConnector {
    /// A connector with no models registered.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A connector serving the [`ReferenceModel`] at `local://reference`.
    pub fn with_reference_model() -> Self {
        Self::new().register("reference", ReferenceModel::new)
    }

    /// Serves the models built by `factory` at `local://<name>`.
    pub fn register<F, S>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Session + 'static,
    {
        self.factories
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn Session>));
        self
    }

    /// Names of the registered models, sorted.
    pub fn models(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    /// Number of sessions which have been connected and not yet disconnected.
    pub fn live_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Connector for LocalConnector {
    type Session = LocalSession;

    fn connect(&self, endpoint: &EndpointConfig) -> BmiResult<LocalSession> {
        let connection_error = |reason: String| BmiError::Connection {
            endpoint: endpoint.address.clone(),
            reason,
        };

        let name = endpoint
            .address
            .strip_prefix(SCHEME)
            .ok_or_else(|| connection_error(format!("expected a {}<name> address", SCHEME)))?;
        let factory = self.factories.get(name).ok_or_else(|| {
            connection_error(format!(
                "no model named '{}' (available: {})",
                name,
                self.models().join(", ")
            ))
        })?;

        self.live.fetch_add(1, Ordering::SeqCst);
        debug!(model = name, "Opened local session");
        Ok(LocalSession {
            name: name.to_string(),
            inner: factory(),
            live: Arc::clone(&self.live),
            released: false,
        })
    }
}

/// A session with a model created by a [`LocalConnector`].
pub struct LocalSession {
    name: String,
    inner: Box<dyn Session>,
    live: Arc<AtomicUsize>,
    released: bool,
}

impl fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSession")
            .field("name", &self.name)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl LocalSession {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
            debug!(model = %self.name, "Closed local session");
        }
    }
}

impl Drop for LocalSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl Session for LocalSession {
    fn initialize(&mut self, config: &ConfigSource) -> BmiResult<()> {
        self.inner.initialize(config)
    }

    fn update(&mut self) -> BmiResult<()> {
        self.inner.update()
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        self.inner.update_until(time)
    }

    fn finalize(&mut self) -> BmiResult<()> {
        self.inner.finalize()
    }

    fn component_name(&mut self) -> BmiResult<String> {
        self.inner.component_name()
    }

    fn input_var_names(&mut self) -> BmiResult<Vec<String>> {
        self.inner.input_var_names()
    }

    fn output_var_names(&mut self) -> BmiResult<Vec<String>> {
        self.inner.output_var_names()
    }

    fn var_grid(&mut self, name: &str) -> BmiResult<GridId> {
        self.inner.var_grid(name)
    }

    fn var_type(&mut self, name: &str) -> BmiResult<ElementType> {
        self.inner.var_type(name)
    }

    fn var_units(&mut self, name: &str) -> BmiResult<String> {
        self.inner.var_units(name)
    }

    fn start_time(&mut self) -> BmiResult<f64> {
        self.inner.start_time()
    }

    fn end_time(&mut self) -> BmiResult<f64> {
        self.inner.end_time()
    }

    fn current_time(&mut self) -> BmiResult<f64> {
        self.inner.current_time()
    }

    fn time_step(&mut self) -> BmiResult<f64> {
        self.inner.time_step()
    }

    fn time_units(&mut self) -> BmiResult<String> {
        self.inner.time_units()
    }

    fn grid_type(&mut self, grid: GridId) -> BmiResult<GridType> {
        self.inner.grid_type(grid)
    }

    fn grid_rank(&mut self, grid: GridId) -> BmiResult<usize> {
        self.inner.grid_rank(grid)
    }

    fn grid_size(&mut self, grid: GridId) -> BmiResult<usize> {
        self.inner.grid_size(grid)
    }

    fn grid_shape(&mut self, grid: GridId, shape: &mut [usize]) -> BmiResult<()> {
        self.inner.grid_shape(grid, shape)
    }

    fn grid_spacing(&mut self, grid: GridId, spacing: &mut [f64]) -> BmiResult<()> {
        self.inner.grid_spacing(grid, spacing)
    }

    fn grid_origin(&mut self, grid: GridId, origin: &mut [f64]) -> BmiResult<()> {
        self.inner.grid_origin(grid, origin)
    }

    fn get_value(&mut self, name: &str, dest: ValuesMut<'_>) -> BmiResult<()> {
        self.inner.get_value(name, dest)
    }

    fn set_value(&mut self, name: &str, src: Values<'_>) -> BmiResult<()> {
        self.inner.set_value(name, src)
    }

    fn disconnect(&mut self) {
        self.inner.disconnect();
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_registered_models() {
        let connector = LocalConnector::with_reference_model();
        assert_eq!(connector.models(), vec!["reference"]);

        let session = connector
            .connect(&EndpointConfig::new("local://reference"))
            .unwrap();
        assert_eq!(session.name(), "reference");
        assert_eq!(connector.live_sessions(), 1);

        drop(session);
        assert_eq!(connector.live_sessions(), 0);
    }

    #[test]
    fn unknown_addresses() {
        let connector = LocalConnector::with_reference_model();

        for address in ["local://missing", "http://localhost:55555", "reference"] {
            let err = connector
                .connect(&EndpointConfig::new(address))
                .unwrap_err();
            match err {
                BmiError::Connection { endpoint, .. } => assert_eq!(endpoint, address),
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(connector.live_sessions(), 0);
    }

    #[test]
    fn disconnect_releases_once() {
        let connector = LocalConnector::with_reference_model();
        let mut session = connector
            .connect(&EndpointConfig::new("local://reference"))
            .unwrap();

        session.disconnect();
        session.disconnect();
        assert_eq!(connector.live_sessions(), 0);
        drop(session);
        assert_eq!(connector.live_sessions(), 0);
    }
}
