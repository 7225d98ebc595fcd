use bmi_core::buffer::{ValueBuffer, Values, ValuesMut};
use bmi_core::config::ConfigSource;
use bmi_core::errors::{BmiError, BmiResult};
use bmi_core::grid::{GridId, GridType};
use bmi_core::lifecycle::{Lifecycle, Operation};
use bmi_core::session::Session;
use bmi_core::variable::ElementType;
use is_close::is_close;
use std::collections::HashMap;
use tracing::{debug, info};

use super::config::{GridConfig, ReferenceConfig, VariableConfig};

/// A configurable in-process model speaking the BMI capability set.
///
/// The model is described entirely by its [`ReferenceConfig`], which is read when the model is
/// initialized.
/// Every variable starts at its configured initial value; on each update the configured
/// couplings are applied in order and the clock moves forward by one time step.
///
/// The model checks the BMI contract on its own side, independently of any driver:
/// calls before `initialize` or after `finalize`, unknown names and mis-sized buffers are all
/// rejected.
#[derive(Debug)]
pub struct ReferenceModel {
    lifecycle: Lifecycle,
    config: Option<ReferenceConfig>,
    values: HashMap<String, ValueBuffer>,
    current_time: f64,
}

impl Default for ReferenceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceModel {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::connected(),
            config: None,
            values: HashMap::new(),
            current_time: 0.0,
        }
    }

    /// The active configuration, once the model has been initialized.
    fn active(&self, operation: Operation) -> BmiResult<&ReferenceConfig> {
        self.lifecycle.check(operation)?;
        self.config.as_ref().ok_or(BmiError::InvalidState {
            operation,
            state: self.lifecycle.state(),
        })
    }

    fn variable(&self, name: &str) -> BmiResult<&VariableConfig> {
        let config = self.active(Operation::Query)?;
        config
            .variable(name)
            .ok_or_else(|| BmiError::UnknownVariable {
                name: name.to_string(),
                declared: config.variables.iter().map(|v| v.name.clone()).collect(),
            })
    }

    fn grid(&self, grid: GridId) -> BmiResult<&GridConfig> {
        self.active(Operation::Query)?
            .grid(grid)
            .ok_or(BmiError::UnknownGrid { grid })
    }

    fn uniform_grid(&self, grid: GridId, operation: &str) -> BmiResult<&GridConfig> {
        let config = self.grid(grid)?;
        if config.grid_type.is_uniform() {
            Ok(config)
        } else {
            Err(BmiError::UnsupportedGrid {
                grid,
                grid_type: config.grid_type,
                operation: operation.to_string(),
            })
        }
    }

    fn names(&self, select: fn(&VariableConfig) -> bool) -> BmiResult<Vec<String>> {
        Ok(self
            .active(Operation::Query)?
            .variables
            .iter()
            .filter(|v| select(v))
            .map(|v| v.name.clone())
            .collect())
    }

    /// Applies every coupling over `dt` and moves the clock forward.
    fn advance(&mut self, dt: f64) {
        let Some(config) = &self.config else {
            return;
        };

        for coupling in &config.couplings {
            let source = match self.values.get(&coupling.source) {
                Some(values) => values.to_f64(),
                None => continue,
            };
            let Some(target) = self.values.get_mut(&coupling.target) else {
                continue;
            };

            let mut updated = target.to_f64();
            for (i, value) in updated.iter_mut().enumerate() {
                let forcing = if source.len() == 1 { source[0] } else { source[i] };
                *value += coupling.rate * forcing * dt;
            }
            *target = ValueBuffer::from_f64(target.element_type(), updated);
        }
        self.current_time += dt;
    }

    fn check_buffer(&self, name: &str, element_type: ElementType, len: usize) -> BmiResult<()> {
        let variable = self.variable(name)?;
        if variable.element_type != element_type {
            return Err(BmiError::DataTypeMismatch {
                variable: name.to_string(),
                expected: variable.element_type,
                actual: element_type,
            });
        }

        let expected = self.grid(variable.grid)?.size();
        if expected != len {
            return Err(BmiError::BufferSize {
                target: format!("variable '{}'", name),
                expected,
                actual: len,
            });
        }
        Ok(())
    }

    fn rank_buffer(&self, grid: &GridConfig, len: usize, label: &str) -> BmiResult<()> {
        if grid.shape.len() == len {
            Ok(())
        } else {
            Err(BmiError::BufferSize {
                target: format!("{} of grid {}", label, grid.id),
                expected: grid.shape.len(),
                actual: len,
            })
        }
    }
}

impl Session for ReferenceModel {
    fn initialize(&mut self, source: &ConfigSource) -> BmiResult<()> {
        self.lifecycle.check(Operation::Initialize)?;
        let state = self.lifecycle.state();

        let config = ReferenceConfig::from_source(source)
            .map_err(|e| BmiError::Initialization {
                state,
                reason: e.to_string(),
            })?;

        self.values = config
            .variables
            .iter()
            .map(|v| {
                let size = config.grid(v.grid).map(GridConfig::size).unwrap_or(0);
                (
                    v.name.clone(),
                    ValueBuffer::filled(v.element_type, size, v.initial),
                )
            })
            .collect();
        self.current_time = config.time.start;
        info!(
            component = %config.name,
            variables = config.variables.len(),
            "Reference model initialized"
        );

        self.config = Some(config);
        self.lifecycle.advance(Operation::Initialize);
        Ok(())
    }

    fn update(&mut self) -> BmiResult<()> {
        let step = self.active(Operation::Update)?.time.step;
        self.advance(step);
        self.lifecycle.advance(Operation::Update);
        debug!(time = self.current_time, "Reference model stepped");
        Ok(())
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        let step = self.active(Operation::Update)?.time.step;
        if !time.is_finite() || !(time > self.current_time) {
            return Err(BmiError::Step {
                state: self.lifecycle.state(),
                reason: format!(
                    "cannot update until {}; the model is at {}",
                    time, self.current_time
                ),
            });
        }

        while self.current_time < time && !is_close!(self.current_time, time) {
            let dt = step.min(time - self.current_time);
            self.advance(dt);
        }
        self.current_time = time;
        self.lifecycle.advance(Operation::Update);
        debug!(time = self.current_time, "Reference model stepped");
        Ok(())
    }

    fn finalize(&mut self) -> BmiResult<()> {
        self.lifecycle.check(Operation::Finalize)?;
        self.values.clear();
        self.lifecycle.advance(Operation::Finalize);
        Ok(())
    }

    fn component_name(&mut self) -> BmiResult<String> {
        Ok(self.active(Operation::Query)?.name.clone())
    }

    fn input_var_names(&mut self) -> BmiResult<Vec<String>> {
        self.names(|v| v.role.is_input())
    }

    fn output_var_names(&mut self) -> BmiResult<Vec<String>> {
        self.names(|v| v.role.is_output())
    }

    fn var_grid(&mut self, name: &str) -> BmiResult<GridId> {
        Ok(self.variable(name)?.grid)
    }

    fn var_type(&mut self, name: &str) -> BmiResult<ElementType> {
        Ok(self.variable(name)?.element_type)
    }

    fn var_units(&mut self, name: &str) -> BmiResult<String> {
        Ok(self.variable(name)?.units.clone())
    }

    fn start_time(&mut self) -> BmiResult<f64> {
        Ok(self.active(Operation::Query)?.time.start)
    }

    fn end_time(&mut self) -> BmiResult<f64> {
        Ok(self.active(Operation::Query)?.time.end)
    }

    fn current_time(&mut self) -> BmiResult<f64> {
        self.active(Operation::Query)?;
        Ok(self.current_time)
    }

    fn time_step(&mut self) -> BmiResult<f64> {
        Ok(self.active(Operation::Query)?.time.step)
    }

    fn time_units(&mut self) -> BmiResult<String> {
        Ok(self.active(Operation::Query)?.time.units.clone())
    }

    fn grid_type(&mut self, grid: GridId) -> BmiResult<GridType> {
        Ok(self.grid(grid)?.grid_type)
    }

    fn grid_rank(&mut self, grid: GridId) -> BmiResult<usize> {
        Ok(self.grid(grid)?.shape.len())
    }

    fn grid_size(&mut self, grid: GridId) -> BmiResult<usize> {
        Ok(self.grid(grid)?.size())
    }

    fn grid_shape(&mut self, grid: GridId, shape: &mut [usize]) -> BmiResult<()> {
        let config = self.grid(grid)?;
        self.rank_buffer(config, shape.len(), "shape")?;
        shape.copy_from_slice(&config.shape);
        Ok(())
    }

    fn grid_spacing(&mut self, grid: GridId, spacing: &mut [f64]) -> BmiResult<()> {
        let config = self.uniform_grid(grid, "spacing")?;
        self.rank_buffer(config, spacing.len(), "spacing")?;
        if let Some(values) = &config.spacing {
            spacing.copy_from_slice(values);
        }
        Ok(())
    }

    fn grid_origin(&mut self, grid: GridId, origin: &mut [f64]) -> BmiResult<()> {
        let config = self.uniform_grid(grid, "origin")?;
        self.rank_buffer(config, origin.len(), "origin")?;
        if let Some(values) = &config.origin {
            origin.copy_from_slice(values);
        }
        Ok(())
    }

    fn get_value(&mut self, name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        self.lifecycle.check(Operation::Exchange)?;
        self.check_buffer(name, dest.element_type(), dest.len())?;
        match self.values.get(name) {
            Some(values) if dest.copy_from(values) => Ok(()),
            _ => Err(BmiError::Remote(format!("no values held for '{}'", name))),
        }
    }

    fn set_value(&mut self, name: &str, src: Values<'_>) -> BmiResult<()> {
        self.lifecycle.check(Operation::Exchange)?;
        self.check_buffer(name, src.element_type(), src.len())?;
        self.values.insert(name.to_string(), src.to_buffer());
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.lifecycle.state().is_active() {
            self.values.clear();
        }
        self.lifecycle.advance(Operation::Disconnect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CONFIG: &str = r#"
name = "Reference Coastline"
time = { end = 10.0, step = 0.5 }

[[grids]]
id = 0
type = "uniform_rectilinear"
shape = [2, 3]
spacing = [50.0, 100.0]
origin = [0.0, -10.0]

[[grids]]
id = 1
type = "scalar"

[[grids]]
id = 2
type = "unstructured"
size = 5

[[variables]]
name = "sea_water__depth"
role = "output"
grid = 0
units = "m"
initial = 10.0

[[variables]]
name = "sea_surface_water_wave__height"
role = "input"
grid = 1
units = "m"
initial = 2.0

[[variables]]
name = "model_grid_cell__count"
role = "output"
grid = 1
type = "int"
initial = 6

[[variables]]
name = "sea_water_station__elevation"
role = "input_output"
grid = 2
units = "m"

[[couplings]]
target = "sea_water__depth"
source = "sea_surface_water_wave__height"
rate = -0.1
"#;

    fn initialized() -> ReferenceModel {
        let mut model = ReferenceModel::new();
        model
            .initialize(&ConfigSource::Inline(CONFIG.to_string()))
            .unwrap();
        model
    }

    #[test]
    fn discovery() {
        let mut model = initialized();

        assert_eq!(model.component_name().unwrap(), "Reference Coastline");
        assert_eq!(
            model.input_var_names().unwrap(),
            vec!["sea_surface_water_wave__height", "sea_water_station__elevation"]
        );
        assert_eq!(
            model.output_var_names().unwrap(),
            vec![
                "sea_water__depth",
                "model_grid_cell__count",
                "sea_water_station__elevation"
            ]
        );
        assert_eq!(
            model.var_type("model_grid_cell__count").unwrap(),
            ElementType::Int32
        );
        assert_eq!(model.var_units("model_grid_cell__count").unwrap(), "1");
        assert_eq!(model.time_step().unwrap(), 0.5);
    }

    #[test]
    fn calls_before_initialize() {
        let mut model = ReferenceModel::new();

        assert!(matches!(
            model.component_name(),
            Err(BmiError::InvalidState { .. })
        ));
        assert!(matches!(model.update(), Err(BmiError::Step { .. })));
        assert!(matches!(
            model.finalize(),
            Err(BmiError::InvalidState { .. })
        ));
    }

    #[test]
    fn rejected_config() {
        let mut model = ReferenceModel::new();
        let err = model
            .initialize(&ConfigSource::Inline("name = 1".to_string()))
            .unwrap_err();
        assert!(matches!(err, BmiError::Initialization { .. }));

        let err = model
            .initialize(&ConfigSource::Path("/does/not/exist.toml".into()))
            .unwrap_err();
        assert!(err.to_string().contains("could not read"));
    }

    #[test]
    fn grids() {
        let mut model = initialized();

        let mut shape = [0; 2];
        model.grid_shape(0, &mut shape).unwrap();
        assert_eq!(shape, [2, 3]);

        let mut origin = [0.0; 2];
        model.grid_origin(0, &mut origin).unwrap();
        assert_eq!(origin, [0.0, -10.0]);

        assert_eq!(model.grid_size(2).unwrap(), 5);
        assert_eq!(model.grid_rank(1).unwrap(), 0);
        assert!(matches!(
            model.grid_spacing(2, &mut []),
            Err(BmiError::UnsupportedGrid { .. })
        ));
        assert!(matches!(
            model.grid_shape(0, &mut [0; 3]),
            Err(BmiError::BufferSize { .. })
        ));
        assert_eq!(model.grid_type(9), Err(BmiError::UnknownGrid { grid: 9 }));
    }

    #[test]
    fn couplings_apply_on_update() {
        let mut model = initialized();

        model.update().unwrap();
        let mut depth = [0.0; 6];
        model
            .get_value("sea_water__depth", ValuesMut::F64(&mut depth))
            .unwrap();
        // 10 - 0.1 * 2 * 0.5
        assert_relative_eq!(depth[0], 9.9);

        model
            .set_value("sea_surface_water_wave__height", Values::F64(&[0.0]))
            .unwrap();
        model.update_until(5.0).unwrap();
        model
            .get_value("sea_water__depth", ValuesMut::F64(&mut depth))
            .unwrap();
        assert_relative_eq!(depth[5], 9.9);
        assert_eq!(model.current_time().unwrap(), 5.0);
    }

    #[test]
    fn update_until_takes_partial_steps() {
        let mut model = initialized();

        model.update_until(1.25).unwrap();
        assert_eq!(model.current_time().unwrap(), 1.25);

        let mut depth = [0.0; 6];
        model
            .get_value("sea_water__depth", ValuesMut::F64(&mut depth))
            .unwrap();
        assert_relative_eq!(depth[0], 10.0 - 0.1 * 2.0 * 1.25, epsilon = 1e-12);

        for target in [1.0, f64::INFINITY, f64::NAN] {
            assert!(matches!(
                model.update_until(target),
                Err(BmiError::Step { .. })
            ));
        }
        assert_eq!(model.current_time().unwrap(), 1.25);
    }

    #[test]
    fn integer_values() {
        let mut model = initialized();

        let mut count = [0i32];
        model
            .get_value("model_grid_cell__count", ValuesMut::I32(&mut count))
            .unwrap();
        assert_eq!(count, [6]);

        let mut wrong = [0.0f64];
        assert!(matches!(
            model.get_value("model_grid_cell__count", ValuesMut::F64(&mut wrong)),
            Err(BmiError::DataTypeMismatch { .. })
        ));
    }

    #[test]
    fn exchange_contract() {
        let mut model = initialized();

        assert!(matches!(
            model.set_value("sea_water__temperature", Values::F64(&[1.0])),
            Err(BmiError::UnknownVariable { .. })
        ));
        assert!(matches!(
            model.set_value("sea_water_station__elevation", Values::F64(&[1.0; 4])),
            Err(BmiError::BufferSize {
                expected: 5,
                actual: 4,
                ..
            })
        ));

        let stations = [1.0, 2.0, 3.0, 4.0, 5.0];
        model
            .set_value("sea_water_station__elevation", Values::F64(&stations))
            .unwrap();
        let mut echoed = [0.0; 5];
        model
            .get_value("sea_water_station__elevation", ValuesMut::F64(&mut echoed))
            .unwrap();
        assert_eq!(echoed, stations);
    }

    #[test]
    fn finalize_twice() {
        let mut model = initialized();
        model.finalize().unwrap();
        assert_eq!(model.finalize(), Err(BmiError::AlreadyFinalized));
        assert!(matches!(
            model.current_time(),
            Err(BmiError::InvalidState { .. })
        ));
    }
}
