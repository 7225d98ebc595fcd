//! Configuration of the reference model.
//!
//! ```toml
//! name = "Reference Coastline"
//!
//! [time]
//! end = 3650.0
//! step = 1.0
//! units = "d"
//!
//! [[grids]]
//! id = 0
//! type = "uniform_rectilinear"
//! shape = [100, 200]
//! spacing = [100.0, 100.0]
//! origin = [0.0, 0.0]
//!
//! [[variables]]
//! name = "sea_water__depth"
//! role = "output"
//! grid = 0
//! type = "double"
//! units = "m"
//! initial = 10.0
//!
//! [[couplings]]
//! target = "sea_water__depth"
//! source = "sea_surface_water_wave__height"
//! rate = -0.01
//! ```

use bmi_core::config::ConfigSource;
use bmi_core::errors::{BmiError, BmiResult};
use bmi_core::grid::{shape_size, GridId, GridType};
use bmi_core::standard_names::{is_standard_name, lookup};
use bmi_core::time::validate_time_step;
use bmi_core::variable::{ElementType, VariableRole};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Model time settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSettings {
    #[serde(default)]
    pub start: f64,
    pub end: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_step() -> f64 {
    1.0
}

fn default_units() -> String {
    "d".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub id: GridId,
    #[serde(rename = "type")]
    pub grid_type: GridType,
    /// Empty for a scalar grid
    #[serde(default)]
    pub shape: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<f64>>,
    /// Number of nodes of an unstructured grid; defaults to the product of `shape`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl GridConfig {
    pub fn size(&self) -> usize {
        self.size.unwrap_or_else(|| shape_size(&self.shape))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub name: String,
    pub role: VariableRole,
    pub grid: GridId,
    #[serde(rename = "type", default = "default_element_type")]
    pub element_type: ElementType,
    #[serde(default = "default_variable_units")]
    pub units: String,
    /// Value every element starts with
    #[serde(default)]
    pub initial: f64,
}

fn default_element_type() -> ElementType {
    ElementType::Float64
}

fn default_variable_units() -> String {
    "1".to_string()
}

/// Linear coupling applied on every update: `target += rate * source * dt`.
///
/// A single-valued source is broadcast over the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingConfig {
    pub target: String,
    pub source: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub name: String,
    pub time: TimeSettings,
    #[serde(default)]
    pub grids: Vec<GridConfig>,
    #[serde(default)]
    pub variables: Vec<VariableConfig>,
    #[serde(default)]
    pub couplings: Vec<CouplingConfig>,
}

impl ReferenceConfig {
    pub fn from_toml_str(contents: &str) -> BmiResult<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_source(source: &ConfigSource) -> BmiResult<Self> {
        let contents = source
            .contents()
            .map_err(|e| invalid(format!("could not read {}: {}", source, e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn grid(&self, id: GridId) -> Option<&GridConfig> {
        self.grids.iter().find(|g| g.id == id)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableConfig> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Checks that the configuration describes a consistent model.
    ///
    /// Names which do not follow the standard name syntax, or whose units differ from the
    /// registered ones, are only warned about.
    pub fn validate(&self) -> BmiResult<()> {
        if !(self.time.end >= self.time.start) {
            return Err(invalid(format!(
                "end time {} is before start time {}",
                self.time.end, self.time.start
            )));
        }
        validate_time_step(self.time.step)?;

        let mut ids = HashSet::new();
        for grid in &self.grids {
            if !ids.insert(grid.id) {
                return Err(invalid(format!(
                    "grid {} is defined more than once",
                    grid.id
                )));
            }
            validate_grid(grid)?;
        }

        let mut names = HashSet::new();
        for variable in &self.variables {
            if !names.insert(variable.name.as_str()) {
                return Err(invalid(format!(
                    "variable '{}' is defined more than once",
                    variable.name
                )));
            }
            if self.grid(variable.grid).is_none() {
                return Err(invalid(format!(
                    "variable '{}' refers to undefined grid {}",
                    variable.name, variable.grid
                )));
            }
            check_standard_name(variable);
        }

        for coupling in &self.couplings {
            let target = self.variable(&coupling.target).ok_or_else(|| {
                invalid(format!("coupling target '{}' is not defined", coupling.target))
            })?;
            let source = self.variable(&coupling.source).ok_or_else(|| {
                invalid(format!("coupling source '{}' is not defined", coupling.source))
            })?;

            let target_size = self.grid(target.grid).map(GridConfig::size).unwrap_or(0);
            let source_size = self.grid(source.grid).map(GridConfig::size).unwrap_or(0);
            if source_size != 1 && source_size != target_size {
                return Err(invalid(format!(
                    "coupling source '{}' holds {} values but target '{}' holds {}",
                    source.name, source_size, target.name, target_size
                )));
            }
        }
        Ok(())
    }
}

fn validate_grid(grid: &GridConfig) -> BmiResult<()> {
    let rank = grid.shape.len();
    match grid.grid_type {
        GridType::Scalar if rank != 0 => {
            return Err(invalid(format!(
                "scalar grid {} must have an empty shape",
                grid.id
            )))
        }
        GridType::UniformRectilinear => {
            for (label, values) in [("spacing", &grid.spacing), ("origin", &grid.origin)] {
                match values {
                    Some(v) if v.len() == rank => {}
                    Some(v) => {
                        return Err(invalid(format!(
                            "{} of grid {} has {} entries but the grid has rank {}",
                            label,
                            grid.id,
                            v.len(),
                            rank
                        )))
                    }
                    None => {
                        return Err(invalid(format!(
                            "uniform rectilinear grid {} is missing its {}",
                            grid.id, label
                        )))
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn invalid(reason: String) -> BmiError {
    BmiError::Configuration(reason)
}

fn check_standard_name(variable: &VariableConfig) {
    if !is_standard_name(&variable.name) {
        warn!(
            variable = %variable.name,
            "Variable name does not follow the CSDMS standard name syntax"
        );
    } else if let Some(registered) = lookup(&variable.name) {
        if registered.units != variable.units {
            warn!(
                variable = %variable.name,
                units = %variable.units,
                expected = registered.units,
                "Variable units differ from the registered standard name"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
name = "Reference Coastline"
time = { end = 10.0 }

[[grids]]
id = 0
type = "uniform_rectilinear"
shape = [2, 3]
spacing = [1.0, 1.0]
origin = [0.0, 0.0]

[[grids]]
id = 1
type = "scalar"

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
type = "double"
units = "m"

[[couplings]]
target = "sea_water__depth"
source = "sea_surface_water_wave__height"
rate = -0.5
"#;

    #[test]
    fn parse_config() {
        let config = ReferenceConfig::from_toml_str(CONFIG).unwrap();

        assert_eq!(config.time.start, 0.0);
        assert_eq!(config.time.step, 1.0);
        assert_eq!(config.time.units, "d");
        assert_eq!(config.grids[0].size(), 6);
        assert_eq!(config.grids[1].size(), 1);
        assert_eq!(
            config.variable("sea_surface_water_wave__height").unwrap().element_type,
            ElementType::Float64
        );
        assert_eq!(config.couplings[0].rate, -0.5);
    }

    fn rejection(contents: &str) -> String {
        match ReferenceConfig::from_toml_str(contents) {
            Err(BmiError::Configuration(reason)) => reason,
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_grid_reference() {
        let err = rejection(&CONFIG.replace("grid = 1", "grid = 4"));
        assert!(err.contains("undefined grid 4"), "{}", err);
    }

    #[test]
    fn duplicate_variable() {
        let err = rejection(&CONFIG.replace(
            "sea_surface_water_wave__height\"\nrole",
            "sea_water__depth\"\nrole",
        ));
        assert!(err.contains("more than once"), "{}", err);
    }

    #[test]
    fn uniform_grid_needs_spacing() {
        let err = rejection(&CONFIG.replace("spacing = [1.0, 1.0]\n", ""));
        assert!(err.contains("missing its spacing"), "{}", err);

        let err = rejection(&CONFIG.replace("origin = [0.0, 0.0]", "origin = [0.0]"));
        assert!(err.contains("rank 2"), "{}", err);
    }

    #[test]
    fn coupling_sizes_must_match() {
        let config = CONFIG.replace(
            "source = \"sea_surface_water_wave__height\"",
            "source = \"sea_water__depth\"",
        );
        assert!(ReferenceConfig::from_toml_str(&config).is_ok());

        let config = CONFIG.replace(
            "target = \"sea_water__depth\"\nsource = \"sea_surface_water_wave__height\"",
            "target = \"sea_surface_water_wave__height\"\nsource = \"sea_water__depth\"",
        );
        let err = rejection(&config);
        assert!(err.contains("holds 6 values"), "{}", err);
    }

    #[test]
    fn end_before_start() {
        let err = rejection(
            &CONFIG.replace("time = { end = 10.0 }", "time = { start = 5.0, end = 1.0 }"),
        );
        assert!(err.contains("before start time"), "{}", err);
    }

    #[test]
    fn time_step_must_be_positive() {
        for step in ["0.0", "-1.0", "inf", "nan"] {
            let err = rejection(&CONFIG.replace(
                "time = { end = 10.0 }",
                &format!("time = {{ end = 10.0, step = {} }}", step),
            ));
            assert!(err.contains("time step"), "{}: {}", step, err);
        }
    }

    #[test]
    fn invalid_toml() {
        let err = rejection("name = ");
        assert!(!err.is_empty());
    }
}
