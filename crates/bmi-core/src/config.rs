//! Driver configuration.
//!
//! Two kinds of configuration meet here:
//!
//! - [`ConfigSource`] is the model's own configuration.
//!   It is handed to `initialize` untouched; its schema belongs to the model.
//! - [`DriverConfig`] describes a run: which endpoint to connect to, which model
//!   configuration to send, and what to exchange while stepping.
//!   It is read from TOML.
//!
//! ```rust
//! use bmi_core::config::DriverConfig;
//!
//! let config = DriverConfig::from_toml_str(r#"
//!     [endpoint]
//!     address = "local://reference"
//!
//!     [model]
//!     config = { path = "cem.toml" }
//!
//!     [run]
//!     duration = 360.0
//!     outputs = ["sea_water__depth"]
//!
//!     [[run.inputs]]
//!     name = "sea_surface_water_wave__height"
//!     fill = 2.0
//! "#).unwrap();
//!
//! assert_eq!(config.endpoint.address, "local://reference");
//! assert_eq!(config.run.inputs[0].fill, 2.0);
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::array::{fill_region, RegionFill};
use crate::buffer::ValueBuffer;
use crate::errors::{BmiError, BmiResult};
use crate::grid::{check_length, shape_size};
use crate::variable::ElementType;

/// Where to find a model endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Transport specific address (e.g. `local://reference` or `http://localhost:55555`)
    pub address: String,
    /// Upper bound on a single round trip, enforced by the transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
}

impl EndpointConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout_secs: None,
        }
    }
}

/// The configuration passed to a model's `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Path to a configuration file readable by the model
    Path(PathBuf),
    /// The configuration itself
    Inline(String),
}

impl ConfigSource {
    /// Reads the configuration contents.
    pub fn contents(&self) -> std::io::Result<Cow<'_, str>> {
        match self {
            ConfigSource::Path(path) => fs::read_to_string(path).map(Cow::Owned),
            ConfigSource::Inline(contents) => Ok(Cow::Borrowed(contents)),
        }
    }

    /// Resolves a relative path against `base`.
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            ConfigSource::Path(path) if path.is_relative() => ConfigSource::Path(base.join(path)),
            other => other,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Path(path) => write!(f, "{}", path.display()),
            ConfigSource::Inline(contents) => write!(f, "<inline, {} bytes>", contents.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub config: ConfigSource,
}

/// Values pushed to an input variable before every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub name: String,
    /// Value used for every element not covered by `values` or `regions`
    #[serde(default)]
    pub fill: f64,
    /// Explicit flat values in row-major order; replaces `fill`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    /// Boxes overwritten after `fill`/`values` are applied
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<RegionFill>,
}

impl InputConfig {
    /// Builds the exchange buffer for a variable on a grid of `shape`.
    pub fn build(&self, element_type: ElementType, shape: &[usize]) -> BmiResult<ValueBuffer> {
        let size = shape_size(shape);
        let mut values = match &self.values {
            Some(values) => {
                check_length(format!("input '{}'", self.name), size, values.len())?;
                values.clone()
            }
            None => vec![self.fill; size],
        };
        for region in &self.regions {
            fill_region(&mut values, shape, region)?;
        }
        Ok(ValueBuffer::from_f64(element_type, values))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Model time to run for; runs until the model's end time when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub inputs: Vec<InputConfig>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// Everything needed to drive one model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub endpoint: EndpointConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl DriverConfig {
    pub fn from_toml_str(contents: &str) -> BmiResult<Self> {
        toml::from_str(contents).map_err(|e| BmiError::Configuration(e.to_string()))
    }

    /// Reads a driver configuration from a TOML file.
    ///
    /// A relative model configuration path is resolved against the directory of `path`.
    pub fn from_path(path: impl AsRef<Path>) -> BmiResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            BmiError::Configuration(format!("could not read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&contents).map_err(|e| match e {
            BmiError::Configuration(details) => {
                BmiError::Configuration(format!("{}: {}", path.display(), details))
            }
            other => other,
        })?;

        if let Some(base) = path.parent() {
            config.model.config = config.model.config.relative_to(base);
        }
        Ok(config)
    }
}
