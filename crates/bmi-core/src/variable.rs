//! Variable metadata exposed through discovery.
//!
//! A BMI model declares two sets of variable names: those it accepts as input and those it
//! produces as output. A name may appear in both.
//! Each variable lives on a grid and holds values of a single element type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::BmiError;
use crate::grid::GridId;

/// Element type of the values held by a variable.
///
/// BMI models report types as strings.
/// Both the Rust-style names (`float64`) and the names used by C and Python BMI
/// implementations (`double`) are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    #[serde(alias = "double")]
    Float64,
    #[serde(alias = "float")]
    Float32,
    #[serde(alias = "int")]
    Int32,
    #[serde(alias = "long")]
    Int64,
}

impl ElementType {
    /// Size of a single element in bytes.
    pub fn itemsize(&self) -> usize {
        match self {
            ElementType::Float64 | ElementType::Int64 => 8,
            ElementType::Float32 | ElementType::Int32 => 4,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::Float64 | ElementType::Float32)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Float64 => write!(f, "float64"),
            ElementType::Float32 => write!(f, "float32"),
            ElementType::Int32 => write!(f, "int32"),
            ElementType::Int64 => write!(f, "int64"),
        }
    }
}

impl FromStr for ElementType {
    type Err = BmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "float64" | "double" | "f64" => Ok(ElementType::Float64),
            "float32" | "float" | "f32" => Ok(ElementType::Float32),
            "int32" | "int" | "i32" => Ok(ElementType::Int32),
            "int64" | "long" | "i64" => Ok(ElementType::Int64),
            other => Err(BmiError::Remote(format!(
                "unsupported variable type '{}'",
                other
            ))),
        }
    }
}

/// Whether a variable is read from, written to, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    Input,
    Output,
    InputOutput,
}

impl VariableRole {
    /// Derives the role from membership of the declared name sets.
    ///
    /// Returns `None` if the variable is in neither set.
    pub fn from_membership(is_input: bool, is_output: bool) -> Option<Self> {
        match (is_input, is_output) {
            (true, true) => Some(VariableRole::InputOutput),
            (true, false) => Some(VariableRole::Input),
            (false, true) => Some(VariableRole::Output),
            (false, false) => None,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, VariableRole::Input | VariableRole::InputOutput)
    }

    pub fn is_output(&self) -> bool {
        matches!(self, VariableRole::Output | VariableRole::InputOutput)
    }
}

impl fmt::Display for VariableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableRole::Input => write!(f, "input"),
            VariableRole::Output => write!(f, "output"),
            VariableRole::InputOutput => write!(f, "input/output"),
        }
    }
}

/// Snapshot of everything discovery reports about one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Standard name of the variable (e.g. `sea_water__depth`)
    pub name: String,
    pub role: VariableRole,
    pub grid: GridId,
    pub element_type: ElementType,
    pub units: String,
}

/// The declared input and output names of a model.
///
/// Captured once the model is initialized; the declared sets are assumed not to change
/// during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableCatalog {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl VariableCatalog {
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn role(&self, name: &str) -> Option<VariableRole> {
        VariableRole::from_membership(
            self.inputs.iter().any(|n| n == name),
            self.outputs.iter().any(|n| n == name),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.role(name).is_some()
    }

    /// All declared names, inputs first, without duplicates.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.inputs.clone();
        for name in &self.outputs {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Fails with [`BmiError::UnknownVariable`] if `name` was not declared.
    pub fn require(&self, name: &str) -> Result<VariableRole, BmiError> {
        self.role(name).ok_or_else(|| BmiError::UnknownVariable {
            name: name.to_string(),
            declared: self.names(),
        })
    }
}
