use thiserror::Error;

use crate::grid::{GridId, GridType};
use crate::lifecycle::{LifecycleState, Operation};
use crate::variable::ElementType;

/// Error type for every operation issued against a BMI model.
///
/// Variants carry enough context (variable or grid, expected vs actual length, lifecycle
/// state) to diagnose a failure without querying the remote model again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BmiError {
    #[error("Could not connect to endpoint {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },
    #[error("Initialization failed in state {state}: {reason}")]
    Initialization {
        state: LifecycleState,
        reason: String,
    },
    #[error("Unknown variable '{name}'. Declared variables: [{}]", .declared.join(", "))]
    UnknownVariable { name: String, declared: Vec<String> },
    #[error("Unknown grid {grid}")]
    UnknownGrid { grid: GridId },
    #[error("Buffer size mismatch for {target}. Expected {expected} values, got {actual}")]
    BufferSize {
        target: String,
        expected: usize,
        actual: usize,
    },
    #[error("Data type mismatch for '{variable}'. Model declares {expected}, buffer holds {actual}")]
    DataTypeMismatch {
        variable: String,
        expected: ElementType,
        actual: ElementType,
    },
    #[error("Step failed in state {state}: {reason}")]
    Step {
        state: LifecycleState,
        reason: String,
    },
    #[error("Model has already been finalized")]
    AlreadyFinalized,
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Cannot {operation} while the model is {state}")]
    InvalidState {
        operation: Operation,
        state: LifecycleState,
    },
    #[error("Grid {grid} is of type {grid_type}, which does not support {operation}")]
    UnsupportedGrid {
        grid: GridId,
        grid_type: GridType,
        operation: String,
    },
    #[error("Remote model error: {0}")]
    Remote(String),
}

/// Convenience type for `Result<T, BmiError>`.
pub type BmiResult<T> = Result<T, BmiError>;
