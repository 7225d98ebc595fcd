//! Orchestration core for driving a Basic Model Interface (BMI) model that lives behind a
//! process or network boundary.
//!
//! The core is polymorphic over [`session::Session`]: it never knows which model is deployed,
//! only the BMI capability set the model exposes.

pub mod array;
pub mod buffer;
pub mod config;
pub mod errors;
pub mod grid;
pub mod handle;
pub mod lifecycle;
pub mod session;
pub mod standard_names;
pub mod time;
pub mod time_loop;
pub mod variable;

#[cfg(test)]
mod example_session;

pub use errors::{BmiError, BmiResult};
pub use handle::{with_model, ModelHandle};
