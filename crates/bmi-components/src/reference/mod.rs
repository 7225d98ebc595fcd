//! A configurable reference model.
//!
//! The reference model stands in for a deployed model image.
//! It exposes whatever grids and variables its TOML configuration declares and evolves them
//! with simple linear couplings, which is enough to exercise a driver end to end.

mod config;
mod model;

pub use config::{CouplingConfig, GridConfig, ReferenceConfig, TimeSettings, VariableConfig};
pub use model::ReferenceModel;
