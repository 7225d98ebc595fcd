//! Drive Basic Model Interface (BMI) models running behind a process boundary.
//!
//! This crate bundles the orchestration core ([`bmi_core`]) with the in-process reference
//! model and connector ([`bmi_components`]) and provides the `bmi-run` command-line driver.

pub use bmi_components;
pub use bmi_core;

use bmi_core::buffer::ValueBuffer;
use serde::{Deserialize, Serialize};

/// Summary statistics of a pulled output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStats {
    pub len: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl OutputStats {
    /// Computes the statistics of `values`, or `None` for an empty buffer.
    pub fn from_buffer(values: &ValueBuffer) -> Option<Self> {
        let values = values.to_f64();
        if values.is_empty() {
            return None;
        }

        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), v| (min.min(*v), max.max(*v), sum + v),
        );
        Some(Self {
            len: values.len(),
            min,
            max,
            mean: sum / values.len() as f64,
        })
    }
}
