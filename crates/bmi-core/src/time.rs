//! Model time metadata and run-horizon arithmetic.

use is_close::is_close;
use serde::{Deserialize, Serialize};

use crate::errors::{BmiError, BmiResult};

/// Snapshot of a model's time state.
///
/// All values are in `units`, as declared by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub start: f64,
    pub end: f64,
    pub current: f64,
    pub step: f64,
    pub units: String,
}

impl TimeInfo {
    /// Model time remaining until the declared end time.
    pub fn remaining(&self) -> f64 {
        (self.end - self.current).max(0.0)
    }
}

/// Fails with [`BmiError::Configuration`] unless `time_step` is finite and positive.
pub fn validate_time_step(time_step: f64) -> BmiResult<()> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(BmiError::Configuration(format!(
            "time step must be finite and positive, got {}",
            time_step
        )))
    }
}

/// Largest distance from a whole number at which a step ratio is treated as exact.
const STEP_TOLERANCE: f64 = 1e-9;

/// Number of updates needed to cover `duration` with steps of `time_step`.
///
/// This is `ceil(duration / time_step)`, except that a ratio within an absolute tolerance of
/// a whole number is not rounded up (`0.3 / 0.1` takes 3 steps, not 4).
///
/// ```rust
/// use bmi_core::time::step_count;
///
/// assert_eq!(step_count(360.0, 1.0).unwrap(), 360);
/// assert_eq!(step_count(10.0, 3.0).unwrap(), 4);
/// assert!(step_count(10.0, 0.0).is_err());
/// ```
pub fn step_count(duration: f64, time_step: f64) -> BmiResult<usize> {
    validate_time_step(time_step)?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(BmiError::Configuration(format!(
            "run duration must be finite and non-negative, got {}",
            duration
        )));
    }

    let ratio = duration / time_step;
    let rounded = ratio.round();
    let steps = if is_close!(ratio, rounded, rel_tol = 0.0, abs_tol = STEP_TOLERANCE) {
        rounded
    } else {
        ratio.ceil()
    };
    Ok(steps as usize)
}
