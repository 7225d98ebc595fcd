#![allow(dead_code)]

use bmi_core::config::ConfigSource;

pub const DEPTH: &str = "sea_water__depth";
pub const WAVE_HEIGHT: &str = "sea_surface_water_wave__height";
pub const BEDLOAD: &str = "land_surface_water_sediment~bedload__mass_flow_rate";

/// A coastline-like reference model on a `rows` x `cols` grid.
pub fn coastline_config(rows: usize, cols: usize, step: f64) -> String {
    format!(
        r#"
name = "Reference Coastline"
time = {{ end = 3650.0, step = {step:?} }}

[[grids]]
id = 0
type = "uniform_rectilinear"
shape = [{rows}, {cols}]
spacing = [100.0, 100.0]
origin = [0.0, 0.0]

[[grids]]
id = 1
type = "scalar"

[[variables]]
name = "{DEPTH}"
role = "output"
grid = 0
units = "m"
initial = 10.0

[[variables]]
name = "{BEDLOAD}"
role = "input"
grid = 0
units = "kg / s"

[[variables]]
name = "{WAVE_HEIGHT}"
role = "input"
grid = 1
units = "m"
initial = 2.0

[[couplings]]
target = "{DEPTH}"
source = "{WAVE_HEIGHT}"
rate = -0.001

[[couplings]]
target = "{DEPTH}"
source = "{BEDLOAD}"
rate = -0.0001
"#
    )
}

pub fn coastline(rows: usize, cols: usize, step: f64) -> ConfigSource {
    ConfigSource::Inline(coastline_config(rows, cols, step))
}
