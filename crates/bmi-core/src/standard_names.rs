//! CSDMS standard names.
//!
//! BMI models identify variables by names drawn from the CSDMS Standard Names vocabulary.
//! A standard name has the form `<object>__<quantity>`: the object part names the thing
//! being described (with `~` introducing an adjective, as in `water_sediment~bedload`)
//! and the quantity part names what is measured.
//!
//! This module provides a syntax check for such names and definitions for the names used by
//! coastline evolution models.
//!
//! # Usage
//!
//! ```rust
//! use bmi_core::standard_names::{is_standard_name, lookup, SEA_WATER__DEPTH};
//!
//! assert!(is_standard_name("sea_water__depth"));
//! assert!(!is_standard_name("Emissions|CO2"));
//!
//! assert_eq!(SEA_WATER__DEPTH.units, "m");
//! assert_eq!(lookup("sea_water__depth"), Some(&SEA_WATER__DEPTH));
//! ```

/// A registered standard name with its canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardName {
    pub name: &'static str,
    pub units: &'static str,
    pub description: &'static str,
}

macro_rules! define_standard_name {
    ($ident:ident, name = $name:expr, units = $units:expr, description = $description:expr $(,)?) => {
        pub const $ident: StandardName = StandardName {
            name: $name,
            units: $units,
            description: $description,
        };
    };
}

// ============================================================================
// Bathymetry and shoreline
// ============================================================================

define_standard_name!(
    SEA_WATER__DEPTH,
    name = "sea_water__depth",
    units = "m",
    description = "Depth of the sea floor below the water surface",
);

define_standard_name!(
    LAND_SURFACE__ELEVATION,
    name = "land_surface__elevation",
    units = "m",
    description = "Elevation of the land surface above sea level",
);

define_standard_name!(
    LAND_SURFACE_WATER_SEDIMENT_BEDLOAD__MASS_FLOW_RATE,
    name = "land_surface_water_sediment~bedload__mass_flow_rate",
    units = "kg / s",
    description = "Bedload sediment discharge delivered to the coast by rivers",
);

// ============================================================================
// Waves
// ============================================================================

define_standard_name!(
    SEA_SURFACE_WATER_WAVE__HEIGHT,
    name = "sea_surface_water_wave__height",
    units = "m",
    description = "Height of incoming waves",
);

define_standard_name!(
    SEA_SURFACE_WATER_WAVE__PERIOD,
    name = "sea_surface_water_wave__period",
    units = "s",
    description = "Period of incoming waves",
);

define_standard_name!(
    SEA_SURFACE_WATER_WAVE__AZIMUTH_ANGLE_OF_OPPOSITE_OF_PHASE_VELOCITY,
    name = "sea_surface_water_wave__azimuth_angle_of_opposite_of_phase_velocity",
    units = "radians",
    description = "Direction incoming waves approach the shore from",
);

/// All standard names defined in this module.
pub const STANDARD_NAMES: &[StandardName] = &[
    SEA_WATER__DEPTH,
    LAND_SURFACE__ELEVATION,
    LAND_SURFACE_WATER_SEDIMENT_BEDLOAD__MASS_FLOW_RATE,
    SEA_SURFACE_WATER_WAVE__HEIGHT,
    SEA_SURFACE_WATER_WAVE__PERIOD,
    SEA_SURFACE_WATER_WAVE__AZIMUTH_ANGLE_OF_OPPOSITE_OF_PHASE_VELOCITY,
];

/// Looks up a name defined in this module.
pub fn lookup(name: &str) -> Option<&'static StandardName> {
    STANDARD_NAMES.iter().find(|n| n.name == name)
}

/// Checks that `name` follows the `<object>__<quantity>` standard name syntax.
///
/// This is a syntactic check only; it does not consult the full vocabulary.
pub fn is_standard_name(name: &str) -> bool {
    let Some((object, quantity)) = name.split_once("__") else {
        return false;
    };

    is_word(object, &['~', '-']) && is_word(quantity, &['-'])
}

fn is_word(part: &str, extra: &[char]) -> bool {
    !part.is_empty()
        && !part.starts_with('_')
        && !part.ends_with('_')
        && part.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || extra.contains(&c)
        })
}
