//! `bmi-run inspect`: print what a model declares.

use anyhow::Context;
use bmi_core::grid::GridDescriptor;
use bmi_core::time::TimeInfo;
use bmi_core::variable::VariableDescriptor;
use bmi_core::with_model;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{connector, load_config};

struct Inspection {
    component: String,
    time: TimeInfo,
    variables: Vec<VariableDescriptor>,
    grids: BTreeMap<i32, GridDescriptor>,
}

pub fn execute(config: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&config)?;
    let connector = connector();

    let inspection = with_model(&connector, &config.endpoint, |model| {
        model.initialize(&config.model.config)?;

        let component = model.component_name()?;
        let time = model.time_info()?;
        let mut variables = vec![];
        let mut grids = BTreeMap::new();
        for name in model.catalog().names() {
            let variable = model.describe_variable(&name)?;
            if !grids.contains_key(&variable.grid) {
                grids.insert(variable.grid, model.describe_grid(variable.grid)?);
            }
            variables.push(variable);
        }

        Ok(Inspection {
            component,
            time,
            variables,
            grids,
        })
    })
    .with_context(|| format!("failed to inspect model at {}", config.endpoint.address))?;

    println!("Component: {}", inspection.component);
    println!(
        "Time: {} to {} {} (step {}, now {})",
        inspection.time.start,
        inspection.time.end,
        inspection.time.units,
        inspection.time.step,
        inspection.time.current
    );
    println!();

    println!(
        "  {:<60} {:<13} {:<8} {:<10} {:>4}",
        "Variable", "Role", "Type", "Units", "Grid"
    );
    println!("  {}", "-".repeat(99));
    for variable in &inspection.variables {
        println!(
            "  {:<60} {:<13} {:<8} {:<10} {:>4}",
            variable.name,
            variable.role.to_string(),
            variable.element_type.to_string(),
            variable.units,
            variable.grid
        );
    }
    println!();

    for grid in inspection.grids.values() {
        println!(
            "  Grid {}: {} rank {} shape {:?} ({} values)",
            grid.id,
            grid.grid_type,
            grid.rank,
            grid.shape,
            grid.size()
        );
        if let (Some(spacing), Some(origin)) = (&grid.spacing, &grid.origin) {
            println!("    spacing {:?} origin {:?}", spacing, origin);
        }
    }
    Ok(())
}
