//! `bmi-run run`: drive the configured stepping loop.

use anyhow::Context;
use bmi_core::time_loop::TimeLoop;
use bmi_core::with_model;
use bmi_driver::OutputStats;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::{connector, load_config};

pub fn execute(config: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(&config)?;
    let connector = connector();

    let summary = with_model(&connector, &config.endpoint, |model| {
        model.initialize(&config.model.config)?;
        let time_loop = TimeLoop::from_run_config(model, &config.run)?;
        time_loop.run_with(model, |record| {
            info!(iteration = record.iteration, time = record.time, "Step complete");
            Ok(())
        })
    })
    .with_context(|| format!("run against {} failed", config.endpoint.address))?;

    println!(
        "Ran {} iterations from {} to {}",
        summary.iterations, summary.start_time, summary.end_time
    );
    if !summary.outputs.is_empty() {
        println!();
        println!(
            "  {:<60} {:>12} {:>12} {:>12}",
            "Output", "Min", "Max", "Mean"
        );
        println!("  {}", "-".repeat(99));
        for (name, values) in &summary.outputs {
            if let Some(stats) = OutputStats::from_buffer(values) {
                println!(
                    "  {:<60} {:>12.4} {:>12.4} {:>12.4}",
                    name, stats.min, stats.max, stats.mean
                );
            }
        }
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write outputs to {}", path.display()))?;
        println!();
        println!("Wrote final outputs to {}", path.display());
    }
    Ok(())
}
