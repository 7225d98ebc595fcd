pub mod inspect;
pub mod run;

use anyhow::Context;
use bmi_components::LocalConnector;
use bmi_core::config::DriverConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the log subscriber; `RUST_LOG` takes precedence over `verbose`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config(path: &Path) -> anyhow::Result<DriverConfig> {
    DriverConfig::from_path(path)
        .with_context(|| format!("failed to load driver configuration {}", path.display()))
}

/// The connector for every transport this binary understands.
pub fn connector() -> LocalConnector {
    LocalConnector::with_reference_model()
}
