//! Reads a [`SimulationConfig`] from disk.

use std::{fs, path::Path};

use log::info;

use crate::config::SimulationConfig;

use super::AppError;

/// Loads the JSON configuration at `path`, or the defaults when no path is
/// given. Fields missing from the file keep their defaults.
///
/// # Errors
///
/// Returns [`AppError::ReadConfig`] if the file cannot be read and
/// [`AppError::ParseConfig`] if it is not a valid configuration.
pub fn load(path: Option<&Path>) -> Result<SimulationConfig, AppError> {
    let Some(path) = path else {
        info!("No config file provided, using defaults");
        return Ok(SimulationConfig::default());
    };

    let content = fs::read_to_string(path).map_err(|source| AppError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let config = SimulationConfig::from_json_str(&content).map_err(|source| AppError::ParseConfig {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Loaded config from '{}'", path.display());
    Ok(config)
}
