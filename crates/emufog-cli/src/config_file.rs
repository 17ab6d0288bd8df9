//! YAML configuration loading.

use std::fs;
use std::path::Path;

use emufog_core::{Config, ConfigError, DeviceSampling, DeviceType, FogType};
use serde::Deserialize;

/// The on-disk shape of a config file; optional fields fall back to [`Config`]'s own defaults.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub max_fog_nodes: u32,
    pub cost_threshold: f32,
    pub backbone_degree_factor: Option<f32>,
    #[serde(default)]
    pub device_node_types: Vec<DeviceType>,
    pub fog_node_types: Vec<FogType>,
    pub device_sampling: Option<DeviceSampling>,
    #[serde(default)]
    pub time_measuring: bool,
}

/// Errors loading a config file: either it couldn't be read/parsed, or the parsed values failed
/// [`Config::validate`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Loads and validates a [`Config`] from a YAML file at `path`.
pub fn load(path: &Path) -> Result<Config, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = serde_yaml::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut builder = Config::builder()
        .max_fog_nodes(parsed.max_fog_nodes)
        .cost_threshold(parsed.cost_threshold)
        .device_node_types(parsed.device_node_types)
        .fog_node_types(parsed.fog_node_types)
        .time_measuring(parsed.time_measuring);
    if let Some(factor) = parsed.backbone_degree_factor {
        builder = builder.backbone_degree_factor(factor);
    }
    if let Some(sampling) = parsed.device_sampling {
        builder = builder.device_sampling(sampling);
    }
    let config = builder.build();

    config.validate()?;
    Ok(config)
}
