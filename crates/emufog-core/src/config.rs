//! Pipeline configuration.

use typed_builder::TypedBuilder;

use crate::graph::{DeviceType, FogType};

/// How the device placer draws per-router instance counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSampling {
    /// Draw from a Poisson distribution with mean `avg_per_router`.
    Poisson,
    /// Round `avg_per_router` to the nearest integer. Used for reproducible runs.
    Deterministic,
}

impl Default for DeviceSampling {
    fn default() -> Self {
        DeviceSampling::Poisson
    }
}

/// Errors raised validating a [`Config`] before a run starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric option was outside its valid range.
    #[error("{field} must be {constraint}, got {value}")]
    OutOfRange {
        field: &'static str,
        constraint: &'static str,
        value: String,
    },
    /// `fog_node_types` was empty; the fog placer has nothing to assign.
    #[error("fog_node_types must not be empty")]
    NoFogTypes,
}

/// Validated pipeline configuration, built via [`Config::builder`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct Config {
    /// Hard ceiling on total emitted fog placements.
    pub max_fog_nodes: u32,
    /// Dijkstra relaxation cutoff, in the same units as `edge.latency` (ms).
    pub cost_threshold: f32,
    /// Multiplier applied to average degree in the backbone classifier's high-degree step.
    #[builder(default = 0.6)]
    pub backbone_degree_factor: f32,
    /// Device types the device placer attaches to every edge router.
    #[builder(default)]
    pub device_node_types: Vec<DeviceType>,
    /// Fog container types the fog placer may assign to a winning candidate.
    pub fog_node_types: Vec<FogType>,
    /// Distribution used to draw per-router device counts.
    #[builder(default)]
    pub device_sampling: DeviceSampling,
    /// Enables `Instant`-based timing logs around each pipeline stage.
    #[builder(default)]
    pub time_measuring: bool,
}

impl Config {
    /// Validates the configuration, returning a [`ConfigError`] for the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.backbone_degree_factor) {
            return Err(ConfigError::OutOfRange {
                field: "backbone_degree_factor",
                constraint: "in [0.0, 1.0]",
                value: self.backbone_degree_factor.to_string(),
            });
        }
        if self.cost_threshold <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "cost_threshold",
                constraint: "> 0.0",
                value: self.cost_threshold.to_string(),
            });
        }
        if self.max_fog_nodes == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_fog_nodes",
                constraint: "> 0",
                value: self.max_fog_nodes.to_string(),
            });
        }
        if self.fog_node_types.is_empty() {
            return Err(ConfigError::NoFogTypes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fog_type() -> FogType {
        FogType {
            container: crate::graph::ContainerSpec {
                image: "alpine".into(),
                tag: "latest".into(),
                memory_limit_bytes: 1 << 20,
                cpu_share: 0.1,
            },
            cost: 1.0,
            max_clients: 10,
        }
    }

    #[test]
    fn rejects_empty_fog_types() {
        let cfg = Config::builder()
            .max_fog_nodes(1)
            .cost_threshold(10.0)
            .fog_node_types(Vec::new())
            .build();
        assert!(matches!(cfg.validate(), Err(ConfigError::NoFogTypes)));
    }

    #[test]
    fn rejects_out_of_range_degree_factor() {
        let cfg = Config::builder()
            .max_fog_nodes(1)
            .cost_threshold(10.0)
            .fog_node_types(vec![sample_fog_type()])
            .backbone_degree_factor(1.5)
            .build();
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "backbone_degree_factor", .. })));
    }

    #[test]
    fn rejects_zero_cost_threshold() {
        let cfg = Config::builder()
            .max_fog_nodes(1)
            .cost_threshold(0.0)
            .fog_node_types(vec![sample_fog_type()])
            .build();
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "cost_threshold", .. })));
    }

    #[test]
    fn rejects_zero_max_fog_nodes() {
        let cfg = Config::builder()
            .max_fog_nodes(0)
            .cost_threshold(10.0)
            .fog_node_types(vec![sample_fog_type()])
            .build();
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "max_fog_nodes", .. })));
    }

    #[test]
    fn default_sampling_is_poisson() {
        let cfg = Config::builder()
            .max_fog_nodes(1)
            .cost_threshold(10.0)
            .fog_node_types(vec![sample_fog_type()])
            .build();
        assert_eq!(cfg.device_sampling, DeviceSampling::Poisson);
        assert!(cfg.validate().is_ok());
    }
}
