// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel tolerances and iteration limits

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunable constants for one boolean operation.
///
/// Every tolerance used by the kernel is derived from this struct and the
/// operands' scale when a [`CsgContext`](crate::csg::CsgContext) is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsgConfig {
    /// Lower bound on the base epsilon
    pub min_epsilon: f64,
    /// Base epsilon relative to the operation's bounds extents
    pub epsilon_scale_factor: f64,
    /// Vertex lookup radius, in multiples of the base epsilon
    pub vertex_merge_factor: f64,
    /// Coplanarity tolerance, in multiples of the base epsilon
    pub coplanar_factor: f64,
    /// Plane-pair tolerance (normal and distance) below which the splitter
    /// treats two polygons as coplanar and never splits one by the other
    pub coplanar_plane_eps: f64,
    /// Outer pass ceiling for each split of one object by another
    pub max_split_passes: usize,
    /// Ray perturbation attempts when classifying a polygon
    pub max_raycast_attempts: usize,
    /// Per-component range of a ray perturbation
    pub perturbation_magnitude: f64,
    /// Seed mixed into every ray perturbation sequence
    pub perturbation_seed: u64,
    /// Total growth applied to the operation bounds before sizing epsilons
    pub operation_bounds_padding: f64,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            min_epsilon: 1e-4,
            epsilon_scale_factor: 1e-6,
            vertex_merge_factor: 3.0,
            coplanar_factor: 10.0,
            coplanar_plane_eps: 1e-3,
            max_split_passes: 100,
            max_raycast_attempts: 5,
            perturbation_magnitude: 0.1,
            perturbation_seed: 0x5eed_c56f,
            operation_bounds_padding: 0.01,
        }
    }
}

impl CsgConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: CsgConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `polycsg.toml` from the working directory if present, then apply
    /// environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from("polycsg.toml").exists() {
            Self::from_file("polycsg.toml")?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(passes) = std::env::var("POLYCSG_MAX_SPLIT_PASSES") {
            self.max_split_passes = passes
                .parse()
                .with_context(|| format!("Invalid POLYCSG_MAX_SPLIT_PASSES: {passes}"))?;
        }

        if let Ok(attempts) = std::env::var("POLYCSG_MAX_RAYCAST_ATTEMPTS") {
            self.max_raycast_attempts = attempts
                .parse()
                .with_context(|| format!("Invalid POLYCSG_MAX_RAYCAST_ATTEMPTS: {attempts}"))?;
        }

        if let Ok(seed) = std::env::var("POLYCSG_PERTURBATION_SEED") {
            self.perturbation_seed = seed
                .parse()
                .with_context(|| format!("Invalid POLYCSG_PERTURBATION_SEED: {seed}"))?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Base epsilon for an operation whose bounds have the given extents magnitude
    pub fn epsilon_for_scale(&self, geometry_scale: f64) -> f64 {
        self.min_epsilon.max(geometry_scale * self.epsilon_scale_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CsgConfig::default();
        assert_eq!(config.max_split_passes, 100);
        assert_eq!(config.max_raycast_attempts, 5);
        assert_eq!(config.epsilon_for_scale(1.0), 1e-4);
        approx::assert_relative_eq!(config.epsilon_for_scale(1e3), 1e-3, epsilon = 1e-15);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CsgConfig = toml::from_str("max_split_passes = 12\n").unwrap();
        assert_eq!(config.max_split_passes, 12);
        assert_eq!(config.coplanar_plane_eps, 1e-3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polycsg.toml");

        let config = CsgConfig {
            perturbation_seed: 42,
            max_raycast_attempts: 3,
            ..CsgConfig::default()
        };
        config.save(&path).unwrap();

        let reloaded = CsgConfig::from_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = CsgConfig::from_file("/nonexistent/polycsg.toml").unwrap_err();
        assert!(format!("{err}").contains("Failed to read config file"));
    }
}
