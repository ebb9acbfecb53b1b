//! Render settings.
//!
//! Every field has a default, so a JSON document only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse render config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("continuation probability must be in (0, 1], got {0}")]
    ContinuationProbability(f32),

    #[error("photon radius must be positive, got {0}")]
    PhotonRadius(f32),

    #[error("at least one shadow sample per light is required")]
    NoShadowSamples,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Bounce depth past which Russian roulette always terminates
    pub max_depth: u32,
    /// Roulette survival probability for every bounce after the camera ray
    pub continuation_probability: f32,
    /// Shadow rays per light at each diffuse hit
    pub shadow_samples: u32,
    /// Add the photon-map caustics estimate at diffuse hits
    pub use_photon_map: bool,
    /// Gather radius for the caustics estimate
    pub photon_radius: f32,
    /// Outer emission passes when building the photon map
    pub photon_passes: u32,
    /// Depth budget for mesh octrees
    pub octree_max_depth: u32,
    /// Base seed for photon emission and per-pixel generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            continuation_probability: 0.8,
            shadow_samples: 1,
            use_photon_map: true,
            photon_radius: 0.05,
            photon_passes: 1,
            octree_max_depth: 8,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges the renderer relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        let p = self.continuation_probability;
        if !(p > 0.0 && p <= 1.0) {
            return Err(ConfigError::ContinuationProbability(p));
        }
        if !(self.photon_radius > 0.0 && self.photon_radius.is_finite()) {
            return Err(ConfigError::PhotonRadius(self.photon_radius));
        }
        if self.shadow_samples == 0 {
            return Err(ConfigError::NoShadowSamples);
        }
        Ok(())
    }
}
