use std::time::Duration;

use crate::constants::{clustering, geocode};
use crate::errors::DedupeError;

/// Controls candidate generation and match gating in the clustering engine.
#[derive(Clone, Copy, Debug)]
pub struct ClusterConfig {
    /// Geospatial radius for candidate generation, in meters (inclusive).
    ///
    /// Tune 80-150 for urban density, 250-400 for rural/sparse density.
    pub distance_threshold_m: f64,
    /// Minimum token-set similarity (0-100) to accept a name-based match.
    pub name_similarity_threshold: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            distance_threshold_m: clustering::DISTANCE_THRESHOLD_M,
            name_similarity_threshold: clustering::NAME_SIMILARITY_THRESHOLD,
        }
    }
}

impl ClusterConfig {
    /// Reject thresholds the engine cannot work with.
    pub fn validate(&self) -> Result<(), DedupeError> {
        if !self.distance_threshold_m.is_finite() || self.distance_threshold_m <= 0.0 {
            return Err(DedupeError::Configuration(format!(
                "distance_threshold_m must be positive and finite, got {}",
                self.distance_threshold_m
            )));
        }
        if self.name_similarity_threshold > 100 {
            return Err(DedupeError::Configuration(format!(
                "name_similarity_threshold must be on the 0-100 scale, got {}",
                self.name_similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Controls geo-enrichment orchestration across providers.
#[derive(Clone, Copy, Debug)]
pub struct EnrichConfig {
    /// Pause between failed lookup rounds, for provider rate limits.
    pub pacing_delay: Duration,
    /// Retry with the postal code dropped when the full query fails or the
    /// record has no postal code.
    pub drop_zip_fallback: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(geocode::PACING_DELAY_MS),
            drop_zip_fallback: true,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineConfig {
    /// Engine thresholds applied inside every block.
    pub cluster: ClusterConfig,
    /// Enrichment orchestration settings.
    pub enrich: EnrichConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_validate() {
        assert!(ClusterConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let zero_radius = ClusterConfig {
            distance_threshold_m: 0.0,
            ..ClusterConfig::default()
        };
        assert!(zero_radius.validate().is_err());

        let out_of_scale = ClusterConfig {
            name_similarity_threshold: 101,
            ..ClusterConfig::default()
        };
        assert!(out_of_scale.validate().is_err());
    }
}
