/// Pipeline and road mask configuration with validation
use crate::error::{Result, TerrainError};
use constants::heightfield::{
    DEFAULT_MARGIN_HEIGHT_MULTIPLIER, DEFAULT_MARGIN_RADIUS, DEFAULT_PATH_HEIGHT_MULTIPLIER,
    MAX_ADDITIONAL_CASTS, RECAST_OFFSET,
};
use constants::road_mask::{DEFAULT_HOLE_RADIUS, DEFAULT_ROAD_CHANNELS, DEFAULT_TEXTURE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rule deciding whether a snapped height counts as a determined sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Determination {
    /// Every ray hit is determined, whatever its height.
    #[default]
    Explicit,
    /// Only strictly positive heights are determined, matching heightmaps
    /// that use zero as the "no data" marker.
    PositiveSign,
}

impl Determination {
    /// Tag a snapped value, dropping it when the rule rejects it.
    ///
    /// Non-finite values are never determined.
    pub fn classify(self, value: f32) -> Option<f32> {
        match self {
            _ if !value.is_finite() => None,
            Determination::Explicit => Some(value),
            Determination::PositiveSign if value > 0.0 => Some(value),
            Determination::PositiveSign => None,
        }
    }
}

/// How stage work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Rows are distributed over the rayon pool.
    #[default]
    Parallel,
    /// Everything runs on the calling thread.
    Serial,
}

/// Heightfield reconstruction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cast down from the top of the bounds (walking through stacked
    /// surfaces) instead of a single cast up from the base.
    pub raycast_from_above: bool,
    pub path_height_multiplier: f32,
    /// Margin radius in cells; zero disables margin propagation.
    pub margin_radius: f64,
    pub margin_height_multiplier: f32,
    pub max_additional_casts: u32,
    /// World distance a chained ray advances past the previous hit.
    pub recast_offset: f32,
    pub determination: Determination,
    pub execution: ExecutionMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raycast_from_above: true,
            path_height_multiplier: DEFAULT_PATH_HEIGHT_MULTIPLIER,
            margin_radius: DEFAULT_MARGIN_RADIUS,
            margin_height_multiplier: DEFAULT_MARGIN_HEIGHT_MULTIPLIER,
            max_additional_casts: MAX_ADDITIONAL_CASTS,
            recast_offset: RECAST_OFFSET,
            determination: Determination::default(),
            execution: ExecutionMode::default(),
        }
    }
}

impl PipelineConfig {
    /// Fail fast on values that would make a stage meaningless
    pub fn validate(&self) -> Result<()> {
        if !self.margin_radius.is_finite() || self.margin_radius < 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "margin radius must be a finite non-negative number, got {}",
                self.margin_radius
            )));
        }
        if !self.path_height_multiplier.is_finite() {
            return Err(TerrainError::InvalidConfig(
                "path height multiplier must be finite".to_string(),
            ));
        }
        if !self.margin_height_multiplier.is_finite() {
            return Err(TerrainError::InvalidConfig(
                "margin height multiplier must be finite".to_string(),
            ));
        }
        if self.raycast_from_above && !(self.recast_offset.is_finite() && self.recast_offset > 0.0) {
            return Err(TerrainError::InvalidConfig(format!(
                "recast offset must be positive, got {}",
                self.recast_offset
            )));
        }
        Ok(())
    }

    /// Extra casts after the first hit; upward probes never chain
    pub fn additional_casts(&self) -> u32 {
        if self.raycast_from_above {
            self.max_additional_casts
        } else {
            0
        }
    }
}

/// Road mask and minimap plane settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Coverage channels that count as road surface.
    pub road_channels: BTreeSet<usize>,
    /// A road channel must strictly exceed this weight.
    pub texture_threshold: f32,
    /// Radius used when the mask is built from road points.
    pub hole_radius: f32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            road_channels: DEFAULT_ROAD_CHANNELS.iter().copied().collect(),
            texture_threshold: DEFAULT_TEXTURE_THRESHOLD,
            hole_radius: DEFAULT_HOLE_RADIUS,
        }
    }
}

impl MaskConfig {
    /// Check channels against the coverage layout and reject unusable thresholds
    pub fn validate(&self, channels: usize) -> Result<()> {
        if self.road_channels.is_empty() {
            return Err(TerrainError::InvalidConfig(
                "at least one road channel is required".to_string(),
            ));
        }
        if let Some(&channel) = self.road_channels.iter().find(|&&c| c >= channels) {
            return Err(TerrainError::ChannelOutOfRange { channel, channels });
        }
        if !self.texture_threshold.is_finite() {
            return Err(TerrainError::InvalidConfig(
                "texture threshold must be finite".to_string(),
            ));
        }
        self.validate_hole_radius()
    }

    /// Radius check on its own, for masks built from points rather than coverage
    pub fn validate_hole_radius(&self) -> Result<()> {
        if !(self.hole_radius.is_finite() && self.hole_radius >= 0.0) {
            return Err(TerrainError::InvalidConfig(format!(
                "hole radius must be non-negative, got {}",
                self.hole_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shared_constants() {
        let config = PipelineConfig::default();
        assert!(config.raycast_from_above);
        assert_eq!(config.path_height_multiplier, 0.99);
        assert_eq!(config.margin_radius, 10.0);
        assert_eq!(config.additional_casts(), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn upward_casts_never_chain() {
        let config = PipelineConfig {
            raycast_from_above: false,
            ..PipelineConfig::default()
        };
        assert_eq!(config.additional_casts(), 0);
    }

    #[test]
    fn rejects_negative_margin_radius() {
        let config = PipelineConfig {
            margin_radius: -1.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(TerrainError::InvalidConfig(_))));

        let config = PipelineConfig {
            margin_radius: f64::NAN,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "margin_radius": 2.5, "determination": "positive_sign" }"#)
                .unwrap();
        assert_eq!(config.margin_radius, 2.5);
        assert_eq!(config.determination, Determination::PositiveSign);
        assert_eq!(config.margin_height_multiplier, 1.01);
        assert_eq!(config.execution, ExecutionMode::Parallel);
    }

    #[test]
    fn positive_sign_rule_drops_non_positive_heights() {
        assert_eq!(Determination::PositiveSign.classify(0.0), None);
        assert_eq!(Determination::PositiveSign.classify(0.25), Some(0.25));
        assert_eq!(Determination::Explicit.classify(-0.5), Some(-0.5));
    }

    #[test]
    fn non_finite_heights_are_never_determined() {
        for rule in [Determination::Explicit, Determination::PositiveSign] {
            assert_eq!(rule.classify(f32::NAN), None);
            assert_eq!(rule.classify(f32::INFINITY), None);
            assert_eq!(rule.classify(f32::NEG_INFINITY), None);
        }
    }

    #[test]
    fn mask_config_checks_channel_range() {
        let config = MaskConfig::default();
        assert!(config.validate(4).is_ok());
        assert!(matches!(
            config.validate(1),
            Err(TerrainError::ChannelOutOfRange { channel: 1, channels: 1 })
        ));
    }
}
