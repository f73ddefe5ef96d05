use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What the camera does while nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RestPolicy {
    /// Leave the camera wherever the last follow put it.
    #[default]
    Hold,
    /// Ease back toward a fixed resting position, looking at the origin.
    EaseTo { position: Vec3, smoothing: f32 },
}

/// Configuration for the engine, provided by the hosting scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed timestep in seconds (default: 1/60). Follow smoothing is applied once per step.
    pub fixed_dt: f32,
    /// Fraction of the remaining distance covered per step while following (default: 0.05).
    pub follow_smoothing: f32,
    /// Offset from the followed body to the desired camera position.
    pub follow_offset: Vec3,
    /// Camera behavior with no selection.
    pub rest_policy: RestPolicy,
    /// Camera position at mount.
    pub initial_camera_position: Vec3,
    /// Distance from the origin beyond which the far-field backdrop is shown.
    pub far_field_threshold: f32,
    /// Hysteresis around the threshold. Zero gives a plain strict comparison.
    pub far_field_dead_band: f32,
    /// Pause between the preload join and the ready signal, in seconds.
    pub settle_delay: f64,
    /// Pause between a surface loss and the remount, in seconds.
    pub remount_delay: f64,
    /// Give up on loads still pending this long after preload start.
    pub preload_watchdog: Option<f64>,
    /// Capacity hint for the outgoing event queue.
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            follow_smoothing: 0.05,
            follow_offset: Vec3::new(0.0, 2.0, 5.0),
            rest_policy: RestPolicy::Hold,
            initial_camera_position: Vec3::new(0.0, 0.0, 50.0),
            far_field_threshold: 700.0,
            far_field_dead_band: 0.0,
            settle_delay: 0.3,
            remount_delay: 0.1,
            preload_watchdog: None,
            max_events: 64,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(ConfigError::Invalid { field: "fixed_dt", detail: "must be positive" });
        }
        if !(self.follow_smoothing > 0.0 && self.follow_smoothing <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "follow_smoothing",
                detail: "must be in (0, 1]",
            });
        }
        if let RestPolicy::EaseTo { smoothing, .. } = self.rest_policy {
            if !(smoothing > 0.0 && smoothing <= 1.0) {
                return Err(ConfigError::Invalid {
                    field: "rest_policy.smoothing",
                    detail: "must be in (0, 1]",
                });
            }
        }
        if !(self.far_field_threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "far_field_threshold",
                detail: "must not be negative",
            });
        }
        if !(self.far_field_dead_band >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "far_field_dead_band",
                detail: "must not be negative",
            });
        }
        if !(self.settle_delay >= 0.0) || !(self.remount_delay >= 0.0) {
            return Err(ConfigError::Invalid { field: "delays", detail: "must not be negative" });
        }
        if let Some(watchdog) = self.preload_watchdog {
            if !(watchdog > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "preload_watchdog",
                    detail: "must be positive",
                });
            }
        }
        Ok(())
    }
}

/// Errors produced while loading or validating an [`EngineConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid { field: &'static str, detail: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid engine config: {e}"),
            Self::Invalid { field, detail } => write!(f, "invalid engine config: {field} {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.follow_smoothing, 0.05);
        assert_eq!(config.far_field_threshold, 700.0);
        assert_eq!(config.rest_policy, RestPolicy::Hold);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{ "far_field_threshold": 300.0 }"#).unwrap();
        assert_eq!(config.far_field_threshold, 300.0);
        assert_eq!(config.settle_delay, 0.3);
        assert_eq!(config.remount_delay, 0.1);
    }

    #[test]
    fn parses_ease_to_rest_policy() {
        let json = r#"{
            "rest_policy": { "mode": "ease_to", "position": [0.0, 10.0, 60.0], "smoothing": 0.1 }
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(
            config.rest_policy,
            RestPolicy::EaseTo { position: Vec3::new(0.0, 10.0, 60.0), smoothing: 0.1 }
        );
    }

    #[test]
    fn rejects_out_of_range_smoothing() {
        let err = EngineConfig::from_json(r#"{ "follow_smoothing": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "follow_smoothing", .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
