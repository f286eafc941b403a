//! Startup configuration and validation.

use dpend_model::{Params, StateVec};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// RGB color triple.
pub type Color = [u8; 3];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("window dimensions must be nonzero, got {width}x{height}")]
    EmptyWindow { width: usize, height: usize },

    #[error("trail capacity must be nonzero in dots mode")]
    ZeroTrailCapacity,

    #[error("initial state contains a non-finite component")]
    NonFiniteInitialState,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the second bob's history is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailMode {
    /// Connected line segments through every recorded point. The history is
    /// unbounded; memory grows for as long as the simulation runs.
    Lines,
    /// Fixed-capacity ring of points drawn as circles shrinking with age.
    Dots,
}

/// All recognized startup options. Immutable once the loop starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Rod lengths, masses, gravity.
    pub params: Params,
    /// Initial `[θ1, ω1, θ2, ω2]`.
    pub initial_state: [f64; 4],
    /// Window width (px).
    pub width: usize,
    /// Window height (px).
    pub height: usize,
    /// Target frame rate (Hz).
    pub target_fps: usize,
    /// Pixels per meter.
    pub scale: f64,
    /// Pivot y position (px); the pivot x defaults to the window center.
    pub pivot_y: i32,
    pub trail_mode: TrailMode,
    /// Ring capacity for dots mode.
    pub trail_capacity: usize,
    /// Base dot radius for dots mode (px).
    pub dot_radius: i32,
    pub background: Color,
    pub rod_color: Color,
    pub pivot_color: Color,
    pub bob1_color: Color,
    pub bob2_color: Color,
    pub trail_color: Color,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            params: Params::default(),
            // 45° and 10° deflections, both bobs kicked at 4 rad/s.
            initial_state: [
                std::f64::consts::FRAC_PI_4,
                4.0,
                std::f64::consts::PI / 18.0,
                4.0,
            ],
            width: 1200,
            height: 800,
            target_fps: 50,
            scale: 1000.0,
            pivot_y: 15,
            trail_mode: TrailMode::Dots,
            trail_capacity: 10,
            dot_radius: 10,
            background: [255, 255, 255],
            rod_color: [0, 0, 0],
            pivot_color: [0, 0, 0],
            bob1_color: [0, 255, 0],
            bob2_color: [0, 0, 255],
            trail_color: [255, 127, 0],
        }
    }
}

impl SimConfig {
    /// Check every startup parameter. Called before any window is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("l1", self.params.l1),
            ("l2", self.params.l2),
            ("m1", self.params.m1),
            ("m2", self.params.m2),
            ("g", self.params.g),
            ("scale", self.scale),
            ("target_fps", self.target_fps as f64),
            ("dot_radius", self.dot_radius as f64),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyWindow {
                width: self.width,
                height: self.height,
            });
        }
        if self.trail_mode == TrailMode::Dots && self.trail_capacity == 0 {
            return Err(ConfigError::ZeroTrailCapacity);
        }
        if !self.initial_state.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::NonFiniteInitialState);
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn initial_state_vec(&self) -> StateVec {
        StateVec::from(self.initial_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default().validate().expect("default config");
    }

    #[test]
    fn rejects_non_positive_physical_parameters() {
        for field in ["l1", "l2", "m1", "m2", "g"] {
            let mut config = SimConfig::default();
            match field {
                "l1" => config.params.l1 = 0.0,
                "l2" => config.params.l2 = -1.0,
                "m1" => config.params.m1 = 0.0,
                "m2" => config.params.m2 = -0.5,
                _ => config.params.g = 0.0,
            }
            assert!(
                matches!(config.validate(), Err(ConfigError::NonPositive { .. })),
                "{field} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_zero_frame_rate() {
        let config = SimConfig {
            target_fps: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "target_fps", .. })
        ));
    }

    #[test]
    fn rejects_zero_trail_capacity_in_dots_mode() {
        let config = SimConfig {
            trail_mode: TrailMode::Dots,
            trail_capacity: 0,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTrailCapacity)));

        // Lines mode ignores the capacity.
        let config = SimConfig {
            trail_mode: TrailMode::Lines,
            trail_capacity: 0,
            ..SimConfig::default()
        };
        config.validate().expect("lines mode has no capacity");
    }

    #[test]
    fn rejects_non_finite_initial_state() {
        let config = SimConfig {
            initial_state: [0.0, f64::INFINITY, 0.0, 0.0],
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteInitialState)
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let config = SimConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.initial_state, config.initial_state);
        assert_eq!(back.trail_mode, config.trail_mode);
        assert_eq!(back.params, config.params);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let back: SimConfig = serde_json::from_str(r#"{"target_fps": 60}"#).unwrap();
        assert_eq!(back.target_fps, 60);
        assert_eq!(back.width, SimConfig::default().width);
    }
}
