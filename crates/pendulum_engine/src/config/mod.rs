//! Configuration system

use serde::{Deserialize, Serialize};

/// Configuration trait
///
/// Implemented by plain-data config structs; provides file round-trips
/// in TOML or RON based on the file extension.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Simulation and presentation settings for the pendulum demo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Gravitational acceleration in m/s^2
    pub gravity: f32,

    /// Pendulum wire length in meters
    pub wire_length: f32,

    /// Initial pendulum angle in radians
    pub initial_angle: f32,

    /// Number of buffered frame slots (ring depth)
    pub frame_slots: usize,

    /// Minimum orbit-camera radius
    pub camera_radius_min: f32,

    /// Maximum orbit-camera radius
    pub camera_radius_max: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            wire_length: 3.0,
            initial_angle: 0.0,
            frame_slots: 3,
            camera_radius_min: 15.0,
            camera_radius_max: 50.0,
        }
    }
}

impl Config for SimulationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_demo_constants() {
        let config = SimulationConfig::default();
        assert_eq!(config.gravity, 9.8);
        assert_eq!(config.wire_length, 3.0);
        assert_eq!(config.frame_slots, 3);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = SimulationConfig {
            initial_angle: 0.3,
            ..Default::default()
        };

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SimulationConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.initial_angle, 0.3);
        assert_eq!(parsed.frame_slots, config.frame_slots);
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let config = SimulationConfig::default();
        let result = config.save_to_file("settings.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
