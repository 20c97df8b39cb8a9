//! Error types for handswarm.
//!
//! Construction-time problems (bad configuration, unreadable config files)
//! surface as [`ConfigError`]. Once a [`Simulation`](crate::Simulation) is
//! built, the per-frame step cannot fail; only the rendering collaborator can
//! report errors, which travel as [`SimulationError`].

use thiserror::Error;

/// Errors that can occur while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Particle count was zero.
    #[error("particle count must be at least 1")]
    NoParticles,
    /// A constant was NaN or infinite.
    #[error("`{field}` must be finite, got {value}")]
    NonFinite {
        /// Dotted path of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A constant was finite but outside its allowed range.
    #[error("`{field}` = {value} is out of range (expected {expected})")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Human readable description of the valid range.
        expected: &'static str,
    },
    /// Failed to read a configuration file from disk.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration file was not valid JSON for [`SimConfig`](crate::SimConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur when running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The simulation could not be constructed.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The rendering collaborator rejected a frame.
    #[error("render error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_message_names_field() {
        let err = ConfigError::NonFinite {
            field: "forces.damping",
            value: f32::NAN,
        };
        assert!(err.to_string().contains("forces.damping"));
    }

    #[test]
    fn test_config_error_converts_into_simulation_error() {
        let err: SimulationError = ConfigError::NoParticles.into();
        assert!(matches!(err, SimulationError::Config(ConfigError::NoParticles)));
        assert!(err.to_string().contains("at least 1"));
    }
}
