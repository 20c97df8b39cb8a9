//! Construction-time configuration.
//!
//! Every tunable of the simulation lives here. Defaults reproduce the
//! reference look: 1,050,000 particles in a 100 × 60 × 50 box, springs of
//! 0.015, damping of 0.95 and a pointer that reaches about 39 units.
//!
//! Configs can be built in code or loaded from JSON. Missing fields fall back
//! to their defaults, so a file only needs the values it changes:
//!
//! ```ignore
//! {
//!     "particle_count": 200000,
//!     "forces": { "pull_gain": 0.12 }
//! }
//! ```
//!
//! All values are fixed for the lifetime of a [`Simulation`](crate::Simulation);
//! there is no runtime reconfiguration.

use std::ops::RangeBounds;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters of the per-particle force model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Spring constant pulling each particle toward its rest position.
    pub spring_constant: f32,
    /// Per-frame velocity multiplier, applied on every axis. Must be in `[0, 1)`.
    pub damping: f32,
    /// Weight of the depth axis in the pointer distance. Small values turn the
    /// spherical influence region into a cylinder along z.
    pub flatten_factor: f32,
    /// Squared influence radius of the pointer, in simulation units².
    pub influence_radius_sq: f32,
    /// Gain of the attractive (pinching) pointer force.
    pub pull_gain: f32,
    /// Gain of the repulsive (open hand) pointer force.
    pub push_gain: f32,
    /// Amplitude of the depth noise injected by the repulsive branch.
    pub noise_amplitude: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            spring_constant: 0.015,
            damping: 0.95,
            flatten_factor: 0.1,
            influence_radius_sq: 1500.0,
            pull_gain: 0.08,
            push_gain: 0.02,
            noise_amplitude: 1.5,
        }
    }
}

/// Parameters of the rotation filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Normalized deflection (per axis) that must be exceeded before the
    /// pointer steers rotation.
    pub dead_zone: f32,
    /// Radians added to the target per frame per unit of deflection.
    pub gain: f32,
    /// Fraction of the remaining distance to the target covered each frame.
    pub smoothing: f32,
    /// Radians of yaw added per frame while no pointer is present.
    pub idle_drift: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            dead_zone: 0.2,
            gain: 0.02,
            smoothing: 0.1,
            idle_drift: 0.002,
        }
    }
}

/// Hue band used to color particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub hue_min: f32,
    pub hue_max: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            hue_min: 0.5,
            hue_max: 0.7,
            saturation: 0.8,
            lightness: 0.6,
        }
    }
}

/// Mapping from normalized hand landmarks to simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Simulation units spanned by the full image width and height.
    pub scale: Vec2,
    /// Flip the horizontal axis to compensate for a mirrored camera feed.
    pub mirror_x: bool,
    /// Fingertip-to-thumb distance, in normalized image units, below which
    /// the hand counts as pinching.
    pub pinch_threshold: f32,
    /// Number of consecutive polls without a fresh detection after which the
    /// cached signal decays to absent. `None` keeps it forever.
    pub stale_after_frames: Option<u32>,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            scale: Vec2::new(120.0, 80.0),
            mirror_x: true,
            pinch_threshold: 0.05,
            stale_after_frames: Some(30),
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of particles. Fixed for the lifetime of the store.
    pub particle_count: usize,
    /// Half extents of the box rest positions are sampled from.
    pub bounds: Vec3,
    /// RNG seed. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub forces: ForceConfig,
    pub orientation: OrientationConfig,
    pub palette: PaletteConfig,
    pub pointer: PointerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: 1_050_000,
            bounds: Vec3::new(50.0, 30.0, 25.0),
            seed: None,
            forces: ForceConfig::default(),
            orientation: OrientationConfig::default(),
            palette: PaletteConfig::default(),
            pointer: PointerConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every value, failing on the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }

        for (field, value) in [
            ("bounds.x", self.bounds.x),
            ("bounds.y", self.bounds.y),
            ("bounds.z", self.bounds.z),
        ] {
            positive(field, value)?;
        }

        let f = &self.forces;
        non_negative("forces.spring_constant", f.spring_constant)?;
        in_range("forces.damping", f.damping, 0.0..1.0, "0 <= damping < 1")?;
        non_negative("forces.flatten_factor", f.flatten_factor)?;
        positive("forces.influence_radius_sq", f.influence_radius_sq)?;
        non_negative("forces.pull_gain", f.pull_gain)?;
        non_negative("forces.push_gain", f.push_gain)?;
        non_negative("forces.noise_amplitude", f.noise_amplitude)?;
        // Pinching adds up to `pull_gain` of stiffness on top of the spring;
        // the damped step diverges once damping * stiffness reaches 2 * (1 + damping).
        let stiffness = f.spring_constant + f.pull_gain;
        if f.damping * stiffness >= 2.0 * (1.0 + f.damping) {
            return Err(ConfigError::OutOfRange {
                field: "forces.spring_constant",
                value: f.spring_constant,
                expected: "damping * (spring_constant + pull_gain) < 2 * (1 + damping)",
            });
        }

        let o = &self.orientation;
        non_negative("orientation.dead_zone", o.dead_zone)?;
        finite("orientation.gain", o.gain)?;
        finite("orientation.smoothing", o.smoothing)?;
        if o.smoothing <= 0.0 || o.smoothing > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "orientation.smoothing",
                value: o.smoothing,
                expected: "0 < smoothing <= 1",
            });
        }
        finite("orientation.idle_drift", o.idle_drift)?;

        let p = &self.palette;
        finite("palette.hue_min", p.hue_min)?;
        finite("palette.hue_max", p.hue_max)?;
        if p.hue_max < p.hue_min {
            return Err(ConfigError::OutOfRange {
                field: "palette.hue_max",
                value: p.hue_max,
                expected: "hue_max >= hue_min",
            });
        }
        in_range("palette.saturation", p.saturation, 0.0..=1.0, "0..=1")?;
        in_range("palette.lightness", p.lightness, 0.0..=1.0, "0..=1")?;

        let ptr = &self.pointer;
        positive("pointer.scale.x", ptr.scale.x)?;
        positive("pointer.scale.y", ptr.scale.y)?;
        positive("pointer.pinch_threshold", ptr.pinch_threshold)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            expected: ">= 0",
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "> 0",
        });
    }
    Ok(())
}

fn in_range(
    field: &'static str,
    value: f32,
    range: impl RangeBounds<f32>,
    expected: &'static str,
) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !range.contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reference_constants() {
        let config = SimConfig::default();
        assert_eq!(config.particle_count, 1_050_000);
        assert_eq!(config.bounds, Vec3::new(50.0, 30.0, 25.0));
        assert_eq!(config.forces.influence_radius_sq, 1500.0);
        assert_eq!(config.orientation.idle_drift, 0.002);
    }

    #[test]
    fn test_zero_particles_rejected() {
        let config = SimConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoParticles)));
    }

    #[test]
    fn test_non_finite_constant_rejected() {
        let mut config = SimConfig::default();
        config.forces.spring_constant = f32::INFINITY;
        match config.validate() {
            Err(ConfigError::NonFinite { field, .. }) => assert_eq!(field, "forces.spring_constant"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_damping_of_one_rejected() {
        let mut config = SimConfig::default();
        config.forces.damping = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "forces.damping", .. })
        ));
    }

    #[test]
    fn test_unstable_stiffness_rejected() {
        let mut config = SimConfig::default();
        config.forces.spring_constant = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "forces.spring_constant", .. })
        ));

        // Spring alone is stable, but a strong pinch pushes it over.
        let mut config = SimConfig::default();
        config.forces.spring_constant = 1.0;
        assert!(config.validate().is_ok());
        config.forces.pull_gain = 4.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_smoothing_rejected() {
        let mut config = SimConfig::default();
        config.orientation.smoothing = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "particle_count": 64, "forces": { "pull_gain": 0.1 } }"#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 64);
        assert_eq!(config.forces.pull_gain, 0.1);
        assert_eq!(config.forces.push_gain, 0.02);
        assert_eq!(config.bounds, Vec3::new(50.0, 30.0, 25.0));
    }

    #[test]
    fn test_json_validation_runs() {
        let result = SimConfig::from_json_str(r#"{ "particle_count": 0 }"#);
        assert!(matches!(result, Err(ConfigError::NoParticles)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swarm.json");
        std::fs::write(&path, r#"{ "bounds": [10.0, 10.0, 10.0], "seed": 7 }"#).unwrap();

        let config = SimConfig::load(&path).unwrap();
        assert_eq!(config.bounds, Vec3::splat(10.0));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SimConfig::load("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
