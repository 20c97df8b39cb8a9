//! Whole-field rotation driven by the pointer.
//!
//! Holding the fingertip off center spins the field continuously in that
//! direction; near the center (inside the dead zone) the rotation holds. With
//! no hand present the field drifts slowly around its vertical axis so the
//! scene never looks frozen. The emitted rotation trails its target through a
//! first-order low-pass filter.
//!
//! Targets are never wrapped: they only ever feed trigonometry.

use glam::{EulerRot, Mat4, Quat};

use crate::config::OrientationConfig;
use crate::pointer::PointerSignal;

/// Rotation applied to the whole particle field at display time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    /// Radians about the vertical (Y) axis.
    pub yaw: f32,
    /// Radians about the horizontal (X) axis.
    pub pitch: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Orientation as a quaternion: pitch about X, then yaw about the rotated Y.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    /// Model matrix for the particle field.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(self.quat())
    }
}

/// Target and smoothed rotation of the field.
///
/// One instance lives as long as the simulation and is passed by `&mut` into
/// each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationState {
    pub target: Rotation,
    pub current: Rotation,
}

impl OrientationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the filter by one frame and return the rotation to display.
    pub fn update(&mut self, config: &OrientationConfig, signal: &PointerSignal) -> Rotation {
        match signal.sanitized() {
            PointerSignal::Present { deflection, .. } => {
                if deflection.x.abs() > config.dead_zone {
                    self.target.yaw += deflection.x * config.gain;
                }
                if deflection.y.abs() > config.dead_zone {
                    self.target.pitch += deflection.y * config.gain;
                }
            }
            PointerSignal::Absent => {
                self.target.yaw += config.idle_drift;
            }
        }

        self.current.yaw += (self.target.yaw - self.current.yaw) * config.smoothing;
        self.current.pitch += (self.target.pitch - self.current.pitch) * config.smoothing;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn pointing(deflection: Vec2) -> PointerSignal {
        PointerSignal::Present {
            point: Vec2::ZERO,
            deflection,
            pinching: false,
        }
    }

    #[test]
    fn test_idle_drift() {
        let config = OrientationConfig::default();
        let mut state = OrientationState::new();
        for _ in 0..100 {
            state.update(&config, &PointerSignal::Absent);
        }
        assert!((state.target.yaw - 0.2).abs() < 1e-5);
        assert_eq!(state.target.pitch, 0.0);
        assert!(state.current.yaw > 0.0 && state.current.yaw < state.target.yaw);
    }

    #[test]
    fn test_dead_zone_is_strict() {
        let config = OrientationConfig::default();

        let mut at_edge = OrientationState::new();
        at_edge.update(&config, &pointing(Vec2::new(0.2, -0.2)));
        assert_eq!(at_edge.target, Rotation::default());

        let mut beyond = OrientationState::new();
        beyond.update(&config, &pointing(Vec2::new(0.21, 0.0)));
        assert!((beyond.target.yaw - 0.21 * 0.02).abs() < 1e-7);
        assert_eq!(beyond.target.pitch, 0.0);
    }

    #[test]
    fn test_centered_pointer_holds_rotation() {
        let config = OrientationConfig::default();
        let mut state = OrientationState::new();
        state.update(&config, &pointing(Vec2::ZERO));
        // No idle drift while a hand is present.
        assert_eq!(state.target, Rotation::default());
    }

    #[test]
    fn test_axes_are_independent() {
        let config = OrientationConfig::default();
        let mut state = OrientationState::new();
        state.update(&config, &pointing(Vec2::new(0.1, -0.8)));
        assert_eq!(state.target.yaw, 0.0);
        assert!((state.target.pitch - -0.016).abs() < 1e-7);
    }

    #[test]
    fn test_smoothing_converges_without_overshoot() {
        let config = OrientationConfig::default();
        let mut state = OrientationState::new();
        state.target = Rotation::new(1.0, -0.5);
        state.current = Rotation::default();

        let mut prev = state.current.yaw;
        for _ in 0..200 {
            // Hold the pointer centered so targets stay fixed.
            let r = state.update(&config, &pointing(Vec2::ZERO));
            assert!(r.yaw >= prev && r.yaw <= 1.0);
            prev = r.yaw;
        }
        assert!((state.current.yaw - 1.0).abs() < 1e-6);
        assert!((state.current.pitch - -0.5).abs() < 1e-6);
    }

    #[test]
    fn test_first_step_is_one_smoothing_fraction() {
        let config = OrientationConfig::default();
        let mut state = OrientationState::new();
        let r = state.update(&config, &PointerSignal::Absent);
        assert!((r.yaw - 0.002 * 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_deflection_treated_as_absent() {
        let config = OrientationConfig::default();
        let mut state = OrientationState::new();
        state.update(&config, &pointing(Vec2::new(f32::NAN, 0.5)));
        assert!((state.target.yaw - config.idle_drift).abs() < 1e-9);
        assert_eq!(state.target.pitch, 0.0);
    }

    #[test]
    fn test_rotation_matrix_yaw() {
        let r = Rotation::new(std::f32::consts::FRAC_PI_2, 0.0);
        let v = r.matrix().transform_vector3(Vec3::X);
        // Yaw of +90° about Y takes +X to -Z.
        assert!((v - Vec3::NEG_Z).length() < 1e-5);
    }
}
