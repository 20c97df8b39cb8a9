//! Synthetic hand for demos, tests and benches.
//!
//! [`ScriptedPointer`] is a [`PointerSource`] that plays back a fixed gesture
//! with deterministic landmarks. It can also deliver detections at a lower
//! rate than it is polled, the way a real tracker lags the display.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::DVec2;

use crate::pointer::{Detection, HandLandmarks, LandmarkFrame, PointerSource};

/// Gesture played by a [`ScriptedPointer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// No hand, ever.
    Idle,
    /// Open hand circling the image center.
    Orbit,
    /// Pinched hand circling the image center.
    Pinch,
    /// Idle, then orbit, then pinch, repeating.
    Cycle,
}

impl Gesture {
    pub const ALL: [Gesture; 4] = [Gesture::Idle, Gesture::Orbit, Gesture::Pinch, Gesture::Cycle];

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Orbit => "orbit",
            Gesture::Pinch => "pinch",
            Gesture::Cycle => "cycle",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown gesture `{}` (expected idle, orbit, pinch or cycle)", s))
    }
}

/// Frames spent in each phase of [`Gesture::Cycle`].
const CYCLE_PHASE_FRAMES: u64 = 180;

/// Deterministic [`PointerSource`].
#[derive(Debug, Clone)]
pub struct ScriptedPointer {
    gesture: Gesture,
    polls: u64,
    frame_rate: f64,
    radius: f64,
    period_frames: f64,
    detect_every: u64,
}

impl ScriptedPointer {
    /// A pointer playing `gesture`, detected on every poll at 60 frames/s.
    pub fn new(gesture: Gesture) -> Self {
        Self {
            gesture,
            polls: 0,
            frame_rate: 60.0,
            radius: 0.3,
            period_frames: 600.0,
            detect_every: 1,
        }
    }

    /// Deliver a detection only every `n`-th poll, `Pending` otherwise.
    pub fn with_detect_every(mut self, n: u64) -> Self {
        self.detect_every = n.max(1);
        self
    }

    /// Radius of the fingertip's circle, in normalized image units.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius.clamp(0.0, 0.4);
        self
    }

    /// Frames per revolution of the fingertip.
    pub fn with_period(mut self, frames: f64) -> Self {
        self.period_frames = frames.max(1.0);
        self
    }

    /// The gesture phase active at `frame`: `None` for no hand, otherwise
    /// whether the hand is pinching.
    fn phase(&self, frame: u64) -> Option<bool> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Orbit => Some(false),
            Gesture::Pinch => Some(true),
            Gesture::Cycle => match (frame / CYCLE_PHASE_FRAMES) % 3 {
                0 => None,
                1 => Some(false),
                _ => Some(true),
            },
        }
    }

    /// Landmarks at `frame`.
    pub fn landmarks_at(&self, frame: u64) -> LandmarkFrame {
        let timestamp = frame as f64 / self.frame_rate;
        let Some(pinching) = self.phase(frame) else {
            return LandmarkFrame::empty(timestamp);
        };

        let angle = TAU * (frame as f64 / self.period_frames);
        let tip = DVec2::splat(0.5) + DVec2::new(angle.cos(), angle.sin()) * self.radius;
        let thumb_offset = if pinching {
            DVec2::new(0.02, 0.01)
        } else {
            DVec2::new(0.08, 0.06)
        };
        LandmarkFrame::single(timestamp, HandLandmarks::from_tips(tip, tip + thumb_offset))
    }
}

impl PointerSource for ScriptedPointer {
    fn poll(&mut self) -> Detection {
        let frame = self.polls;
        self.polls += 1;
        if frame % self.detect_every != 0 {
            return Detection::Pending;
        }
        Detection::Ready(self.landmarks_at(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PointerConfig;
    use crate::pointer::{PointerAdapter, PointerSignal};

    #[test]
    fn test_gesture_from_str() {
        assert_eq!("orbit".parse::<Gesture>(), Ok(Gesture::Orbit));
        assert_eq!("PINCH".parse::<Gesture>(), Ok(Gesture::Pinch));
        assert!("wave".parse::<Gesture>().is_err());
        for g in Gesture::ALL {
            assert_eq!(g.to_string().parse::<Gesture>(), Ok(g));
        }
    }

    #[test]
    fn test_idle_has_no_hand() {
        let mut source = ScriptedPointer::new(Gesture::Idle);
        let mut adapter = PointerAdapter::new(PointerConfig::default());
        for _ in 0..10 {
            assert_eq!(adapter.query(&mut source), PointerSignal::Absent);
        }
    }

    #[test]
    fn test_pinch_and_orbit_map_to_expected_mode() {
        let adapter = PointerAdapter::new(PointerConfig::default());
        let pinch = ScriptedPointer::new(Gesture::Pinch);
        let orbit = ScriptedPointer::new(Gesture::Orbit);
        for frame in [0, 37, 150, 599] {
            assert!(matches!(
                adapter.map_frame(&pinch.landmarks_at(frame)),
                PointerSignal::Present { pinching: true, .. }
            ));
            assert!(matches!(
                adapter.map_frame(&orbit.landmarks_at(frame)),
                PointerSignal::Present { pinching: false, .. }
            ));
        }
    }

    #[test]
    fn test_cycle_phases() {
        let source = ScriptedPointer::new(Gesture::Cycle);
        assert!(source.landmarks_at(0).hands.is_empty());
        assert!(!source.landmarks_at(CYCLE_PHASE_FRAMES).hands.is_empty());
        assert_eq!(source.phase(CYCLE_PHASE_FRAMES * 2), Some(true));
        assert_eq!(source.phase(CYCLE_PHASE_FRAMES * 3), None);
    }

    #[test]
    fn test_radius_and_period_shape_the_orbit() {
        let source = ScriptedPointer::new(Gesture::Orbit)
            .with_radius(0.1)
            .with_period(4.0);
        // A quarter turn per frame.
        let tip = source.landmarks_at(1).hands[0].index_tip().unwrap();
        assert!((tip - DVec2::new(0.5, 0.6)).length() < 1e-12);
        let tip = source.landmarks_at(2).hands[0].index_tip().unwrap();
        assert!((tip - DVec2::new(0.4, 0.5)).length() < 1e-12);

        // Radius is clamped so the fingertip never leaves the frame.
        let wide = ScriptedPointer::new(Gesture::Orbit).with_radius(2.0);
        let tip = wide.landmarks_at(0).hands[0].index_tip().unwrap();
        assert!((tip.x - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_detect_every_interleaves_pending() {
        let mut source = ScriptedPointer::new(Gesture::Orbit).with_detect_every(3);
        let results: Vec<bool> = (0..6)
            .map(|_| matches!(source.poll(), Detection::Ready(_)))
            .collect();
        assert_eq!(results, vec![true, false, false, true, false, false]);
    }
}
