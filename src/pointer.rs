//! Pointer signal acquisition.
//!
//! A hand tracker runs on its own schedule and produces [`LandmarkFrame`]s:
//! normalized image coordinates for the 21 landmarks of each detected hand.
//! The simulation only needs three things from it per frame: where the index
//! fingertip points in simulation space, whether the hand is pinching, and
//! whether there is a hand at all. [`PointerAdapter`] distills a
//! [`PointerSource`] into exactly that, as a [`PointerSignal`].
//!
//! # Non-blocking contract
//!
//! [`PointerSource::poll`] must return immediately. When no new detection is
//! ready the adapter hands back the previous frame's signal unchanged, so
//! detection latency never stalls the frame loop. A source that keeps failing
//! to deliver decays to [`PointerSignal::Absent`].
//!
//! # Example
//!
//! ```ignore
//! let (tx, rx) = std::sync::mpsc::channel();
//! std::thread::spawn(move || run_tracker(tx));
//!
//! let mut source = ChannelPointerSource::new(rx);
//! let mut adapter = PointerAdapter::new(PointerConfig::default());
//! loop {
//!     let signal = adapter.query(&mut source);
//!     sim.step(&signal);
//! }
//! ```

use std::sync::mpsc::{Receiver, TryRecvError};

use glam::{DVec2, Vec2};

use crate::config::PointerConfig;

/// Landmark index of the thumb tip.
pub const THUMB_TIP: usize = 4;
/// Landmark index of the index fingertip.
pub const INDEX_TIP: usize = 8;
/// Landmarks reported per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Normalized `[0, 1] × [0, 1]` image-space landmarks of one hand, in the
/// tracker's double precision.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub points: Vec<DVec2>,
}

impl HandLandmarks {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    /// A hand with only the fingertip and thumb tip populated; every other
    /// landmark sits at the fingertip.
    pub fn from_tips(index_tip: DVec2, thumb_tip: DVec2) -> Self {
        let mut points = vec![index_tip; LANDMARK_COUNT];
        points[THUMB_TIP] = thumb_tip;
        Self { points }
    }

    #[inline]
    pub fn index_tip(&self) -> Option<DVec2> {
        self.points.get(INDEX_TIP).copied()
    }

    #[inline]
    pub fn thumb_tip(&self) -> Option<DVec2> {
        self.points.get(THUMB_TIP).copied()
    }
}

/// One detection result from the hand tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Capture time of the video frame, in seconds. Frames carrying the same
    /// timestamp are treated as the same detection.
    pub timestamp: f64,
    /// Detected hands, most confident first. Empty when no hand is visible.
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    /// A frame in which no hand was detected.
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            hands: Vec::new(),
        }
    }

    /// A frame with a single hand.
    pub fn single(timestamp: f64, hand: HandLandmarks) -> Self {
        Self {
            timestamp,
            hands: vec![hand],
        }
    }
}

/// Result of polling a [`PointerSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// No new detection since the last poll.
    Pending,
    /// The newest available detection.
    Ready(LandmarkFrame),
    /// The source has failed or shut down.
    Failed,
}

/// A non-blocking provider of hand landmark detections.
pub trait PointerSource {
    /// Return the newest detection, or [`Detection::Pending`] if none is ready.
    ///
    /// Must not block.
    fn poll(&mut self) -> Detection;
}

/// The per-frame pointer input consumed by the force engine and the
/// orientation controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerSignal {
    /// No usable hand this frame. Disables the pointer force term.
    #[default]
    Absent,
    /// A hand is present.
    Present {
        /// Fingertip position in simulation space.
        point: Vec2,
        /// Fingertip deflection from the image center, `(tip - 0.5) × 2`,
        /// in `[-1, 1]` per axis and not mirrored.
        deflection: Vec2,
        /// Whether fingertip and thumb tip are pinched together.
        pinching: bool,
    },
}

impl PointerSignal {
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, PointerSignal::Present { .. })
    }

    /// Downgrade to `Absent` if any component is NaN or infinite.
    pub fn sanitized(self) -> Self {
        match self {
            PointerSignal::Present {
                point, deflection, ..
            } if !point.is_finite() || !deflection.is_finite() => PointerSignal::Absent,
            other => other,
        }
    }
}

/// Maps landmark frames to [`PointerSignal`]s and caches the last result.
///
/// This is the explicit per-frame state of pointer acquisition: the last
/// processed timestamp, the cached signal and how long the source has been
/// silent. It is passed by `&mut` into each frame rather than living in a
/// global.
#[derive(Debug, Clone)]
pub struct PointerAdapter {
    config: PointerConfig,
    last_timestamp: Option<f64>,
    last_signal: PointerSignal,
    stale_polls: u32,
}

impl PointerAdapter {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config,
            last_timestamp: None,
            last_signal: PointerSignal::Absent,
            stale_polls: 0,
        }
    }

    /// The most recently produced signal.
    #[inline]
    pub fn last_signal(&self) -> PointerSignal {
        self.last_signal
    }

    /// Poll `source` once and return this frame's signal.
    pub fn query<S: PointerSource + ?Sized>(&mut self, source: &mut S) -> PointerSignal {
        match source.poll() {
            Detection::Ready(frame) if self.last_timestamp != Some(frame.timestamp) => {
                self.last_timestamp = Some(frame.timestamp);
                self.stale_polls = 0;
                let signal = self.map_frame(&frame);
                self.remember(signal)
            }
            Detection::Ready(_) | Detection::Pending => {
                self.stale_polls = self.stale_polls.saturating_add(1);
                match self.config.stale_after_frames {
                    Some(limit) if self.stale_polls > limit && self.last_signal.is_present() => {
                        log::debug!("pointer source silent for {} polls, dropping hand", self.stale_polls);
                        self.remember(PointerSignal::Absent)
                    }
                    _ => self.last_signal,
                }
            }
            Detection::Failed => self.remember(PointerSignal::Absent),
        }
    }

    /// Map a single detection to a signal without touching the cache.
    ///
    /// Only the first hand is used. Missing, non-finite or out-of-frame
    /// landmarks yield `Absent`.
    pub fn map_frame(&self, frame: &LandmarkFrame) -> PointerSignal {
        let Some(hand) = frame.hands.first() else {
            return PointerSignal::Absent;
        };
        let (Some(tip), Some(thumb)) = (hand.index_tip(), hand.thumb_tip()) else {
            log::warn!(
                "hand with {} landmarks has no fingertip/thumb, ignoring",
                hand.points.len()
            );
            return PointerSignal::Absent;
        };
        if !in_frame(tip) || !in_frame(thumb) {
            log::warn!("rejecting malformed landmarks tip={} thumb={}", tip, thumb);
            return PointerSignal::Absent;
        }

        // Centered in f64 so symmetric fingertips land symmetrically around
        // the dead zone once narrowed.
        let centered = tip - DVec2::splat(0.5);
        let scale = self.config.scale.as_dvec2();
        let x_sign = if self.config.mirror_x { -1.0 } else { 1.0 };
        let point = DVec2::new(centered.x * x_sign * scale.x, centered.y * -scale.y);
        let pinching = tip.distance(thumb) < f64::from(self.config.pinch_threshold);

        PointerSignal::Present {
            point: point.as_vec2(),
            deflection: (centered * 2.0).as_vec2(),
            pinching,
        }
        .sanitized()
    }

    fn remember(&mut self, signal: PointerSignal) -> PointerSignal {
        if signal.is_present() != self.last_signal.is_present() {
            log::debug!("pointer {}", if signal.is_present() { "acquired" } else { "lost" });
        }
        self.last_signal = signal;
        signal
    }
}

fn in_frame(p: DVec2) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)
}

/// A [`PointerSource`] fed by a tracker thread over an `mpsc` channel.
///
/// Each poll drains the channel and keeps only the newest frame.
pub struct ChannelPointerSource {
    receiver: Receiver<LandmarkFrame>,
    disconnected: bool,
}

impl ChannelPointerSource {
    pub fn new(receiver: Receiver<LandmarkFrame>) -> Self {
        Self {
            receiver,
            disconnected: false,
        }
    }
}

impl PointerSource for ChannelPointerSource {
    fn poll(&mut self) -> Detection {
        if self.disconnected {
            return Detection::Failed;
        }

        let mut newest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(frame) => newest = Some(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if newest.is_none() {
                        log::warn!("pointer source disconnected");
                        self.disconnected = true;
                        return Detection::Failed;
                    }
                    break;
                }
            }
        }

        match newest {
            Some(frame) => Detection::Ready(frame),
            None => Detection::Pending,
        }
    }
}
