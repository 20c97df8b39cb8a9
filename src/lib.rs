//! # handswarm
//!
//! A million-point cloud that holds its shape on springs and scatters,
//! implodes or spins when a tracked hand points at it.
//!
//! The crate is the numeric core: particle storage, the per-frame force model,
//! the rotation filter and the adapters around them. Camera capture, landmark
//! inference and drawing are external collaborators reached through the
//! [`PointerSource`] and [`Renderer`] traits.
//!
//! ## Quick Start
//!
//! ```ignore
//! use handswarm::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let mut sim = Simulation::builder()
//!         .with_particle_count(200_000)
//!         .with_seed(7)
//!         .build()?;
//!
//!     let mut hand = ScriptedPointer::new(Gesture::Cycle);
//!     let mut renderer = MyPointRenderer::new();
//!     sim.run(&mut hand, &mut renderer, Some(600))
//! }
//! ```
//!
//! ## Frame pipeline
//!
//! Each frame runs, in order:
//!
//! 1. [`PointerAdapter::query`] polls the source without blocking and maps
//!    the first hand to a [`PointerSignal`]: simulation-space fingertip,
//!    deflection from image center, pinch flag.
//! 2. [`ForceEngine::step`] applies spring, pointer force and damping to every
//!    particle in place.
//! 3. [`OrientationState::update`] steers and smooths the field rotation.
//! 4. A [`FrameView`] borrowing the live buffers goes to the [`Renderer`].
//!
//! ## Pointer modes
//!
//! | Hand | Effect inside the influence cylinder |
//! |------|--------------------------------------|
//! | absent | none; the field drifts around Y |
//! | open | push away from the fingertip plus depth noise |
//! | pinching | pull toward the fingertip and the z = 0 plane |
//!
//! Forces are computed in the field's unrotated frame; rotation is purely a
//! display transform.

pub mod config;
pub mod engine;
pub mod error;
pub mod orientation;
pub mod pointer;
pub mod presentation;
pub mod script;
mod simulation;
pub mod spawn;
pub mod store;
pub mod time;

pub use config::{ForceConfig, OrientationConfig, PaletteConfig, PointerConfig, SimConfig};
pub use engine::{ActivePointer, ForceEngine};
pub use error::{ConfigError, SimulationError};
pub use glam::{DVec2, Vec2, Vec3};
pub use orientation::{OrientationState, Rotation};
pub use pointer::{
    ChannelPointerSource, Detection, HandLandmarks, LandmarkFrame, PointerAdapter, PointerSignal,
    PointerSource,
};
pub use presentation::{FrameStats, FrameView, Renderer};
pub use script::{Gesture, ScriptedPointer};
pub use simulation::{advance_frame, Simulation, SimulationBuilder};
pub use store::ParticleStore;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use handswarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::error::{ConfigError, SimulationError};
    pub use crate::orientation::Rotation;
    pub use crate::pointer::{Detection, HandLandmarks, LandmarkFrame, PointerSignal, PointerSource};
    pub use crate::presentation::{FrameView, Renderer};
    pub use crate::script::{Gesture, ScriptedPointer};
    pub use crate::simulation::Simulation;
    pub use crate::{DVec2, Vec2, Vec3};
}
