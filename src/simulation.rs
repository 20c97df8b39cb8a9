//! Simulation builder and frame loop.

use std::time::Duration;

use glam::Vec3;

use crate::config::{ForceConfig, OrientationConfig, PaletteConfig, PointerConfig, SimConfig};
use crate::engine::ForceEngine;
use crate::error::{ConfigError, SimulationError};
use crate::orientation::{OrientationState, Rotation};
use crate::pointer::{PointerAdapter, PointerSignal, PointerSource};
use crate::presentation::{FrameStats, FrameView, Renderer};
use crate::spawn::SpawnContext;
use crate::store::ParticleStore;
use crate::time::FrameClock;

/// Wall-clock budget of one frame at 60 Hz.
const FRAME_BUDGET: Duration = Duration::from_micros(16_667);

/// Advance one frame: integrate the particles, then update the rotation.
///
/// All per-frame state is passed in explicitly. [`Simulation`] wraps exactly
/// this call for the common case.
pub fn advance_frame(
    engine: &mut ForceEngine,
    store: &mut ParticleStore,
    orientation: &mut OrientationState,
    orientation_config: &OrientationConfig,
    signal: &PointerSignal,
) -> Rotation {
    engine.step(store, signal);
    orientation.update(orientation_config, signal)
}

/// A hand-driven particle field.
///
/// Use method chaining on [`Simulation::builder`] to configure, then drive it
/// one frame at a time with [`step`](Simulation::step) /
/// [`advance`](Simulation::advance), or hand it a source and a renderer with
/// [`run`](Simulation::run).
///
/// ```ignore
/// let mut sim = Simulation::builder()
///     .with_particle_count(200_000)
///     .with_seed(7)
///     .build()?;
///
/// let mut source = ScriptedPointer::new(Gesture::Orbit);
/// let frame = sim.advance(&mut source);
/// renderer.draw(&frame)?;
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    store: ParticleStore,
    engine: ForceEngine,
    orientation: OrientationState,
    pointer: PointerAdapter,
    rotation: Rotation,
    frame: u64,
}

impl Simulation {
    /// Start configuring a simulation from the default configuration.
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Build a simulation from a complete configuration.
    ///
    /// Fails fast if the configuration is invalid; no particle buffers are
    /// allocated in that case.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        // Spawn and noise streams are derived from one seed but never share state.
        let (spawn_seed, noise_seed) = match config.seed {
            Some(seed) => (Some(seed), Some(seed.rotate_left(32) ^ 0xA5A5_A5A5_A5A5_A5A5)),
            None => (None, None),
        };

        let mut ctx = SpawnContext::new(config.bounds, config.palette, spawn_seed);
        let store = ParticleStore::spawn(config.particle_count, &mut ctx)?;
        let engine = ForceEngine::new(config.forces, noise_seed);
        let pointer = PointerAdapter::new(config.pointer);

        log::debug!(
            "simulation ready: {} particles, seed {:?}",
            config.particle_count,
            config.seed
        );

        Ok(Self {
            config,
            store,
            engine,
            orientation: OrientationState::new(),
            pointer,
            rotation: Rotation::default(),
            frame: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Mutable access to the particle store, for setting up scenarios.
    #[inline]
    pub fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    #[inline]
    pub fn orientation(&self) -> &OrientationState {
        &self.orientation
    }

    /// Signal used by the most recent [`advance`](Simulation::advance).
    #[inline]
    pub fn pointer_signal(&self) -> PointerSignal {
        self.pointer.last_signal()
    }

    /// Steps taken so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance one frame with an already-derived pointer signal.
    pub fn step(&mut self, signal: &PointerSignal) -> Rotation {
        self.rotation = advance_frame(
            &mut self.engine,
            &mut self.store,
            &mut self.orientation,
            &self.config.orientation,
            signal,
        );
        self.frame += 1;
        self.rotation
    }

    /// Poll `source` and advance one frame. Never blocks on the source.
    pub fn advance<S: PointerSource + ?Sized>(&mut self, source: &mut S) -> FrameView<'_> {
        let signal = self.pointer.query(source);
        self.step(&signal);
        self.frame_view()
    }

    /// The current frame, as handed to renderers.
    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            positions: self.store.position_buffer(),
            colors: self.store.color_buffer(),
            rotation: self.rotation,
            frame: self.frame,
        }
    }

    /// Current frame statistics.
    pub fn stats(&self) -> FrameStats {
        FrameStats::from_view(&self.frame_view())
    }

    /// Send every particle home and zero the rotation.
    pub fn reset(&mut self) {
        self.store.reset();
        self.orientation = OrientationState::new();
        self.rotation = Rotation::default();
        log::debug!("simulation reset at frame {}", self.frame);
    }

    /// Drive the simulation: poll, step and draw, `frames` times or until the
    /// renderer fails when `frames` is `None`.
    pub fn run<S, R>(
        &mut self,
        source: &mut S,
        renderer: &mut R,
        frames: Option<u64>,
    ) -> Result<(), SimulationError>
    where
        S: PointerSource + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut clock = FrameClock::new();
        let mut remaining = frames;

        while remaining != Some(0) {
            let view = self.advance(source);
            renderer.draw(&view)?;

            let refreshed = clock.tick();
            if clock.over_budget(FRAME_BUDGET) {
                log::debug!("frame {} over budget: {:?}", self.frame, clock.delta());
            }
            if let Some(fps) = refreshed {
                log::info!(
                    "frame {}: {:.1} fps, pointer {}",
                    self.frame,
                    fps,
                    if self.pointer_signal().is_present() { "present" } else { "absent" }
                );
            }
            if let Some(n) = remaining.as_mut() {
                *n -= 1;
            }
        }

        log::debug!(
            "run finished after {} frames in {:?} ({:.1} fps)",
            clock.frame(),
            clock.elapsed(),
            clock.fps()
        );
        Ok(())
    }
}

/// Builder for [`Simulation`].
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimConfig,
}

impl SimulationBuilder {
    /// Start from [`SimConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: SimConfig) -> Self {
        Self { config }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.config.particle_count = count;
        self
    }

    /// Set the half extents of the spawn box.
    pub fn with_bounds(mut self, bounds: Vec3) -> Self {
        self.config.bounds = bounds;
        self
    }

    /// Seed spawning and noise for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_forces(mut self, forces: ForceConfig) -> Self {
        self.config.forces = forces;
        self
    }

    pub fn with_orientation(mut self, orientation: OrientationConfig) -> Self {
        self.config.orientation = orientation;
        self
    }

    pub fn with_palette(mut self, palette: PaletteConfig) -> Self {
        self.config.palette = palette;
        self
    }

    pub fn with_pointer(mut self, pointer: PointerConfig) -> Self {
        self.config.pointer = pointer;
        self
    }

    /// Validate the configuration and allocate the particle store.
    pub fn build(self) -> Result<Simulation, ConfigError> {
        Simulation::new(self.config)
    }
}
