//! Per-frame force model and integrator.
//!
//! Every frame each particle independently feels:
//!
//! 1. a spring toward its rest position,
//! 2. if a pointer is present and the particle lies inside its (flattened)
//!    influence region, either a pull toward the pointer and the z = 0 plane
//!    (pinching) or a push away from it plus depth noise (open hand).
//!
//! The summed force is added straight to velocity (unit mass, unit step),
//! velocity is damped on every axis, and position advances by velocity. For a
//! fixed force `F` the damped velocity converges geometrically to
//! `F·d / (1 − d)`, which keeps the field bounded under any sustained input.
//!
//! Forces are evaluated in the field's local, unrotated frame. The
//! orientation controller's rotation is applied only at display time, so the
//! pointer interacts with where particles *would* be without rotation. This
//! offset is part of the look and must not be corrected here.
//!
//! # Scheduling
//!
//! Particles are processed in chunks of [`CHUNK_SIZE`]. Each chunk draws its
//! noise from its own generator, seeded from a per-frame seed and the chunk
//! index, so results do not depend on the order chunks run in. With the
//! `parallel` feature chunks run on the rayon pool and produce the same bits
//! as the serial loop.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::ForceConfig;
use crate::pointer::PointerSignal;
use crate::store::ParticleStore;
use crate::Vec3;

/// Particles per scheduling chunk.
pub const CHUNK_SIZE: usize = 4096;

const CHUNK_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// The pointer as seen by the force kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePointer {
    pub point: Vec2,
    pub pinching: bool,
}

impl ActivePointer {
    /// Extract the force-relevant part of a signal.
    ///
    /// Returns `None` for absent signals and for present signals carrying
    /// non-finite coordinates.
    pub fn from_signal(signal: &PointerSignal) -> Option<Self> {
        match *signal {
            PointerSignal::Present {
                point, pinching, ..
            } if point.is_finite() => Some(Self { point, pinching }),
            PointerSignal::Present { point, .. } => {
                log::warn!("ignoring non-finite pointer {}", point);
                None
            }
            PointerSignal::Absent => None,
        }
    }
}

/// Force & integration engine.
///
/// Owns the force constants and the noise generator; mutates a
/// [`ParticleStore`] in place each [`step`](ForceEngine::step).
#[derive(Debug, Clone)]
pub struct ForceEngine {
    config: ForceConfig,
    rng: SmallRng,
}

impl ForceEngine {
    /// Create an engine. `seed = None` seeds the noise from OS entropy.
    pub fn new(config: ForceConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { config, rng }
    }

    #[inline]
    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Advance every particle by one frame.
    ///
    /// No-op on an empty store. Does not allocate.
    pub fn step(&mut self, store: &mut ParticleStore, signal: &PointerSignal) {
        if store.is_empty() {
            return;
        }

        let pointer = ActivePointer::from_signal(signal);
        let frame_seed: u64 = self.rng.gen();
        let config = self.config;
        let (positions, velocities, rest) = store.dynamics_mut();

        log::trace!(
            "stepping {} particles, pointer {:?}",
            positions.len(),
            pointer
        );

        #[cfg(feature = "parallel")]
        step_parallel(&config, pointer, frame_seed, positions, velocities, rest);
        #[cfg(not(feature = "parallel"))]
        step_serial(&config, pointer, frame_seed, positions, velocities, rest);
    }
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn step_serial(
    config: &ForceConfig,
    pointer: Option<ActivePointer>,
    frame_seed: u64,
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    rest: &[Vec3],
) {
    positions
        .chunks_mut(CHUNK_SIZE)
        .zip(velocities.chunks_mut(CHUNK_SIZE))
        .zip(rest.chunks(CHUNK_SIZE))
        .enumerate()
        .for_each(|(chunk, ((pos, vel), rest))| {
            step_chunk(config, pointer, chunk_seed(frame_seed, chunk), pos, vel, rest);
        });
}

#[cfg(feature = "parallel")]
fn step_parallel(
    config: &ForceConfig,
    pointer: Option<ActivePointer>,
    frame_seed: u64,
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    rest: &[Vec3],
) {
    positions
        .par_chunks_mut(CHUNK_SIZE)
        .zip(velocities.par_chunks_mut(CHUNK_SIZE))
        .zip(rest.par_chunks(CHUNK_SIZE))
        .enumerate()
        .for_each(|(chunk, ((pos, vel), rest))| {
            step_chunk(config, pointer, chunk_seed(frame_seed, chunk), pos, vel, rest);
        });
}

#[inline]
fn chunk_seed(frame_seed: u64, chunk: usize) -> u64 {
    frame_seed ^ (chunk as u64).wrapping_add(1).wrapping_mul(CHUNK_SEED_MIX)
}

fn step_chunk(
    config: &ForceConfig,
    pointer: Option<ActivePointer>,
    seed: u64,
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    rest: &[Vec3],
) {
    let mut rng = SmallRng::seed_from_u64(seed);
    for ((pos, vel), rest) in positions.iter_mut().zip(velocities.iter_mut()).zip(rest) {
        let force = particle_force(config, *pos, *rest, pointer, &mut rng);
        integrate(pos, vel, force, config.damping);
    }
}

/// Total force on one particle this frame.
#[inline]
pub fn particle_force<R: Rng + ?Sized>(
    config: &ForceConfig,
    position: Vec3,
    rest: Vec3,
    pointer: Option<ActivePointer>,
    rng: &mut R,
) -> Vec3 {
    let mut force = (rest - position) * config.spring_constant;

    let Some(pointer) = pointer else {
        return force;
    };

    let d = position.truncate() - pointer.point;
    let dist_sq = d.length_squared() + position.z * position.z * config.flatten_factor;
    let radius_sq = config.influence_radius_sq;
    if dist_sq >= radius_sq {
        return force;
    }

    let strength = (radius_sq - dist_sq) / radius_sq;
    if pointer.pinching {
        // Implode toward the pointer axis and the z = 0 plane.
        let pull = strength * config.pull_gain;
        force -= (d * pull).extend(position.z * pull);
    } else {
        let push = d * strength * config.push_gain;
        let noise = (rng.gen::<f32>() - 0.5) * strength * config.noise_amplitude;
        force += push.extend(noise);
    }

    force
}

/// Semi-implicit Euler step with isotropic damping.
#[inline]
pub fn integrate(position: &mut Vec3, velocity: &mut Vec3, force: Vec3, damping: f32) {
    *velocity += force;
    *velocity *= damping;
    *position += *velocity;
}
