//! Particle storage.
//!
//! Particles are not objects: particle `i` is the `i`-th entry of four
//! parallel buffers. Positions and velocities are mutated every frame by the
//! [`ForceEngine`](crate::ForceEngine); rest positions and colors are written
//! once at spawn and never touched again.
//!
//! Each buffer is a `Vec<Vec3>`. `glam::Vec3` is `#[repr(C)]` and `Pod`, so
//! the same memory is exposed to renderers as interleaved `x, y, z` floats
//! without copying.

use crate::error::ConfigError;
use crate::spawn::SpawnContext;
use crate::Vec3;

/// Fixed-size structure-of-arrays particle store.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    rest_positions: Vec<Vec3>,
    colors: Vec<Vec3>,
}

impl ParticleStore {
    /// Allocate `count` particles, sampling rest positions and colors from `ctx`.
    ///
    /// Positions start at their rest positions, velocities at zero.
    pub fn spawn(count: usize, ctx: &mut SpawnContext) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::NoParticles);
        }

        let mut rest_positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            rest_positions.push(ctx.random_in_bounds());
            colors.push(ctx.palette_color());
        }

        log::debug!(
            "spawned {} particles in ±({}, {}, {})",
            count,
            ctx.bounds.x,
            ctx.bounds.y,
            ctx.bounds.z
        );

        Ok(Self::from_rest(rest_positions, colors))
    }

    /// Build a store from explicit rest positions and colors.
    ///
    /// # Panics
    ///
    /// Panics if the two buffers differ in length.
    pub fn from_rest(rest_positions: Vec<Vec3>, colors: Vec<Vec3>) -> Self {
        assert_eq!(
            rest_positions.len(),
            colors.len(),
            "rest position and color buffers must have the same length"
        );
        Self {
            positions: rest_positions.clone(),
            velocities: vec![Vec3::ZERO; rest_positions.len()],
            rest_positions,
            colors,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the store holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    #[inline]
    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest_positions
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Positions as interleaved `x, y, z` floats (length `3 × len`).
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colors as interleaved linear `r, g, b` floats (length `3 × len`).
    pub fn color_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Overwrite one particle's dynamic state.
    ///
    /// Used to set up specific scenarios; the rest position is unchanged.
    pub fn set_state(&mut self, index: usize, position: Vec3, velocity: Vec3) {
        self.positions[index] = position;
        self.velocities[index] = velocity;
    }

    /// Send every particle back to its rest position with zero velocity.
    pub fn reset(&mut self) {
        self.positions.copy_from_slice(&self.rest_positions);
        self.velocities.fill(Vec3::ZERO);
    }

    /// Split borrows for the integrator: mutable positions and velocities,
    /// shared rest positions.
    pub(crate) fn dynamics_mut(&mut self) -> (&mut [Vec3], &mut [Vec3], &[Vec3]) {
        (
            &mut self.positions,
            &mut self.velocities,
            &self.rest_positions,
        )
    }
}
