//! Boundary with the rendering collaborator.
//!
//! After each step the simulation hands a [`FrameView`] to a [`Renderer`]. The
//! view borrows the live buffers, so the borrow checker guarantees a renderer
//! cannot keep them past the draw call: the next step mutates the same memory
//! in place.
//!
//! The renderer owns projection, point size and blending. The only assumption
//! made here is that points are drawn independently and unordered with
//! additive blending, which affects overlap brightness and nothing else.

use glam::{Mat4, Vec3};

use crate::error::SimulationError;
use crate::orientation::Rotation;

/// Read-only view of one simulated frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Interleaved `x, y, z` positions in the field's local frame.
    pub positions: &'a [f32],
    /// Interleaved linear `r, g, b` colors, static for the simulation's lifetime.
    pub colors: &'a [f32],
    /// Rotation to apply to the whole field.
    pub rotation: Rotation,
    /// Number of steps taken before this frame.
    pub frame: u64,
}

impl<'a> FrameView<'a> {
    /// Number of particles in the frame.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Model matrix for the field.
    pub fn model_matrix(&self) -> Mat4 {
        self.rotation.matrix()
    }

    /// Iterate positions as vectors.
    pub fn points(&self) -> impl Iterator<Item = Vec3> + 'a {
        self.positions
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }
}

/// Consumer of simulated frames.
pub trait Renderer {
    /// Draw one frame. The view is only valid for the duration of the call.
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), SimulationError>;
}

impl<F> Renderer for F
where
    F: FnMut(&FrameView<'_>) -> Result<(), SimulationError>,
{
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), SimulationError> {
        self(frame)
    }
}

/// Summary of a frame, for logging and sanity checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub particle_count: usize,
    /// Mean position in the local frame.
    pub centroid: Vec3,
    /// Root mean square distance from the centroid.
    pub rms_radius: f32,
    /// Component-wise minimum and maximum.
    pub min: Vec3,
    pub max: Vec3,
    /// Whether every coordinate is finite.
    pub all_finite: bool,
}

impl FrameStats {
    pub fn from_view(view: &FrameView<'_>) -> Self {
        let count = view.particle_count();
        if count == 0 {
            return Self {
                particle_count: 0,
                centroid: Vec3::ZERO,
                rms_radius: 0.0,
                min: Vec3::ZERO,
                max: Vec3::ZERO,
                all_finite: true,
            };
        }

        let mut sum = glam::DVec3::ZERO;
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut all_finite = true;
        for p in view.points() {
            all_finite &= p.is_finite();
            sum += p.as_dvec3();
            min = min.min(p);
            max = max.max(p);
        }
        let centroid = (sum / count as f64).as_vec3();

        let mut sq = 0.0f64;
        for p in view.points() {
            sq += f64::from((p - centroid).length_squared());
        }
        let rms_radius = (sq / count as f64).sqrt() as f32;

        Self {
            particle_count: count,
            centroid,
            rms_radius,
            min,
            max,
            all_finite,
        }
    }
}
