//! Spawn helpers for particle initialization.
//!
//! [`SpawnContext`] owns the RNG used while filling the store so that rest
//! positions and colors come from one reproducible stream when a seed is set.

use crate::config::PaletteConfig;
use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Context used while spawning particles.
///
/// ```ignore
/// let mut ctx = SpawnContext::new(Vec3::new(50.0, 30.0, 25.0), palette, Some(7));
/// let rest = ctx.random_in_bounds();
/// let color = ctx.palette_color();
/// ```
pub struct SpawnContext {
    /// Half extents of the spawn box.
    pub bounds: Vec3,
    /// Hue band used by [`SpawnContext::palette_color`].
    pub palette: PaletteConfig,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context. `seed = None` seeds from OS entropy.
    pub fn new(bounds: Vec3, palette: PaletteConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            bounds,
            palette,
            rng,
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random point inside an axis-aligned box of the given half extents.
    ///
    /// Each axis is sampled independently and uniformly. Zero extents
    /// collapse that axis to 0 instead of panicking.
    pub fn random_in_box(&mut self, half_extents: Vec3) -> Vec3 {
        Vec3::new(
            (self.random() - 0.5) * 2.0 * half_extents.x,
            (self.random() - 0.5) * 2.0 * half_extents.y,
            (self.random() - 0.5) * 2.0 * half_extents.z,
        )
    }

    /// Random point within the spawn bounds.
    pub fn random_in_bounds(&mut self) -> Vec3 {
        self.random_in_box(self.bounds)
    }

    /// Random color from the palette's hue band.
    ///
    /// Hue is drawn independently per call; saturation and lightness are fixed.
    /// The HSL result is stored as-is: the renderer treats it as linear RGB.
    pub fn palette_color(&mut self) -> Vec3 {
        let p = self.palette;
        let hue = p.hue_min + self.random() * (p.hue_max - p.hue_min);
        hsl_to_rgb(hue, p.saturation, p.lightness)
    }
}

/// Convert HSL (all components 0-1, hue wrapping) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    if s <= 0.0 {
        return Vec3::splat(l);
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
