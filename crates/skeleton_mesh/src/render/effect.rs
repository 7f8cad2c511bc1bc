//! Per-vertex effects
//!
//! An effect runs once for every vertex that reaches a batch, after world
//! positions, tint and UVs are known (and after clipping). It may move the
//! vertex, shift its UV or change its colors. Any
//! `FnMut(&mut Vec2, &mut Vec2, &mut Color, &mut Color)` closure is an effect.

use super::vertex::{COLOR_OFFSET, SOURCE_VERTEX_SIZE, UV_OFFSET};
use crate::foundation::math::{utils, Color, Vec2};
use crate::skeleton::Skeleton;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-vertex transform applied during the geometry pass
pub trait VertexEffect {
    /// Called once before the first vertex of a pass
    fn begin(&mut self, _skeleton: &Skeleton) {}

    /// Transform one vertex; `dark` starts as the slot's dark color or transparent black
    fn transform(&mut self, position: &mut Vec2, uv: &mut Vec2, light: &mut Color, dark: &mut Color);

    /// Called once after the last vertex of a pass
    fn end(&mut self) {}
}

impl<F> VertexEffect for F
where
    F: FnMut(&mut Vec2, &mut Vec2, &mut Color, &mut Color),
{
    fn transform(&mut self, position: &mut Vec2, uv: &mut Vec2, light: &mut Color, dark: &mut Color) {
        self(position, uv, light, dark);
    }
}

/// Run `effect` over vertices in the working layout
pub fn apply_effect(effect: &mut dyn VertexEffect, vertices: &mut [f32], dark: Color) {
    for vertex in vertices.chunks_exact_mut(SOURCE_VERTEX_SIZE) {
        let mut position = Vec2::new(vertex[0], vertex[1]);
        let mut uv = Vec2::new(vertex[UV_OFFSET], vertex[UV_OFFSET + 1]);
        let c = &vertex[COLOR_OFFSET..COLOR_OFFSET + 4];
        let mut light = Color::new(c[0], c[1], c[2], c[3]);
        let mut dark = dark;

        effect.transform(&mut position, &mut uv, &mut light, &mut dark);

        vertex[0] = position.x;
        vertex[1] = position.y;
        vertex[COLOR_OFFSET..COLOR_OFFSET + 4].copy_from_slice(&light.to_array());
        vertex[UV_OFFSET] = uv.x;
        vertex[UV_OFFSET + 1] = uv.y;
    }
}

/// Twists vertices around a point, strongest at the center
#[derive(Debug, Clone)]
pub struct SwirlEffect {
    /// Center X relative to the skeleton origin
    pub center_x: f32,
    /// Center Y relative to the skeleton origin
    pub center_y: f32,
    /// Radius of influence
    pub radius: f32,
    /// Rotation at the center, in degrees
    pub angle: f32,
    /// Power of the ease-out falloff
    pub power: i32,
    world_x: f32,
    world_y: f32,
}

impl SwirlEffect {
    /// Create a swirl of `radius` around the skeleton origin
    pub const fn new(radius: f32) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            radius,
            angle: 0.0,
            power: 2,
            world_x: 0.0,
            world_y: 0.0,
        }
    }
}

impl VertexEffect for SwirlEffect {
    fn begin(&mut self, skeleton: &Skeleton) {
        self.world_x = skeleton.x + self.center_x;
        self.world_y = skeleton.y + self.center_y;
    }

    fn transform(&mut self, position: &mut Vec2, _uv: &mut Vec2, _light: &mut Color, _dark: &mut Color) {
        let x = position.x - self.world_x;
        let y = position.y - self.world_y;
        let dist = x.hypot(y);
        if dist < self.radius {
            let theta = utils::pow_out(0.0, self.angle.to_radians(), (self.radius - dist) / self.radius, self.power);
            let (sin, cos) = theta.sin_cos();
            position.x = cos * x - sin * y + self.world_x;
            position.y = sin * x + cos * y + self.world_y;
        }
    }
}

/// Randomly offsets vertex positions
#[derive(Debug, Clone)]
pub struct JitterEffect {
    /// Maximum horizontal offset
    pub jitter_x: f32,
    /// Maximum vertical offset
    pub jitter_y: f32,
    rng: StdRng,
}

impl JitterEffect {
    /// Create a jitter with an entropy-seeded generator
    pub fn new(jitter_x: f32, jitter_y: f32) -> Self {
        Self { jitter_x, jitter_y, rng: StdRng::from_entropy() }
    }

    /// Create a jitter with a fixed seed, for reproducible output
    pub fn with_seed(jitter_x: f32, jitter_y: f32, seed: u64) -> Self {
        Self { jitter_x, jitter_y, rng: StdRng::seed_from_u64(seed) }
    }

    /// Triangular distribution on `[-extent, extent]`, peaking at zero
    fn triangular(&mut self, extent: f32) -> f32 {
        if extent <= 0.0 {
            return 0.0;
        }
        let u: f32 = self.rng.gen();
        let d = 2.0 * extent;
        if u <= 0.5 {
            -extent + (u * d * extent).sqrt()
        } else {
            extent - ((1.0 - u) * d * extent).sqrt()
        }
    }
}

impl VertexEffect for JitterEffect {
    fn transform(&mut self, position: &mut Vec2, _uv: &mut Vec2, _light: &mut Color, _dark: &mut Color) {
        position.x += self.triangular(self.jitter_x);
        position.y += self.triangular(self.jitter_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closure_effect_rewrites_layout() {
        let mut vertices = vec![1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 0.25, 0.75];
        let mut effect = |position: &mut Vec2, uv: &mut Vec2, light: &mut Color, dark: &mut Color| {
            assert_eq!(*dark, Color::TRANSPARENT);
            position.x += 10.0;
            uv.y = 0.0;
            light.a = 0.5;
        };
        apply_effect(&mut effect, &mut vertices, Color::TRANSPARENT);
        assert_eq!(vertices, vec![11.0, 2.0, 1.0, 1.0, 1.0, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_swirl_leaves_far_vertices_alone() {
        let mut swirl = SwirlEffect::new(10.0);
        swirl.angle = 90.0;
        swirl.begin(&Skeleton::default());

        let (mut uv, mut light, mut dark) = (Vec2::zeros(), Color::WHITE, Color::TRANSPARENT);
        let mut far = Vec2::new(20.0, 0.0);
        swirl.transform(&mut far, &mut uv, &mut light, &mut dark);
        assert_eq!(far, Vec2::new(20.0, 0.0));

        let mut near = Vec2::new(5.0, 0.0);
        swirl.transform(&mut near, &mut uv, &mut light, &mut dark);
        // Rotation preserves distance from the center
        assert_relative_eq!(near.norm(), 5.0, epsilon = 1e-5);
        assert!(near.y > 0.0);
    }

    #[test]
    fn test_swirl_follows_skeleton_origin() {
        let mut swirl = SwirlEffect::new(1.0);
        swirl.angle = 180.0;
        let skeleton = Skeleton { x: 100.0, ..Skeleton::default() };
        swirl.begin(&skeleton);

        let (mut uv, mut light, mut dark) = (Vec2::zeros(), Color::WHITE, Color::TRANSPARENT);
        let mut at_origin = Vec2::new(0.5, 0.0);
        swirl.transform(&mut at_origin, &mut uv, &mut light, &mut dark);
        assert_eq!(at_origin, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_jitter_stays_in_bounds_and_is_seeded() {
        let mut a = JitterEffect::with_seed(2.0, 1.0, 42);
        let mut b = JitterEffect::with_seed(2.0, 1.0, 42);
        let (mut uv, mut light, mut dark) = (Vec2::zeros(), Color::WHITE, Color::TRANSPARENT);
        for _ in 0..100 {
            let mut pa = Vec2::zeros();
            let mut pb = Vec2::zeros();
            a.transform(&mut pa, &mut uv, &mut light, &mut dark);
            b.transform(&mut pb, &mut uv, &mut light, &mut dark);
            assert_eq!(pa, pb);
            assert!(pa.x.abs() <= 2.0 && pa.y.abs() <= 1.0);
        }
    }
}
