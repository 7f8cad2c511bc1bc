//! Math utilities and types
//!
//! Provides the small set of 2D math types the geometry pass works with.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// RGBA color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white, the multiplicative identity
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color from its four channels
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise product of two colors
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self::new(
            self.r * other.r,
            self.g * other.g,
            self.b * other.b,
            self.a * other.a,
        )
    }

    /// Copy of this color with RGB scaled by alpha
    #[must_use]
    pub fn premultiplied(&self) -> Self {
        Self::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Channels as an `[r, g, b, a]` array
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Math utility functions
pub mod utils {
    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Ease-out power curve mapping `t` in `[0, 1]` onto `[start, end]`
    pub fn pow_out(start: f32, end: f32, t: f32, power: i32) -> f32 {
        let sign = if power % 2 == 0 { -1.0 } else { 1.0 };
        let eased = (t - 1.0).powi(power) * sign + 1.0;
        start + (end - start) * eased
    }

    /// Twice the signed area of the triangle `(a, b, c)`; positive when
    /// the points wind counter-clockwise
    pub fn cross(ax: f32, ay: f32, bx: f32, by: f32, cx: f32, cy: f32) -> f32 {
        (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
    }
}
