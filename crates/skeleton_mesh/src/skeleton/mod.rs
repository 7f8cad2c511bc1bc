//! Skeleton pose snapshot
//!
//! These types describe a pose that has already been computed upstream:
//! bones carry their final world transforms and slots carry their final
//! tint and attachment. The geometry pass only reads them.

pub mod attachment;

pub use attachment::{
    Attachment, BoneInfluence, ClippingAttachment, MeshAttachment, RegionAttachment,
    TextureHandle, VertexData, WeightedVertex,
};

use crate::foundation::math::{Color, Vec2};
use std::sync::Arc;

/// World transform of a bone
///
/// `a b / c d` is the 2x2 linear part, `world_x/world_y` the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Row 0, column 0
    pub a: f32,
    /// Row 0, column 1
    pub b: f32,
    /// Row 1, column 0
    pub c: f32,
    /// Row 1, column 1
    pub d: f32,
    /// World translation X
    pub world_x: f32,
    /// World translation Y
    pub world_y: f32,
}

impl Default for Bone {
    fn default() -> Self {
        Self::identity()
    }
}

impl Bone {
    /// Identity transform at the origin
    pub const fn identity() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, world_x: 0.0, world_y: 0.0 }
    }

    /// Pure translation
    pub const fn at(world_x: f32, world_y: f32) -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, world_x, world_y }
    }

    /// Translation, rotation (degrees) and non-uniform scale
    pub fn from_components(world_x: f32, world_y: f32, rotation: f32, scale_x: f32, scale_y: f32) -> Self {
        let (sin, cos) = rotation.to_radians().sin_cos();
        Self {
            a: cos * scale_x,
            b: -sin * scale_y,
            c: sin * scale_x,
            d: cos * scale_y,
            world_x,
            world_y,
        }
    }

    /// Transform a point from bone space to world space
    pub fn local_to_world(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            x * self.a + y * self.b + self.world_x,
            x * self.c + y * self.d + self.world_y,
        )
    }
}

/// One draw-order entry of the skeleton
#[derive(Debug, Clone)]
pub struct Slot {
    /// Index of this slot in the skeleton's slot list; clipping end markers refer to it
    pub index: usize,
    /// Slot name, used in log output
    pub name: String,
    /// Index of the bone this slot follows
    pub bone: usize,
    /// Slot tint
    pub color: Color,
    /// Optional dark tint for two-color tinting
    pub dark_color: Option<Color>,
    /// Current attachment
    pub attachment: Option<Arc<Attachment>>,
    /// Deformed local vertices overriding the attachment's own, if non-empty
    pub deform: Vec<f32>,
}

impl Slot {
    /// Create an empty white slot following `bone`
    pub fn new(index: usize, name: impl Into<String>, bone: usize) -> Self {
        Self {
            index,
            name: name.into(),
            bone,
            color: Color::WHITE,
            dark_color: None,
            attachment: None,
            deform: Vec::new(),
        }
    }

    /// Set the attachment (builder style)
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(Arc::new(attachment));
        self
    }

    /// Set the slot tint (builder style)
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// The attachment, if any
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_deref()
    }
}

/// Frozen pose of a skeleton for one frame
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    /// Bones with world transforms already computed
    pub bones: Vec<Bone>,
    /// Slots in setup order
    pub slots: Vec<Slot>,
    /// Slot indices in draw order
    pub draw_order: Vec<usize>,
    /// Skeleton-wide tint
    pub color: Color,
    /// Skeleton origin X
    pub x: f32,
    /// Skeleton origin Y
    pub y: f32,
}

impl Skeleton {
    /// Create a skeleton whose draw order is the slot order
    pub fn new(bones: Vec<Bone>, slots: Vec<Slot>) -> Self {
        let draw_order = (0..slots.len()).collect();
        Self {
            bones,
            slots,
            draw_order,
            color: Color::WHITE,
            x: 0.0,
            y: 0.0,
        }
    }

    /// Slots in draw order; entries pointing outside the slot list are ignored
    pub fn draw_order_slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.draw_order.iter().filter_map(|&index| self.slots.get(index))
    }

    /// Bone a slot follows
    pub fn slot_bone(&self, slot: &Slot) -> Option<&Bone> {
        self.bones.get(slot.bone)
    }
}
