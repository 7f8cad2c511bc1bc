//! Frame pass scenarios for the skeleton mesh
//!
//! Each scenario builds a small posed skeleton by hand and checks the
//! batches one geometry pass produces.

mod clipping;

use crate::config::MeshConfig;
use crate::foundation::math::Color;
use crate::render::SkeletonMesh;
use crate::skeleton::{
    Attachment, Bone, ClippingAttachment, RegionAttachment, Skeleton, Slot, TextureHandle, VertexData,
};

pub const TEXTURE_A: TextureHandle = TextureHandle(1);
pub const TEXTURE_B: TextureHandle = TextureHandle(2);

/// 2x2 region centered on the bone, sampling the whole texture
pub fn region(name: &str, texture: TextureHandle) -> Attachment {
    Attachment::Region(RegionAttachment::new(name, Some(texture), 0.0, 0.0, 0.0, 2.0, 2.0))
}

pub fn clip(points: Vec<f32>, end_slot: Option<usize>) -> Attachment {
    Attachment::Clipping(ClippingAttachment::new("clip", VertexData::Unweighted(points), end_slot))
}

/// Skeleton with one identity bone and one slot per attachment, in order
pub fn skeleton_of(attachments: Vec<Attachment>) -> Skeleton {
    let slots = attachments
        .into_iter()
        .enumerate()
        .map(|(i, attachment)| Slot::new(i, format!("slot{i}"), 0).with_attachment(attachment))
        .collect();
    Skeleton::new(vec![Bone::identity()], slots)
}

pub fn mesh() -> SkeletonMesh {
    SkeletonMesh::new("test", MeshConfig::default()).expect("default config is valid")
}

pub fn vertex_color(colors: &[f32], vertex: usize) -> Color {
    let c = &colors[vertex * 4..vertex * 4 + 4];
    Color::new(c[0], c[1], c[2], c[3])
}
