//! World-space vertices for renderable attachments
//!
//! Region and Mesh attachments are expanded into a shared scratch buffer.
//! The buffer only ever grows and is owned by one mesh, so a frame never
//! allocates once the largest attachment has been seen. It is not meant to
//! be shared between threads or frames.

use super::clipping::Clipper;
use super::vertex::{COLOR_OFFSET, QUAD_TRIANGLES, SOURCE_VERTEX_SIZE, UV_OFFSET};
use crate::foundation::math::Color;
use crate::skeleton::{Attachment, Skeleton, Slot, TextureHandle};

/// Initial scratch size in floats
const INITIAL_SCRATCH_FLOATS: usize = 1024;

/// Why a slot produced no geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Attachment kind without a vertex source
    Unsupported,
    /// Texture could not be resolved
    MissingTexture,
    /// Slot refers to a bone the skeleton does not have
    MissingBone,
    /// Mesh data is inconsistent (UVs or triangles out of range)
    Malformed,
}

/// World-space geometry of one attachment
#[derive(Debug)]
pub struct WorldGeometry<'a> {
    /// Positions, `stride` floats per vertex; colors and UVs are filled in
    /// by the caller when the stride is the full working layout
    pub vertices: &'a mut [f32],
    /// Floats per vertex in `vertices`: 2 while clipping, 8 otherwise
    pub stride: usize,
    /// Triangle list
    pub triangles: &'a [u16],
    /// One `u, v` pair per vertex
    pub uvs: &'a [f32],
    /// Texture sampled by the attachment
    pub texture: TextureHandle,
    /// Attachment tint
    pub color: Color,
}

/// What one slot's attachment turned into
#[derive(Debug)]
pub enum SourceOutput<'a> {
    /// Textured geometry to batch
    Geometry(WorldGeometry<'a>),
    /// A clip region was pushed
    ClipStarted,
    /// Nothing to draw
    Skipped(SkipReason),
}

/// Computes world-space vertices into an owned scratch buffer
#[derive(Debug)]
pub struct VertexSource {
    vertices: Vec<f32>,
}

impl Default for VertexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource {
    /// Create a source with the default scratch size
    pub fn new() -> Self {
        Self { vertices: vec![0.0; INITIAL_SCRATCH_FLOATS] }
    }

    /// Current scratch size in floats
    pub fn scratch_len(&self) -> usize {
        self.vertices.len()
    }

    /// Grow the scratch buffer to hold at least `floats` values
    pub fn ensure_capacity(&mut self, floats: usize) {
        if floats > self.vertices.len() {
            self.vertices = vec![0.0; floats];
        }
    }

    /// Expand `attachment` for `slot`
    ///
    /// Clipping attachments start a region on `clipper`. While `clipper` is
    /// clipping only positions are written (stride 2), since the clipper
    /// builds the full layout itself.
    pub fn compute<'a>(
        &'a mut self,
        skeleton: &'a Skeleton,
        slot: &'a Slot,
        attachment: &'a Attachment,
        clipper: &mut Clipper,
    ) -> SourceOutput<'a> {
        let stride = if clipper.is_clipping() { 2 } else { SOURCE_VERTEX_SIZE };

        match attachment {
            Attachment::Region(region) => {
                let Some(texture) = region.texture else {
                    return SourceOutput::Skipped(SkipReason::MissingTexture);
                };
                let Some(bone) = skeleton.slot_bone(slot) else {
                    return SourceOutput::Skipped(SkipReason::MissingBone);
                };
                let floats = stride * 4;
                region.compute_world_vertices(bone, &mut self.vertices, stride);
                SourceOutput::Geometry(WorldGeometry {
                    vertices: &mut self.vertices[..floats],
                    stride,
                    triangles: &QUAD_TRIANGLES,
                    uvs: &region.uvs,
                    texture,
                    color: region.color,
                })
            }
            Attachment::Mesh(mesh) => {
                let Some(texture) = mesh.texture else {
                    return SourceOutput::Skipped(SkipReason::MissingTexture);
                };
                let Some(bone) = skeleton.slot_bone(slot) else {
                    return SourceOutput::Skipped(SkipReason::MissingBone);
                };
                let vertex_count = mesh.world_vertices_length() >> 1;
                let in_range = mesh.triangles.iter().all(|&t| usize::from(t) < vertex_count);
                if mesh.uvs.len() < vertex_count * 2 || mesh.triangles.len() % 3 != 0 || !in_range {
                    return SourceOutput::Skipped(SkipReason::Malformed);
                }

                let floats = vertex_count * stride;
                self.ensure_capacity(floats);
                mesh.vertices.compute_world_vertices(
                    bone,
                    &skeleton.bones,
                    &slot.deform,
                    &mut self.vertices[..floats],
                    stride,
                );
                SourceOutput::Geometry(WorldGeometry {
                    vertices: &mut self.vertices[..floats],
                    stride,
                    triangles: &mesh.triangles,
                    uvs: &mesh.uvs,
                    texture,
                    color: mesh.color,
                })
            }
            Attachment::Clipping(clip) => {
                clipper.clip_start(skeleton, slot, clip);
                SourceOutput::ClipStarted
            }
            Attachment::Other { .. } => SourceOutput::Skipped(SkipReason::Unsupported),
        }
    }
}

/// Tint of an attachment: skeleton × slot × attachment, optionally premultiplied
pub fn compute_tint(skeleton: &Skeleton, slot: &Slot, attachment_color: &Color, premultiplied_alpha: bool) -> Color {
    let tint = skeleton.color.multiply(&slot.color).multiply(attachment_color);
    if premultiplied_alpha {
        tint.premultiplied()
    } else {
        tint
    }
}

/// Fill colors and UVs of vertices in the working layout
pub fn write_color_and_uvs(vertices: &mut [f32], uvs: &[f32], color: &Color) {
    let rgba = color.to_array();
    for (vertex, uv) in vertices
        .chunks_exact_mut(SOURCE_VERTEX_SIZE)
        .zip(uvs.chunks_exact(2))
    {
        vertex[COLOR_OFFSET..COLOR_OFFSET + 4].copy_from_slice(&rgba);
        vertex[UV_OFFSET..UV_OFFSET + 2].copy_from_slice(uv);
    }
}
