//! Attachment payloads a slot can hold
//!
//! The set of kinds is closed. Region and Mesh attachments produce textured
//! geometry, Clipping attachments only influence the slots drawn after them,
//! and everything else (bounding boxes, points, paths) is carried as `Other`
//! and ignored by the geometry pass.

use super::Bone;
use crate::foundation::math::Color;

/// Opaque handle of a texture owned by the host's texture layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Renderable or influence-only payload bound to a slot
#[derive(Debug, Clone)]
pub enum Attachment {
    /// Textured quad
    Region(RegionAttachment),
    /// Arbitrary triangulated mesh
    Mesh(MeshAttachment),
    /// Clipping polygon affecting subsequent slots
    Clipping(ClippingAttachment),
    /// Kind without a vertex source
    Other {
        /// Attachment name
        name: String,
    },
}

impl Attachment {
    /// Attachment name
    pub fn name(&self) -> &str {
        match self {
            Self::Region(region) => &region.name,
            Self::Mesh(mesh) => &mesh.name,
            Self::Clipping(clip) => &clip.name,
            Self::Other { name } => name,
        }
    }
}

/// Textured quad placed relative to its slot's bone
#[derive(Debug, Clone)]
pub struct RegionAttachment {
    /// Attachment name
    pub name: String,
    /// Attachment tint
    pub color: Color,
    /// Texture the region lives in; `None` when the atlas lookup failed
    pub texture: Option<TextureHandle>,
    /// Corner UVs in corner order (bottom-left, top-left, top-right, bottom-right)
    pub uvs: [f32; 8],
    /// Corner positions in bone space, same order as `uvs`
    pub offset: [f32; 8],
}

impl RegionAttachment {
    /// Create a region centered on `(x, y)` in bone space
    ///
    /// `rotation` is in degrees. UVs default to the full texture.
    pub fn new(
        name: impl Into<String>,
        texture: Option<TextureHandle>,
        x: f32,
        y: f32,
        rotation: f32,
        width: f32,
        height: f32,
    ) -> Self {
        let mut region = Self {
            name: name.into(),
            color: Color::WHITE,
            texture,
            uvs: [0.0; 8],
            offset: [0.0; 8],
        };
        region.update_offset(x, y, rotation, 1.0, 1.0, width, height);
        region.set_uvs(0.0, 0.0, 1.0, 1.0, false);
        region
    }

    /// Recompute the bone-space corners
    pub fn update_offset(
        &mut self,
        x: f32,
        y: f32,
        rotation: f32,
        scale_x: f32,
        scale_y: f32,
        width: f32,
        height: f32,
    ) {
        let local_x = -width / 2.0 * scale_x;
        let local_y = -height / 2.0 * scale_y;
        let local_x2 = local_x + width * scale_x;
        let local_y2 = local_y + height * scale_y;
        let (sin, cos) = rotation.to_radians().sin_cos();

        let local_x_cos = local_x * cos + x;
        let local_x_sin = local_x * sin;
        let local_y_cos = local_y * cos + y;
        let local_y_sin = local_y * sin;
        let local_x2_cos = local_x2 * cos + x;
        let local_x2_sin = local_x2 * sin;
        let local_y2_cos = local_y2 * cos + y;
        let local_y2_sin = local_y2 * sin;

        self.offset = [
            local_x_cos - local_y_sin,
            local_y_cos + local_x_sin,
            local_x_cos - local_y2_sin,
            local_y2_cos + local_x_sin,
            local_x2_cos - local_y2_sin,
            local_y2_cos + local_x2_sin,
            local_x2_cos - local_y_sin,
            local_y_cos + local_x2_sin,
        ];
    }

    /// Set the corner UVs from an atlas rectangle, optionally rotated 90°
    pub fn set_uvs(&mut self, u: f32, v: f32, u2: f32, v2: f32, rotate: bool) {
        self.uvs = if rotate {
            [u2, v2, u, v2, u, v, u2, v]
        } else {
            [u, v2, u, v, u2, v, u2, v2]
        };
    }

    /// Set the tint (builder style)
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Write the 4 world-space corners to `out`, `stride` floats apart
    ///
    /// `out` must hold at least `3 * stride + 2` floats.
    pub fn compute_world_vertices(&self, bone: &Bone, out: &mut [f32], stride: usize) {
        for corner in 0..4 {
            let p = bone.local_to_world(self.offset[corner * 2], self.offset[corner * 2 + 1]);
            out[corner * stride] = p.x;
            out[corner * stride + 1] = p.y;
        }
    }
}

/// One bone's contribution to a weighted vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfluence {
    /// Bone index in the skeleton
    pub bone: usize,
    /// Position in that bone's space
    pub x: f32,
    /// Position in that bone's space
    pub y: f32,
    /// Blend weight
    pub weight: f32,
}

/// Vertex bound to several bones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedVertex {
    /// Contributing bones
    pub influences: Vec<BoneInfluence>,
}

/// Local vertex positions of a mesh or clipping polygon
#[derive(Debug, Clone, PartialEq)]
pub enum VertexData {
    /// `x, y` pairs in the slot bone's space
    Unweighted(Vec<f32>),
    /// Vertices skinned to several bones
    Weighted(Vec<WeightedVertex>),
}

impl VertexData {
    /// Number of floats the world-space positions occupy (2 per vertex)
    pub fn world_vertices_length(&self) -> usize {
        match self {
            Self::Unweighted(vertices) => vertices.len() & !1,
            Self::Weighted(vertices) => vertices.len() * 2,
        }
    }

    /// Write world-space positions to `out`, `stride` floats apart
    ///
    /// `deform`, when not empty, replaces the local positions: one `x, y`
    /// pair per vertex for unweighted data, one offset pair per influence
    /// for weighted data. Influences naming a missing bone are ignored.
    pub fn compute_world_vertices(
        &self,
        slot_bone: &Bone,
        bones: &[Bone],
        deform: &[f32],
        out: &mut [f32],
        stride: usize,
    ) {
        match self {
            Self::Unweighted(vertices) => {
                let local = if deform.len() >= vertices.len() { deform } else { vertices.as_slice() };
                for (i, pair) in local[..vertices.len()].chunks_exact(2).enumerate() {
                    let p = slot_bone.local_to_world(pair[0], pair[1]);
                    out[i * stride] = p.x;
                    out[i * stride + 1] = p.y;
                }
            }
            Self::Weighted(vertices) => {
                let mut f = 0;
                for (i, vertex) in vertices.iter().enumerate() {
                    let (mut wx, mut wy) = (0.0, 0.0);
                    for influence in &vertex.influences {
                        let (mut vx, mut vy) = (influence.x, influence.y);
                        if deform.len() >= f + 2 {
                            vx += deform[f];
                            vy += deform[f + 1];
                        }
                        f += 2;
                        if let Some(bone) = bones.get(influence.bone) {
                            wx += (vx * bone.a + vy * bone.b + bone.world_x) * influence.weight;
                            wy += (vx * bone.c + vy * bone.d + bone.world_y) * influence.weight;
                        }
                    }
                    out[i * stride] = wx;
                    out[i * stride + 1] = wy;
                }
            }
        }
    }
}

/// Arbitrary triangulated, textured mesh
#[derive(Debug, Clone)]
pub struct MeshAttachment {
    /// Attachment name
    pub name: String,
    /// Attachment tint
    pub color: Color,
    /// Texture the mesh samples; `None` when the atlas lookup failed
    pub texture: Option<TextureHandle>,
    /// Local vertex positions
    pub vertices: VertexData,
    /// One `u, v` pair per vertex
    pub uvs: Vec<f32>,
    /// Triangle list indexing the vertices
    pub triangles: Vec<u16>,
}

impl MeshAttachment {
    /// Create a white mesh attachment
    pub fn new(
        name: impl Into<String>,
        texture: Option<TextureHandle>,
        vertices: VertexData,
        uvs: Vec<f32>,
        triangles: Vec<u16>,
    ) -> Self {
        Self {
            name: name.into(),
            color: Color::WHITE,
            texture,
            vertices,
            uvs,
            triangles,
        }
    }

    /// Set the tint (builder style)
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Number of floats the world-space positions occupy
    pub fn world_vertices_length(&self) -> usize {
        self.vertices.world_vertices_length()
    }
}

/// Polygon that clips every slot drawn after it until `end_slot`
#[derive(Debug, Clone)]
pub struct ClippingAttachment {
    /// Attachment name
    pub name: String,
    /// Polygon outline
    pub vertices: VertexData,
    /// Slot index at which clipping stops (inclusive); `None` clips to frame end
    pub end_slot: Option<usize>,
}

impl ClippingAttachment {
    /// Create a clipping attachment
    pub fn new(name: impl Into<String>, vertices: VertexData, end_slot: Option<usize>) -> Self {
        Self {
            name: name.into(),
            vertices,
            end_slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_region_corners_axis_aligned() {
        let region = RegionAttachment::new("r", None, 0.0, 0.0, 0.0, 2.0, 4.0);
        assert_eq!(region.offset, [-1.0, -2.0, -1.0, 2.0, 1.0, 2.0, 1.0, -2.0]);
        assert_eq!(region.uvs, [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_region_world_vertices_with_stride() {
        let region = RegionAttachment::new("r", None, 0.0, 0.0, 0.0, 2.0, 2.0);
        let bone = Bone::at(5.0, 5.0);
        let mut out = [0.0f32; 32];
        region.compute_world_vertices(&bone, &mut out, 8);
        assert_eq!(&out[0..2], &[4.0, 4.0]);
        assert_eq!(&out[8..10], &[4.0, 6.0]);
        assert_eq!(&out[16..18], &[6.0, 6.0]);
        assert_eq!(&out[24..26], &[6.0, 4.0]);
    }

    #[test]
    fn test_rotated_uvs() {
        let mut region = RegionAttachment::new("r", None, 0.0, 0.0, 0.0, 1.0, 1.0);
        region.set_uvs(0.0, 0.0, 0.5, 0.5, true);
        assert_eq!(region.uvs, [0.5, 0.5, 0.0, 0.5, 0.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_unweighted_deform_overrides_local_positions() {
        let data = VertexData::Unweighted(vec![0.0, 0.0, 1.0, 0.0]);
        let bone = Bone::at(1.0, 1.0);
        let mut out = [0.0f32; 4];
        data.compute_world_vertices(&bone, &[], &[2.0, 2.0, 3.0, 3.0], &mut out, 2);
        assert_eq!(out, [3.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn test_weighted_vertices_blend_bones() {
        let bones = [Bone::at(0.0, 0.0), Bone::at(10.0, 0.0)];
        let data = VertexData::Weighted(vec![WeightedVertex {
            influences: vec![
                BoneInfluence { bone: 0, x: 0.0, y: 2.0, weight: 0.5 },
                BoneInfluence { bone: 1, x: 0.0, y: 2.0, weight: 0.5 },
            ],
        }]);
        assert_eq!(data.world_vertices_length(), 2);
        let mut out = [0.0f32; 2];
        data.compute_world_vertices(&bones[0], &bones, &[], &mut out, 2);
        assert_relative_eq!(out[0], 5.0);
        assert_relative_eq!(out[1], 2.0);
    }
}
