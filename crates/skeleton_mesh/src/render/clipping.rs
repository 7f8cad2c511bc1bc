//! Clipping against clipping attachments
//!
//! Each clipping attachment met in draw order pushes a clip region onto a
//! stack. A region is its world-space polygon split into convex pieces.
//! Triangles drawn while the stack is non-empty are clipped against every
//! region in turn (Sutherland–Hodgman per convex piece) and re-triangulated
//! as fans. New vertices interpolate position, color and UV linearly.

use super::triangulator::{is_convex, make_counter_clockwise, signed_area, Triangulator};
use super::vertex::SOURCE_VERTEX_SIZE;
use crate::foundation::math::{
    utils::{cross, lerp},
    Color,
};
use crate::skeleton::{ClippingAttachment, Skeleton, Slot};

/// One vertex in the working layout (`x, y, r, g, b, a, u, v`)
type ClipVertex = [f32; SOURCE_VERTEX_SIZE];

/// Most vertices one clip output may hold while staying 16-bit indexable
const MAX_CLIPPED_VERTICES: usize = u16::MAX as usize + 1;

/// Active clip polygon, stored as convex counter-clockwise pieces
///
/// A region without pieces came from a polygon with fewer than three
/// points and clips everything away.
#[derive(Debug, Default)]
struct ClipRegion {
    start_slot: usize,
    end_slot: Option<usize>,
    vertices: Vec<f32>,
    pieces: Vec<(usize, usize)>,
}

impl ClipRegion {
    fn reset(&mut self, start_slot: usize, end_slot: Option<usize>) {
        self.start_slot = start_slot;
        self.end_slot = end_slot;
        self.vertices.clear();
        self.pieces.clear();
    }

    fn pieces(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.pieces.iter().map(|&(start, end)| &self.vertices[start..end])
    }
}

/// Flat list of polygons sharing one vertex buffer
#[derive(Debug, Default)]
struct PolygonList {
    vertices: Vec<ClipVertex>,
    spans: Vec<(usize, usize)>,
}

impl PolygonList {
    fn clear(&mut self) {
        self.vertices.clear();
        self.spans.clear();
    }

    fn push(&mut self, polygon: &[ClipVertex]) {
        let start = self.vertices.len();
        self.vertices.extend_from_slice(polygon);
        self.spans.push((start, self.vertices.len()));
    }

    fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn lerp_vertex(from: &ClipVertex, to: &ClipVertex, t: f32) -> ClipVertex {
    let mut out = [0.0; SOURCE_VERTEX_SIZE];
    for (i, value) in out.iter_mut().enumerate() {
        *value = lerp(from[i], to[i], t);
    }
    out
}

/// Clip `input` against one convex counter-clockwise window
///
/// The result ends up in `output`; `scratch` is working space.
fn clip_convex(input: &[ClipVertex], window: &[f32], output: &mut Vec<ClipVertex>, scratch: &mut Vec<ClipVertex>) {
    output.clear();
    output.extend_from_slice(input);
    let edges = window.len() / 2;

    for e in 0..edges {
        if output.is_empty() {
            break;
        }
        let (ex, ey) = (window[e * 2], window[e * 2 + 1]);
        let next = (e + 1) % edges;
        let (fx, fy) = (window[next * 2], window[next * 2 + 1]);

        std::mem::swap(output, scratch);
        output.clear();
        let n = scratch.len();
        for i in 0..n {
            let previous = &scratch[(i + n - 1) % n];
            let current = &scratch[i];
            let previous_side = cross(ex, ey, fx, fy, previous[0], previous[1]);
            let current_side = cross(ex, ey, fx, fy, current[0], current[1]);

            if current_side >= 0.0 {
                if previous_side < 0.0 {
                    let t = previous_side / (previous_side - current_side);
                    output.push(lerp_vertex(previous, current, t));
                }
                output.push(*current);
            } else if previous_side >= 0.0 {
                let t = previous_side / (previous_side - current_side);
                output.push(lerp_vertex(previous, current, t));
            }
        }
    }

    if output.len() < 3 {
        output.clear();
    }
}

/// Stack of active clip regions plus the output of the last clip
#[derive(Debug, Default)]
pub struct Clipper {
    regions: Vec<ClipRegion>,
    active: usize,
    triangulator: Triangulator,
    world: Vec<f32>,

    current: PolygonList,
    next: PolygonList,
    work: Vec<ClipVertex>,
    scratch: Vec<ClipVertex>,

    clipped_vertices: Vec<f32>,
    clipped_triangles: Vec<u16>,
}

impl Clipper {
    /// Create a clipper with no active regions
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any clip region is active
    pub const fn is_clipping(&self) -> bool {
        self.active > 0
    }

    /// Number of active clip regions
    pub const fn depth(&self) -> usize {
        self.active
    }

    /// Push the region described by `clip`, placed by `slot`'s bone
    pub fn clip_start(&mut self, skeleton: &Skeleton, slot: &Slot, clip: &ClippingAttachment) {
        if self.regions.len() == self.active {
            self.regions.push(ClipRegion::default());
        }
        let region = &mut self.regions[self.active];
        region.reset(slot.index, clip.end_slot);
        self.active += 1;

        let length = clip.vertices.world_vertices_length();
        let Some(bone) = skeleton.slot_bone(slot) else {
            log::trace!("Clip '{}' on slot '{}' has no bone; clipping everything", clip.name, slot.name);
            return;
        };
        if length < 6 {
            log::trace!("Clip '{}' has fewer than 3 points; clipping everything", clip.name);
            return;
        }

        self.world.clear();
        self.world.resize(length, 0.0);
        clip.vertices
            .compute_world_vertices(bone, &skeleton.bones, &slot.deform, &mut self.world, 2);
        make_counter_clockwise(&mut self.world);

        if is_convex(&self.world) {
            if signed_area(&self.world).abs() > f32::EPSILON {
                region.vertices.extend_from_slice(&self.world);
                region.pieces.push((0, length));
            }
        } else {
            self.triangulator
                .decompose(&self.world, &mut region.vertices, &mut region.pieces);
        }
    }

    /// End every region whose end marker is `slot`
    pub fn clip_end_with_slot(&mut self, slot: &Slot) {
        let mut i = self.active;
        while i > 0 {
            i -= 1;
            if self.regions[i].end_slot == Some(slot.index) {
                // Keep the region's buffers for reuse past the active range
                self.regions[i..self.active].rotate_left(1);
                self.active -= 1;
            }
        }
    }

    /// End every region; returns how many were still open
    pub fn clip_end(&mut self) -> usize {
        let open = self.active;
        self.active = 0;
        self.clipped_vertices.clear();
        self.clipped_triangles.clear();
        open
    }

    /// Slot indices of the clipping attachments that started the active regions
    pub fn active_start_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.regions[..self.active].iter().map(|region| region.start_slot)
    }

    /// Clip a triangle list against every active region
    ///
    /// `vertices` holds `x, y` pairs, `uvs` one `u, v` pair per vertex.
    /// Output vertices use the working layout and carry `light` unless they
    /// were interpolated from differently colored inputs. Triangles that
    /// index outside `vertices` or `uvs` are ignored.
    pub fn clip_triangles(&mut self, vertices: &[f32], triangles: &[u16], uvs: &[f32], light: Color) {
        self.clipped_vertices.clear();
        self.clipped_triangles.clear();
        let count = (vertices.len() / 2).min(uvs.len() / 2);
        let [r, g, b, a] = light.to_array();

        for triangle in triangles.chunks_exact(3) {
            if triangle.iter().any(|&index| usize::from(index) >= count) {
                continue;
            }
            let corners = [0, 1, 2].map(|corner| {
                let v = usize::from(triangle[corner]) * 2;
                [vertices[v], vertices[v + 1], r, g, b, a, uvs[v], uvs[v + 1]]
            });

            self.current.clear();
            self.current.push(&corners);
            for region in &self.regions[..self.active] {
                self.next.clear();
                for &(start, end) in &self.current.spans {
                    let polygon = &self.current.vertices[start..end];
                    for piece in region.pieces() {
                        clip_convex(polygon, piece, &mut self.work, &mut self.scratch);
                        if !self.work.is_empty() {
                            self.next.push(&self.work);
                        }
                    }
                }
                std::mem::swap(&mut self.current, &mut self.next);
                if self.current.is_empty() {
                    break;
                }
            }

            for &(start, end) in &self.current.spans {
                let polygon = &self.current.vertices[start..end];
                let base = self.clipped_vertices.len() / SOURCE_VERTEX_SIZE;
                if base + polygon.len() > MAX_CLIPPED_VERTICES {
                    log::warn!("Clipped geometry exceeds 16-bit index range; truncating");
                    return;
                }
                for vertex in polygon {
                    self.clipped_vertices.extend_from_slice(vertex);
                }
                for i in 1..polygon.len() - 1 {
                    self.clipped_triangles
                        .extend_from_slice(&[base as u16, (base + i) as u16, (base + i + 1) as u16]);
                }
            }
        }
    }

    /// Vertices produced by the last `clip_triangles` call (working layout)
    pub fn clipped_vertices(&self) -> &[f32] {
        &self.clipped_vertices
    }

    /// Triangles produced by the last `clip_triangles` call
    pub fn clipped_triangles(&self) -> &[u16] {
        &self.clipped_triangles
    }

    /// Mutable vertices and triangles of the last clip, for vertex effects
    pub fn clipped_mut(&mut self) -> (&mut [f32], &[u16]) {
        (&mut self.clipped_vertices, &self.clipped_triangles)
    }
}
