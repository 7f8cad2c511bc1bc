//! Vertex layouts used by the geometry pass
//!
//! Attachments are expanded into a packed working layout of 8 floats per
//! vertex (`x, y, r, g, b, a, u, v`). Batches store 9 floats per vertex,
//! adding a `z` component, and can export them as [`BatchVertex`] records
//! ready for GPU upload.

use bytemuck::{Pod, Zeroable};

/// Floats per vertex in the working layout (`x, y, r, g, b, a, u, v`)
pub const SOURCE_VERTEX_SIZE: usize = 8;

/// Floats per vertex in the batch layout (3 position + 4 color + 2 UV)
pub const BATCH_VERTEX_SIZE: usize = 9;

/// Offset of the color channels in the working layout
pub const COLOR_OFFSET: usize = 2;

/// Offset of the UV pair in the working layout
pub const UV_OFFSET: usize = 6;

/// Triangle list for a region quad
pub const QUAD_TRIANGLES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Interleaved vertex as uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BatchVertex {
    /// World position with depth
    pub position: [f32; 3],
    /// Tint (RGBA)
    pub color: [f32; 4],
    /// Texture coordinates
    pub uv: [f32; 2],
}
