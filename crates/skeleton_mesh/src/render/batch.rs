//! # Mesh Batch
//!
//! A capacity-bounded accumulator of vertices and triangle indices that all
//! sample the same texture. The geometry pass appends attachments to the
//! current batch until it is full or the texture changes, then finalizes it
//! and moves on to the next one.
//!
//! ## Lifecycle
//!
//! - `begin()` resets the fill counters; buffers keep their capacity
//! - `can_batch()` tells whether more geometry still fits under the threshold
//! - `batch()` appends geometry, rebasing indices onto this batch's vertices
//! - `end()` publishes the accumulated arrays as the finished geometry

use crate::render::vertex::{BatchVertex, BATCH_VERTEX_SIZE, SOURCE_VERTEX_SIZE};
use crate::skeleton::TextureHandle;

/// Hard per-batch vertex ceiling; `3 * 10920` indices stay within 16 bits
pub const MAX_VERTICES_PER_BATCH: usize = 10920;

/// Default fraction of the capacity a batch fills before reporting full
pub const DEFAULT_CAPACITY_THRESHOLD: f32 = 0.5;

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that can occur when configuring batches
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchError {
    /// Requested capacity is above the hard ceiling
    #[error("Can't have more than {max} vertices per batch: {requested}")]
    CapacityExceeded {
        /// Requested vertex capacity
        requested: usize,
        /// Maximum allowed vertex capacity
        max: usize,
    },

    /// Batch with no room at all
    #[error("Batch capacity must be at least one vertex")]
    ZeroCapacity,

    /// Threshold outside `(0, 1]`
    #[error("Capacity threshold must be in (0, 1]: {0}")]
    InvalidThreshold(f32),
}

/// Validated capacity settings shared by every batch of a pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchCapacity {
    max_vertices: usize,
    threshold: f32,
}

impl BatchCapacity {
    /// Validate a vertex capacity and fill threshold
    pub fn new(max_vertices: usize, threshold: f32) -> BatchResult<Self> {
        if max_vertices > MAX_VERTICES_PER_BATCH {
            return Err(BatchError::CapacityExceeded {
                requested: max_vertices,
                max: MAX_VERTICES_PER_BATCH,
            });
        }
        if max_vertices == 0 {
            return Err(BatchError::ZeroCapacity);
        }
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(BatchError::InvalidThreshold(threshold));
        }
        Ok(Self { max_vertices, threshold })
    }

    /// Maximum vertices a batch may hold
    pub const fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    /// Maximum indices a batch may hold
    pub const fn max_indices(&self) -> usize {
        self.max_vertices * 3
    }

    /// Fill fraction at which `can_batch` starts rejecting
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for BatchCapacity {
    fn default() -> Self {
        Self {
            max_vertices: MAX_VERTICES_PER_BATCH,
            threshold: DEFAULT_CAPACITY_THRESHOLD,
        }
    }
}

/// Finalized buffers of a batch, in the layout the render layer uploads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGeometry {
    /// `x, y, z` per vertex
    pub positions: Vec<f32>,
    /// `r, g, b, a` per vertex
    pub colors: Vec<f32>,
    /// `u, v` per vertex
    pub uvs: Vec<f32>,
    /// Triangle list
    pub indices: Vec<u16>,
}

impl BatchGeometry {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of indices
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.uvs.clear();
        self.indices.clear();
    }
}

/// One drawable unit: geometry sharing a single texture
#[derive(Debug)]
pub struct MeshBatch {
    id: usize,
    capacity: BatchCapacity,
    depth: f32,
    alpha_index: f32,
    texture: Option<TextureHandle>,
    visible: bool,

    /// Running vertex count (not floats)
    vertex_count: usize,
    index_count: usize,

    accumulating: BatchGeometry,
    finished: BatchGeometry,
}

impl MeshBatch {
    /// Create a batch holding at most `max_vertices` vertices
    pub fn new(id: usize, max_vertices: usize) -> BatchResult<Self> {
        let capacity = BatchCapacity::new(max_vertices, DEFAULT_CAPACITY_THRESHOLD)?;
        Ok(Self::with_capacity(id, capacity))
    }

    /// Create a batch from validated capacity settings
    pub fn with_capacity(id: usize, capacity: BatchCapacity) -> Self {
        Self {
            id,
            capacity,
            depth: 0.0,
            alpha_index: 0.0,
            texture: None,
            visible: false,
            vertex_count: 0,
            index_count: 0,
            accumulating: BatchGeometry::default(),
            finished: BatchGeometry::default(),
        }
    }

    /// Position of this batch in its pool
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Capacity settings
    pub const fn capacity(&self) -> BatchCapacity {
        self.capacity
    }

    /// Reset the fill counters for a new run of appends
    pub fn begin(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
        self.accumulating.clear();
    }

    /// Whether `vertices` more vertices and `indices` more indices stay
    /// below the capacity threshold
    pub fn can_batch(&self, vertices: usize, indices: usize) -> bool {
        let threshold = self.capacity.threshold;
        let vertex_limit = (self.capacity.max_vertices() * BATCH_VERTEX_SIZE) as f32 * threshold;
        let index_limit = self.capacity.max_indices() as f32 * threshold;

        if ((self.vertex_count + vertices) * BATCH_VERTEX_SIZE) as f32 >= vertex_limit {
            return false;
        }
        if (self.index_count + indices) as f32 >= index_limit {
            return false;
        }
        true
    }

    /// Whether the geometry fits the hard capacity of an empty batch
    pub const fn fits_capacity(&self, vertices: usize, indices: usize) -> bool {
        vertices <= self.capacity.max_vertices() && indices <= self.capacity.max_indices()
    }

    /// Append geometry in the working layout (8 floats per vertex)
    ///
    /// Indices are offset by the number of vertices already in the batch and
    /// every vertex gets `z` as its depth. Callers check `can_batch` first.
    pub fn batch(&mut self, vertices: &[f32], indices: &[u16], z: f32) {
        let index_start = self.vertex_count;
        let added = vertices.len() / SOURCE_VERTEX_SIZE;
        debug_assert!(
            index_start + added <= self.capacity.max_vertices(),
            "batch {} overflow: {} + {} vertices",
            self.id,
            index_start,
            added
        );

        let geometry = &mut self.accumulating;
        for vertex in vertices.chunks_exact(SOURCE_VERTEX_SIZE) {
            geometry.positions.extend_from_slice(&[vertex[0], vertex[1], z]);
            geometry.colors.extend_from_slice(&vertex[2..6]);
            geometry.uvs.extend_from_slice(&vertex[6..8]);
        }
        geometry
            .indices
            .extend(indices.iter().map(|&index| (usize::from(index) + index_start) as u16));

        self.vertex_count += added;
        self.index_count += indices.len();
        self.alpha_index = z.abs() * 10.0 + self.depth * 1000.0;
    }

    /// Publish the accumulated geometry and clear the accumulation buffers
    pub fn end(&mut self) {
        std::mem::swap(&mut self.accumulating, &mut self.finished);
        self.accumulating.clear();
    }

    /// Drop all geometry, unbind the texture and hide the batch
    pub fn clear(&mut self) {
        self.accumulating.clear();
        self.finished.clear();
        self.vertex_count = 0;
        self.index_count = 0;
        self.texture = None;
        self.visible = false;
        self.alpha_index = self.depth * 1000.0;
    }

    /// Vertices appended since `begin()`
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Indices appended since `begin()`
    pub const fn index_count(&self) -> usize {
        self.index_count
    }

    /// Whether nothing was appended since `begin()`
    pub const fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Bound texture
    pub const fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Bind the texture every vertex of this batch samples
    pub fn bind_texture(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
    }

    /// Render-order key; larger sorts later
    pub const fn alpha_index(&self) -> f32 {
        self.alpha_index
    }

    /// Layer depth
    pub const fn depth(&self) -> f32 {
        self.depth
    }

    /// Set the layer depth used for the render-order key
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
    }

    /// Whether the render layer should draw this batch
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the batch
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Geometry published by the last `end()`
    pub const fn geometry(&self) -> &BatchGeometry {
        &self.finished
    }

    /// Finished geometry as interleaved GPU vertices
    pub fn interleaved(&self) -> Vec<BatchVertex> {
        let geometry = &self.finished;
        geometry
            .positions
            .chunks_exact(3)
            .zip(geometry.colors.chunks_exact(4))
            .zip(geometry.uvs.chunks_exact(2))
            .map(|((position, color), uv)| BatchVertex {
                position: [position[0], position[1], position[2]],
                color: [color[0], color[1], color[2], color[3]],
                uv: [uv[0], uv[1]],
            })
            .collect()
    }

    /// Finished geometry as raw interleaved vertex bytes
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleaved()).to_vec()
    }

    /// Finished indices as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.finished.indices)
    }
}
