//! # Geometry Batching
//!
//! Converts a posed skeleton into texture-homogeneous batches ready for
//! upload. Nothing in here talks to a GPU; batches expose plain vertex and
//! index data plus the texture they sample.
//!
//! ## Architecture
//!
//! - **Vertex source**: expands Region and Mesh attachments to world space
//! - **Clipper**: stack of clip regions, Sutherland–Hodgman per convex piece
//! - **Batch / pool**: accumulating buffers with a capacity threshold
//! - **Skeleton mesh**: the per-frame sequencer tying the above together

pub mod batch;
pub mod clipping;
pub mod effect;
pub mod pool;
pub mod skeleton_mesh;
pub mod triangulator;
pub mod vertex;
pub mod vertex_source;

#[cfg(test)]
mod tests;

pub use batch::{BatchCapacity, BatchError, BatchGeometry, BatchResult, MeshBatch, MAX_VERTICES_PER_BATCH};
pub use clipping::Clipper;
pub use effect::{JitterEffect, SwirlEffect, VertexEffect};
pub use pool::BatchPool;
pub use skeleton_mesh::{FrameStats, MeshError, SkeletonMesh};
pub use vertex::BatchVertex;
pub use vertex_source::{SkipReason, VertexSource};
