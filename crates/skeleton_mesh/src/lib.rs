//! # Skeleton Mesh
//!
//! Geometry batching for posed 2D skeletons: every frame the slots of a
//! skeleton are walked in draw order and their attachments are turned into
//! as few texture-homogeneous vertex/index buffers as possible.
//!
//! ## Features
//!
//! - **Region and Mesh attachments**: quads and triangulated meshes, weighted or not
//! - **Clipping**: stacked clip polygons, concave ones split into convex pieces
//! - **Batching**: capacity-aware buffers, split on texture change or when full
//! - **Vertex effects**: per-vertex hooks such as swirl and jitter
//! - **Configuration**: TOML/RON batch settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skeleton_mesh::prelude::*;
//!
//! fn main() -> Result<(), MeshError> {
//!     let region = RegionAttachment::new("head", Some(TextureHandle(1)), 0.0, 0.0, 0.0, 64.0, 64.0);
//!     let slot = Slot::new(0, "head", 0).with_attachment(Attachment::Region(region));
//!     let skeleton = Skeleton::new(vec![Bone::identity()], vec![slot]);
//!
//!     let mut mesh = SkeletonMesh::new("hero", MeshConfig::default())?;
//!     mesh.update_geometry(&skeleton);
//!     for batch in mesh.batches() {
//!         let _vertices = batch.interleaved();
//!         let _indices = batch.index_bytes();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod skeleton;

pub use render::{FrameStats, MeshError, SkeletonMesh};

/// Common imports for users of the crate
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, MeshConfig},
        foundation::math::{Color, Vec2},
        render::{
            BatchError, BatchVertex, FrameStats, JitterEffect, MeshBatch, MeshError, SkeletonMesh,
            SwirlEffect, VertexEffect,
        },
        skeleton::{
            Attachment, Bone, BoneInfluence, ClippingAttachment, MeshAttachment, RegionAttachment,
            Skeleton, Slot, TextureHandle, VertexData, WeightedVertex,
        },
    };
}
