//! # Skeleton Mesh
//!
//! Turns a posed skeleton into batches, once per frame.
//!
//! ## Frame Pass
//!
//! 1. Rewind the batch pool and hide every batch
//! 2. Walk the draw order; for each slot expand its attachment, clip it
//!    against the active clip regions, run the vertex effect
//! 3. Append the result to the current batch, first finishing the batch
//!    when the texture changes or the batch is full
//! 4. Close any clip region left open and finish the last batch
//!
//! A depth offset accumulates across the whole frame, independent of batch
//! boundaries, so stacked attachments keep their draw order after a split.

use super::batch::{BatchCapacity, BatchError, MeshBatch};
use super::clipping::Clipper;
use super::effect::{apply_effect, VertexEffect};
use super::pool::BatchPool;
use super::vertex::SOURCE_VERTEX_SIZE;
use super::vertex_source::{compute_tint, write_color_and_uvs, SourceOutput, VertexSource};
use crate::config::{Config, ConfigError, MeshConfig};
use crate::foundation::math::Color;
use crate::skeleton::{Skeleton, TextureHandle};

/// Errors that can occur when creating a skeleton mesh
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Batch capacity settings were rejected
    #[error("Invalid batch configuration: {0}")]
    Batch(#[from] BatchError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Counters describing the last geometry pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Batches handed out
    pub batch_count: usize,
    /// Vertices across all batches
    pub vertex_count: usize,
    /// Indices across all batches
    pub index_count: usize,
    /// Attachments appended to a batch
    pub attachments_batched: usize,
    /// Batches finished because the next attachment used another texture
    pub texture_flushes: usize,
    /// Batches finished because the next attachment did not fit
    pub capacity_flushes: usize,
    /// Slots whose attachment produced no geometry
    pub skipped_slots: usize,
    /// Clip regions started
    pub clip_regions: usize,
    /// Clip regions still open at the end of the pass
    pub unterminated_clips: usize,
}

impl FrameStats {
    /// Average vertices per batch
    pub fn avg_vertices_per_batch(&self) -> f32 {
        if self.batch_count == 0 {
            0.0
        } else {
            self.vertex_count as f32 / self.batch_count as f32
        }
    }
}

/// Owns the batches, clip state and scratch buffers of one skeleton
///
/// Passes take `&mut self`, so two passes over the same mesh can never
/// overlap. Independent meshes can be updated on different threads.
pub struct SkeletonMesh {
    name: String,
    config: MeshConfig,
    pool: BatchPool,
    clipper: Clipper,
    source: VertexSource,
    vertex_effect: Option<Box<dyn VertexEffect + Send>>,
    stats: FrameStats,
}

impl std::fmt::Debug for SkeletonMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkeletonMesh")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("batches", &self.pool.all().len())
            .field("has_vertex_effect", &self.vertex_effect.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

impl SkeletonMesh {
    /// Create a mesh; fails if the batch capacity is invalid
    pub fn new(name: impl Into<String>, config: MeshConfig) -> Result<Self, MeshError> {
        let capacity = BatchCapacity::new(config.max_vertices_per_batch, config.capacity_threshold)?;
        let mut pool = BatchPool::new(capacity);
        pool.set_depth(config.depth);
        let name = name.into();

        log::info!(
            "Created skeleton mesh '{}' ({} vertices per batch, threshold {})",
            name,
            capacity.max_vertices(),
            capacity.threshold()
        );

        Ok(Self {
            name,
            config,
            pool,
            clipper: Clipper::new(),
            source: VertexSource::new(),
            vertex_effect: None,
            stats: FrameStats::default(),
        })
    }

    /// Create a mesh from a TOML or RON configuration file
    pub fn from_config_file(name: impl Into<String>, path: &str) -> Result<Self, MeshError> {
        let config = MeshConfig::load_from_file(path)?;
        Self::new(name, config)
    }

    /// Mesh name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active configuration
    pub const fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Install or remove the per-vertex effect
    pub fn set_vertex_effect(&mut self, effect: Option<Box<dyn VertexEffect + Send>>) {
        self.vertex_effect = effect;
    }

    /// Set the layer depth of every batch
    pub fn set_depth(&mut self, depth: f32) {
        self.config.depth = depth;
        self.pool.set_depth(depth);
    }

    /// Batches filled by the last pass, in draw order
    pub fn batches(&self) -> &[MeshBatch] {
        self.pool.live()
    }

    /// Every pooled batch; those past the live ones are hidden
    pub fn pooled_batches(&self) -> &[MeshBatch] {
        self.pool.all()
    }

    /// Statistics of the last pass
    pub const fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Number of clip regions currently active; zero between passes
    pub const fn clip_depth(&self) -> usize {
        self.clipper.depth()
    }

    /// Release all batches
    pub fn dispose(&mut self) {
        self.pool.dispose();
        log::info!("Disposed skeleton mesh '{}'", self.name);
    }

    /// Run one geometry pass over a posed skeleton
    pub fn update_geometry(&mut self, skeleton: &Skeleton) -> &FrameStats {
        self.pool.reset();
        self.stats = FrameStats::default();
        if let Some(effect) = self.vertex_effect.as_deref_mut() {
            effect.begin(skeleton);
        }

        let mut current = self.pool.next_batch();
        self.pool.batch_mut(current).begin();
        let mut z = 0.0f32;
        let z_offset = self.config.z_offset;
        let premultiplied_alpha = self.config.premultiplied_alpha;

        for slot in skeleton.draw_order_slots() {
            let Some(attachment) = slot.attachment() else {
                self.clipper.clip_end_with_slot(slot);
                continue;
            };

            match self.source.compute(skeleton, slot, attachment, &mut self.clipper) {
                SourceOutput::Geometry(geometry) => {
                    let tint = compute_tint(skeleton, slot, &geometry.color, premultiplied_alpha);
                    let texture = geometry.texture;

                    let (vertices, triangles): (&mut [f32], &[u16]) = if self.clipper.is_clipping() {
                        self.clipper
                            .clip_triangles(geometry.vertices, geometry.triangles, geometry.uvs, tint);
                        self.clipper.clipped_mut()
                    } else {
                        write_color_and_uvs(geometry.vertices, geometry.uvs, &tint);
                        (geometry.vertices, geometry.triangles)
                    };

                    if let Some(effect) = self.vertex_effect.as_deref_mut() {
                        let dark = slot.dark_color.unwrap_or(Color::TRANSPARENT);
                        apply_effect(effect, vertices, dark);
                    }

                    if vertices.is_empty() || triangles.is_empty() {
                        log::trace!("Slot '{}' produced no geometry; skipping", slot.name);
                        self.stats.skipped_slots += 1;
                    } else if let Some(next) =
                        append_geometry(&mut self.pool, &mut self.stats, current, texture, vertices, triangles, z)
                    {
                        current = next;
                        z += z_offset;
                    } else {
                        log::warn!(
                            "Attachment '{}' on slot '{}' exceeds the batch capacity; skipping",
                            attachment.name(),
                            slot.name
                        );
                        self.stats.skipped_slots += 1;
                    }
                }
                SourceOutput::ClipStarted => {
                    self.stats.clip_regions += 1;
                }
                SourceOutput::Skipped(reason) => {
                    log::trace!("Skipping attachment '{}' on slot '{}': {:?}", attachment.name(), slot.name, reason);
                    self.stats.skipped_slots += 1;
                }
            }

            self.clipper.clip_end_with_slot(slot);
        }

        let open = self.clipper.clip_end();
        if open > 0 {
            log::warn!("Skeleton mesh '{}': {} clip region(s) left open at frame end", self.name, open);
        }
        self.stats.unterminated_clips = open;

        self.pool.batch_mut(current).end();
        if let Some(effect) = self.vertex_effect.as_deref_mut() {
            effect.end();
        }

        let live = self.pool.live();
        self.stats.batch_count = live.len();
        self.stats.vertex_count = live.iter().map(|b| b.geometry().vertex_count()).sum();
        self.stats.index_count = live.iter().map(|b| b.geometry().index_count()).sum();

        log::debug!(
            "Skeleton mesh '{}': {} batches, {} vertices, {} indices ({} texture / {} capacity flushes)",
            self.name,
            self.stats.batch_count,
            self.stats.vertex_count,
            self.stats.index_count,
            self.stats.texture_flushes,
            self.stats.capacity_flushes
        );
        &self.stats
    }
}

/// Append one attachment's geometry, finishing the current batch first if
/// the texture differs or the geometry does not fit
///
/// Returns the batch that received the geometry, or `None` when it is
/// larger than an empty batch can hold.
fn append_geometry(
    pool: &mut BatchPool,
    stats: &mut FrameStats,
    current: usize,
    texture: TextureHandle,
    vertices: &[f32],
    triangles: &[u16],
    z: f32,
) -> Option<usize> {
    let vertex_count = vertices.len() / SOURCE_VERTEX_SIZE;
    let batch = pool.batch_mut(current);
    if !batch.fits_capacity(vertex_count, triangles.len()) {
        return None;
    }

    let texture_changed = batch.texture().is_some_and(|bound| bound != texture);
    let full = !batch.is_empty() && !batch.can_batch(vertex_count, triangles.len());

    let mut current = current;
    if texture_changed || full {
        if texture_changed {
            stats.texture_flushes += 1;
        } else {
            stats.capacity_flushes += 1;
        }
        batch.end();
        current = pool.next_batch();
        pool.batch_mut(current).begin();
    }

    let batch = pool.batch_mut(current);
    if batch.texture().is_none() {
        batch.bind_texture(texture);
    }
    batch.batch(vertices, triangles, z);
    stats.attachments_batched += 1;
    Some(current)
}
