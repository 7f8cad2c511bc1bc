//! Batch pool
//!
//! Batches are kept in an arena that only grows. Each frame the live cursor
//! goes back to zero and batches are handed out again in order, so steady
//! state frames reuse the same buffers without allocating.

use super::batch::{BatchCapacity, MeshBatch};

/// Arena of reusable batches with a live-count cursor
#[derive(Debug)]
pub struct BatchPool {
    batches: Vec<MeshBatch>,
    next_batch_index: usize,
    capacity: BatchCapacity,
    depth: f32,
}

impl BatchPool {
    /// Create an empty pool whose batches use `capacity`
    pub const fn new(capacity: BatchCapacity) -> Self {
        Self {
            batches: Vec::new(),
            next_batch_index: 0,
            capacity,
            depth: 0.0,
        }
    }

    /// Start a new frame: hide and clear every batch, rewind the cursor
    pub fn reset(&mut self) {
        for batch in &mut self.batches {
            batch.clear();
        }
        self.next_batch_index = 0;
    }

    /// Hand out the next batch, allocating one when the pool is exhausted
    ///
    /// Returns the batch index; the batch is marked visible.
    pub fn next_batch(&mut self) -> usize {
        if self.batches.len() == self.next_batch_index {
            let mut batch = MeshBatch::with_capacity(self.batches.len(), self.capacity);
            batch.set_depth(self.depth);
            self.batches.push(batch);
            log::info!(
                "Batch pool grew to {} batches ({} vertices each)",
                self.batches.len(),
                self.capacity.max_vertices()
            );
        }
        let index = self.next_batch_index;
        self.next_batch_index += 1;
        self.batches[index].set_visible(true);
        index
    }

    /// Mutable access to a batch handed out by `next_batch`
    pub fn batch_mut(&mut self, index: usize) -> &mut MeshBatch {
        &mut self.batches[index]
    }

    /// Batches handed out this frame
    pub fn live(&self) -> &[MeshBatch] {
        &self.batches[..self.next_batch_index]
    }

    /// Every pooled batch, including hidden ones
    pub fn all(&self) -> &[MeshBatch] {
        &self.batches
    }

    /// Number of batches handed out this frame
    pub const fn live_count(&self) -> usize {
        self.next_batch_index
    }

    /// Set the layer depth of every current and future batch
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
        for batch in &mut self.batches {
            batch.set_depth(depth);
        }
    }

    /// Release every batch
    pub fn dispose(&mut self) {
        self.batches.clear();
        self.next_batch_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_reuses_batches_across_frames() {
        let mut pool = BatchPool::new(BatchCapacity::default());
        assert_eq!(pool.next_batch(), 0);
        assert_eq!(pool.next_batch(), 1);
        assert_eq!(pool.all().len(), 2);

        pool.reset();
        assert_eq!(pool.live_count(), 0);
        assert!(pool.all().iter().all(|b| !b.is_visible()));

        assert_eq!(pool.next_batch(), 0);
        assert_eq!(pool.all().len(), 2);
        assert!(pool.all()[0].is_visible());
        assert!(!pool.all()[1].is_visible());
        assert_eq!(pool.live().len(), 1);
    }

    #[test]
    fn test_depth_applies_to_new_batches() {
        let mut pool = BatchPool::new(BatchCapacity::default());
        pool.next_batch();
        pool.set_depth(3.0);
        pool.next_batch();
        assert!(pool.all().iter().all(|b| b.depth() == 3.0));
    }

    #[test]
    fn test_dispose_empties_pool() {
        let mut pool = BatchPool::new(BatchCapacity::default());
        pool.next_batch();
        pool.dispose();
        assert!(pool.all().is_empty());
        assert_eq!(pool.next_batch(), 0);
    }
}
