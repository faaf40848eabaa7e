use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::buffer::alpha::AlphaMask;
use crate::foundation::error::YuvcompResult;
use crate::graphics::GraphicsBackend;

/// Default number of distinct masks retained.
pub const DEFAULT_MASK_CACHE_CAPACITY: usize = 100;

/// Exact mask identity: no merging of near-identical sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskKey {
    /// Mask width in pixels.
    pub width: u32,
    /// Mask height in pixels.
    pub height: u32,
    /// Corner radius in whole pixels.
    pub radius: u32,
}

/// Counters for cache behaviour.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaskCacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that rasterized a new mask.
    pub misses: u64,
    /// Entries dropped because the cache was full.
    pub evictions: u64,
}

/// Rounded-rectangle mask memo with insertion-ordered (FIFO) eviction.
///
/// A hit does not refresh an entry's position; the oldest insertion is always evicted first.
pub struct MaskCache {
    capacity: usize,
    masks: HashMap<MaskKey, Arc<AlphaMask>>,
    insertion_order: VecDeque<MaskKey>,
    stats: MaskCacheStats,
}

impl MaskCache {
    /// Create an empty cache holding at most `capacity` masks (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            masks: HashMap::new(),
            insertion_order: VecDeque::new(),
            stats: MaskCacheStats::default(),
        }
    }

    /// Maximum number of retained masks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained masks.
    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    /// Return `true` when no masks are retained.
    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }

    /// Cache counters.
    pub fn stats(&self) -> MaskCacheStats {
        self.stats
    }

    /// Return `true` when `key` is currently retained.
    pub fn contains(&self, key: MaskKey) -> bool {
        self.masks.contains_key(&key)
    }

    /// Fetch the mask for `key`, rasterizing it through `backend` on a miss.
    pub fn get_mask(
        &mut self,
        key: MaskKey,
        backend: &mut dyn GraphicsBackend,
    ) -> YuvcompResult<Arc<AlphaMask>> {
        if let Some(mask) = self.masks.get(&key) {
            self.stats.hits += 1;
            return Ok(Arc::clone(mask));
        }

        tracing::debug!(?key, "rasterizing rounded-rect mask");
        let mask = Arc::new(backend.render_rounded_rect_mask(
            key.width,
            key.height,
            f64::from(key.radius),
        )?);
        self.stats.misses += 1;
        self.masks.insert(key, Arc::clone(&mask));
        self.insertion_order.push_back(key);

        if self.insertion_order.len() > self.capacity {
            tracing::warn!(
                capacity = self.capacity,
                "mask cache is full; capacity is likely too small for this workload"
            );
            while self.insertion_order.len() > self.capacity {
                if let Some(old) = self.insertion_order.pop_front() {
                    self.masks.remove(&old);
                    self.stats.evictions += 1;
                }
            }
        }
        Ok(mask)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/mask_cache.rs"]
mod tests;
