use super::*;
use crate::graphics::AlphaMode;

#[derive(Default)]
struct CountingBackend {
    rasterized: Vec<(u32, u32, f64)>,
}

impl GraphicsBackend for CountingBackend {
    fn render_display_list(
        &mut self,
        _json: &str,
        _dst: &mut [u8],
        _width: u32,
        _height: u32,
        _row_bytes: usize,
        _alpha_mode: AlphaMode,
    ) -> YuvcompResult<()> {
        Ok(())
    }

    fn render_rounded_rect_mask(
        &mut self,
        width: u32,
        height: u32,
        radius: f64,
    ) -> YuvcompResult<AlphaMask> {
        self.rasterized.push((width, height, radius));
        Ok(AlphaMask::new(width, height))
    }
}

fn key(width: u32, height: u32, radius: u32) -> MaskKey {
    MaskKey {
        width,
        height,
        radius,
    }
}

#[test]
fn repeated_lookup_returns_same_instance() {
    let mut backend = CountingBackend::default();
    let mut cache = MaskCache::new(DEFAULT_MASK_CACHE_CAPACITY);
    let a = cache.get_mask(key(64, 64, 8), &mut backend).unwrap();
    let b = cache.get_mask(key(64, 64, 8), &mut backend).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(backend.rasterized, vec![(64, 64, 8.0)]);
    assert_eq!(
        cache.stats(),
        MaskCacheStats {
            hits: 1,
            misses: 1,
            evictions: 0
        }
    );
}

#[test]
fn keys_are_exact_triples() {
    let mut backend = CountingBackend::default();
    let mut cache = MaskCache::new(DEFAULT_MASK_CACHE_CAPACITY);
    cache.get_mask(key(64, 64, 8), &mut backend).unwrap();
    cache.get_mask(key(64, 64, 9), &mut backend).unwrap();
    cache.get_mask(key(65, 64, 8), &mut backend).unwrap();
    assert_eq!(cache.len(), 3);
    assert_eq!(backend.rasterized.len(), 3);
}

#[test]
fn overflow_evicts_oldest_insertion_not_least_recently_used() {
    let mut backend = CountingBackend::default();
    let mut cache = MaskCache::new(DEFAULT_MASK_CACHE_CAPACITY);
    let first = key(1, 1, 0);
    let held = cache.get_mask(first, &mut backend).unwrap();
    for i in 2..=100 {
        cache.get_mask(key(i, 1, 0), &mut backend).unwrap();
    }
    assert_eq!(cache.len(), 100);

    // A hit on the oldest entry must not protect it.
    let again = cache.get_mask(first, &mut backend).unwrap();
    assert!(Arc::ptr_eq(&held, &again));

    cache.get_mask(key(101, 1, 0), &mut backend).unwrap();
    assert_eq!(cache.len(), 100);
    assert!(!cache.contains(first));
    assert!(cache.contains(key(2, 1, 0)));
    assert!(cache.contains(key(101, 1, 0)));
    assert_eq!(cache.stats().evictions, 1);

    // Evicted masks are regenerated on demand, not an error.
    let regenerated = cache.get_mask(first, &mut backend).unwrap();
    assert!(!Arc::ptr_eq(&held, &regenerated));
    assert!(!cache.contains(key(2, 1, 0)));
}

#[test]
fn zero_capacity_is_clamped() {
    let cache = MaskCache::new(0);
    assert_eq!(cache.capacity(), 1);
    assert!(cache.is_empty());
}
