/*!
 * Content Cache Tests
 * Memoization and oldest-first eviction under a fixed budget
 */

use bytes::Bytes;
use std::cell::RefCell;
use std::sync::Arc;

use nxfs::cache::ContentRenderer;
use nxfs::{
    ContentCache, FixedBudget, MemorySource, NxFs, NxfsResult, RuleDocument, TiffCodec, TypedArray,
};
use pretty_assertions::assert_eq;

/// Renders `"<path>:<n>"` padded to a fixed size and records every render
struct Recording {
    size: u64,
    rendered: RefCell<Vec<String>>,
}

impl Recording {
    fn new(size: u64) -> Self {
        Self {
            size,
            rendered: RefCell::new(Vec::new()),
        }
    }

    fn renders(&self) -> Vec<String> {
        self.rendered.borrow().clone()
    }
}

impl ContentRenderer for Recording {
    fn estimate(&self, _path: &str) -> NxfsResult<u64> {
        Ok(self.size)
    }

    fn render(&self, path: &str) -> NxfsResult<Bytes> {
        let mut rendered = self.rendered.borrow_mut();
        rendered.push(path.to_string());
        let mut content = format!("{}:{}", path, rendered.len()).into_bytes();
        content.resize(self.size as usize, b'.');
        Ok(Bytes::from(content))
    }
}

#[test]
fn test_second_read_does_not_render() {
    let cache = ContentCache::new(Arc::new(FixedBudget::new(1000)), 0);
    let renderer = Recording::new(16);

    let first = cache.get_or_render("/entry/data", &renderer).unwrap();
    let second = cache.get_or_render("/entry/data", &renderer).unwrap();

    assert_eq!(first, second);
    assert_eq!(renderer.renders(), vec!["/entry/data"]);
}

#[test]
fn test_eviction_is_insertion_ordered() {
    let cache = ContentCache::new(Arc::new(FixedBudget::new(100)), 0);
    let renderer = Recording::new(30);

    for path in ["/a", "/b", "/c"] {
        cache.get_or_render(path, &renderer).unwrap();
    }
    // Reading /a again does not refresh its position
    cache.get_or_render("/a", &renderer).unwrap();

    // 90 cached, 10 free: 20 short, so only /a goes
    cache.get_or_render("/d", &renderer).unwrap();
    assert_eq!(cache.paths(), vec!["/b", "/c", "/d"]);

    // /a must be rendered again
    cache.get_or_render("/a", &renderer).unwrap();
    assert_eq!(renderer.renders(), vec!["/a", "/b", "/c", "/d", "/a"]);
    assert_eq!(cache.paths(), vec!["/c", "/d", "/a"]);
    assert_eq!(cache.stats().evictions, 2);
}

#[test]
fn test_large_entry_evicts_several() {
    let cache = ContentCache::new(Arc::new(FixedBudget::new(100)), 0);
    let small = Recording::new(25);
    for path in ["/a", "/b", "/c", "/d"] {
        cache.get_or_render(path, &small).unwrap();
    }

    let large = Recording::new(60);
    cache.get_or_render("/big", &large).unwrap();
    assert_eq!(cache.paths(), vec!["/d", "/big"]);
    assert_eq!(cache.stats().cached_bytes, 85);
}

#[test]
fn test_slack_skips_small_deficits() {
    let cache = ContentCache::new(Arc::new(FixedBudget::new(100)), 50);
    let renderer = Recording::new(45);
    for path in ["/a", "/b", "/c"] {
        cache.get_or_render(path, &renderer).unwrap();
    }
    // Deficit of 35 at /c stays within the slack
    assert_eq!(cache.paths(), vec!["/a", "/b", "/c"]);
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn test_context_reads_are_cached() {
    let source = MemorySource::builder("cached")
        .field("/values", &[4], TypedArray::Int64(vec![-1, 0, 1, 2]))
        .build()
        .unwrap();
    let fs = NxFs::new(
        Box::new(source),
        &RuleDocument::empty(),
        ContentCache::new(Arc::new(FixedBudget::new(1 << 16)), 0),
        Arc::new(TiffCodec::new()),
    )
    .unwrap();

    let first = fs.read("/values").unwrap();
    let second = fs.read("/values").unwrap();
    assert_eq!(first, second);
    assert_eq!(&first[..], b"-1 0 1 2\n");

    let stats = fs.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}
