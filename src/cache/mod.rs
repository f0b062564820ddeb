/*!
 * Content Cache
 * Rendered content per virtual path under a memory budget
 *
 * Entries are evicted oldest-inserted first when a new render is estimated
 * not to fit. Reads never refresh an entry's position.
 */

mod budget;

pub use budget::{FixedBudget, MemoryBudget, SystemMemory};

use ahash::RandomState;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::config::CacheConfig;
use crate::core::NxfsResult;

/// Produces content for cache misses
pub trait ContentRenderer {
    /// Size estimate used for the budget check
    fn estimate(&self, path: &str) -> NxfsResult<u64>;

    /// Full content of `path`
    fn render(&self, path: &str) -> NxfsResult<Bytes>;
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Bytes, RandomState>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
    cached_bytes: u64,
}

/// Memoized rendered content keyed by full virtual path
pub struct ContentCache {
    state: Mutex<CacheState>,
    budget: Arc<dyn MemoryBudget>,
    slack: u64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ContentCache {
    pub fn new(budget: Arc<dyn MemoryBudget>, slack: u64) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            budget,
            slack,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Budget from settings: fixed when a limit is configured, free system memory otherwise
    pub fn from_config(config: &CacheConfig) -> Self {
        let budget: Arc<dyn MemoryBudget> = match config.memory_limit {
            Some(limit) => Arc::new(FixedBudget::new(limit)),
            None => Arc::new(SystemMemory::new()),
        };
        Self::new(budget, config.eviction_slack)
    }

    /// Cached content of `path`, rendering and storing it on a miss
    ///
    /// The cache lock is held across the check, any eviction, the render and
    /// the insert, so one path is never rendered twice concurrently.
    pub fn get_or_render<R>(&self, path: &str, renderer: &R) -> NxfsResult<Bytes>
    where
        R: ContentRenderer + ?Sized,
    {
        let mut state = self.state.lock();

        if let Some(content) = state.entries.get(path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(content.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let needed = renderer.estimate(path)?;
        let available = self.budget.available(state.cached_bytes);
        if needed >= available {
            self.evict(&mut state, needed - available);
        }

        let content = renderer.render(path)?;
        state.cached_bytes += content.len() as u64;
        state.order.push_back(path.to_string());
        state.entries.insert(path.to_string(), content.clone());
        Ok(content)
    }

    /// Drop oldest entries until the deficit is within the slack
    fn evict(&self, state: &mut CacheState, mut deficit: u64) {
        while deficit > self.slack {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            if let Some(content) = state.entries.remove(&oldest) {
                let freed = content.len() as u64;
                state.cached_bytes -= freed;
                deficit = deficit.saturating_sub(freed);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(path = %oldest, freed, remaining_deficit = deficit, "Evicted cached content");
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.lock().entries.contains_key(path)
    }

    /// Cached paths, oldest first
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().order.iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
        state.cached_bytes = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: state.entries.len(),
            cached_bytes: state.cached_bytes,
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate,
        }
    }
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("slack", &self.slack)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub cached_bytes: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}
