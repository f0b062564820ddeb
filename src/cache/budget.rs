/*!
 * Memory Budget
 * How many bytes the content cache may still fill
 */

/// Source of the byte budget checked before rendering new content
pub trait MemoryBudget: Send + Sync {
    /// Bytes available given the bytes the cache already holds
    fn available(&self, cached_bytes: u64) -> u64;
}

/// Free physical memory as reported by the OS
///
/// Cached content is already resident, so `cached_bytes` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMemory;

impl SystemMemory {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl MemoryBudget for SystemMemory {
    fn available(&self, _cached_bytes: u64) -> u64 {
        use nix::unistd::{sysconf, SysconfVar};

        let pages = sysconf(SysconfVar::_AVPHYS_PAGES).ok().flatten();
        let page_size = sysconf(SysconfVar::PAGE_SIZE).ok().flatten();
        match (pages, page_size) {
            (Some(pages), Some(size)) if pages > 0 && size > 0 => (pages as u64).saturating_mul(size as u64),
            _ => {
                tracing::warn!("Free memory probe failed, reporting no free memory");
                0
            }
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
impl MemoryBudget for SystemMemory {
    fn available(&self, _cached_bytes: u64) -> u64 {
        u64::MAX
    }
}

/// Fixed number of bytes shared by all cached content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBudget {
    limit: u64,
}

impl FixedBudget {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl MemoryBudget for FixedBudget {
    fn available(&self, cached_bytes: u64) -> u64 {
        self.limit.saturating_sub(cached_bytes)
    }
}
