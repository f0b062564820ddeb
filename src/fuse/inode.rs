/*!
 * Inode Table
 * Stable inode numbers for virtual paths handed to the kernel
 */

use ahash::RandomState;
use std::collections::HashMap;

use crate::tree::paths;

/// Inode of the mount root
pub const ROOT_INODE: u64 = 1;

/// Bidirectional inode/path mapping; inodes are assigned on first lookup
#[derive(Debug)]
pub struct InodeTable {
    paths: HashMap<u64, String, RandomState>,
    inodes: HashMap<String, u64, RandomState>,
    next: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    pub fn new() -> Self {
        let mut table = Self {
            paths: HashMap::with_hasher(RandomState::new()),
            inodes: HashMap::with_hasher(RandomState::new()),
            next: ROOT_INODE + 1,
        };
        table.paths.insert(ROOT_INODE, paths::ROOT.to_string());
        table.inodes.insert(paths::ROOT.to_string(), ROOT_INODE);
        table
    }

    /// Inode for `path`, allocating one if the path is new
    pub fn assign(&mut self, path: &str) -> u64 {
        if let Some(&inode) = self.inodes.get(path) {
            return inode;
        }
        let inode = self.next;
        self.next += 1;
        self.paths.insert(inode, path.to_string());
        self.inodes.insert(path.to_string(), inode);
        inode
    }

    pub fn inode(&self, path: &str) -> Option<u64> {
        self.inodes.get(path).copied()
    }

    pub fn path(&self, inode: u64) -> Option<&str> {
        self.paths.get(&inode).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
