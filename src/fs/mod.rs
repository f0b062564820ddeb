/*!
 * Virtual Filesystem
 * Shared context answering attribute, listing and read calls
 *
 * The tree is built once and never mutated afterwards. The source is guarded
 * by a single lock; content reads take the cache lock first, then the source
 * lock, and nothing takes them in the opposite order.
 */

mod builder;
mod resolver;

pub use builder::TreeBuilder;
pub use resolver::{Resolution, RuleResolver};

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};

use crate::cache::{CacheStats, ContentCache, ContentRenderer};
use crate::codec::{ImageCodec, TiffCodec};
use crate::config::{NxfsConfig, RuleDocument};
use crate::core::limits::RELOAD_TRIGGER;
use crate::core::{NxfsError, NxfsResult};
use crate::monitoring::span_operation;
use crate::rules::FsObjectType;
use crate::source::SourceContainer;
use crate::tree::{paths, VirtualNode, VirtualTree};

/// Filesystem context owned by the mount adaptor
pub struct NxFs {
    tree: VirtualTree,
    source: Mutex<Box<dyn SourceContainer>>,
    cache: ContentCache,
    codec: Arc<dyn ImageCodec>,
}

impl NxFs {
    /// Open `source` if needed and build the tree from `document`
    pub fn new(
        mut source: Box<dyn SourceContainer>,
        document: &RuleDocument,
        cache: ContentCache,
        codec: Arc<dyn ImageCodec>,
    ) -> NxfsResult<Self> {
        if !source.is_open() {
            source.open()?;
        }
        let tree = TreeBuilder::new(source.as_ref(), document).build()?;

        Ok(Self {
            tree,
            source: Mutex::new(source),
            cache,
            codec,
        })
    }

    /// Cache budget from `config`, TIFF output for images
    pub fn from_config(
        config: &NxfsConfig,
        source: Box<dyn SourceContainer>,
        document: &RuleDocument,
    ) -> NxfsResult<Self> {
        Self::new(
            source,
            document,
            ContentCache::from_config(&config.cache),
            Arc::new(TiffCodec::new()),
        )
    }

    /// Classification of `path`
    ///
    /// A path ending in the reload trigger reopens the source and then reports
    /// not found. Nodes classified as neither file nor folder are hidden.
    pub fn get_attributes(&self, path: &str) -> NxfsResult<FsObjectType> {
        let span = span_operation("getattr", path);

        let result = match self.tree.find(path) {
            Ok(node) => match node.object_type() {
                FsObjectType::None => Err(NxfsError::not_found(path)),
                object_type => Ok(object_type),
            },
            Err(e) => {
                if paths::file_name(path) == RELOAD_TRIGGER {
                    if let Err(reload) = self.rebuild() {
                        error!(path = %path, error = %reload, "Source reload failed");
                    }
                }
                Err(e)
            }
        };
        span.finish(result)
    }

    /// Full content of the file at `path`
    pub fn read(&self, path: &str) -> NxfsResult<Bytes> {
        let span = span_operation("read", path);
        let result = self.readable(path).and_then(|_| {
            self.cache.get_or_render(
                path,
                &SourceRenderer {
                    tree: &self.tree,
                    source: &self.source,
                    codec: self.codec.as_ref(),
                },
            )
        });
        if let Ok(content) = &result {
            span.record_bytes(content.len());
        }
        span.finish(result)
    }

    /// Up to `len` bytes of the content of `path` starting at `offset`
    ///
    /// Reading past the end yields an empty buffer.
    pub fn read_range(&self, path: &str, offset: u64, len: usize) -> NxfsResult<Bytes> {
        let content = self.read(path)?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(content.len());
        let end = start.saturating_add(len).min(content.len());
        Ok(content.slice(start..end))
    }

    /// Child names of the folder at `path`, in insertion order
    pub fn list_children(&self, path: &str) -> NxfsResult<&[String]> {
        let span = span_operation("readdir", path);
        let result = self.tree.find(path).and_then(|node| match node.object_type() {
            FsObjectType::Folder => Ok(node.children.as_slice()),
            FsObjectType::File => Err(NxfsError::InvalidPath(format!("{} is not a folder", path))),
            FsObjectType::None => Err(NxfsError::not_found(path)),
        });
        span.finish(result)
    }

    /// Content length reported before the content is rendered
    pub fn content_size(&self, path: &str) -> NxfsResult<u64> {
        let span = span_operation("size", path);
        span.finish(self.tree.find(path).map(|node| node.estimated_size))
    }

    /// Close and reopen the source
    ///
    /// Holds the source lock throughout, so concurrent renders wait for the
    /// reopened source. The tree and cached content are kept.
    pub fn rebuild(&self) -> NxfsResult<()> {
        let span = span_operation("rebuild", paths::ROOT);
        let mut source = self.source.lock();
        source.close();
        span.finish(source.open())?;
        info!(source = %source.name(), "Source reopened");
        Ok(())
    }

    pub fn tree(&self) -> &VirtualTree {
        &self.tree
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn readable(&self, path: &str) -> NxfsResult<&VirtualNode> {
        let node = self.tree.find(path)?;
        match node.object_type() {
            FsObjectType::File => Ok(node),
            FsObjectType::Folder => Err(NxfsError::NotAFile(path.to_string())),
            FsObjectType::None => Err(NxfsError::not_found(path)),
        }
    }
}

impl std::fmt::Debug for NxFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NxFs")
            .field("nodes", &self.tree.len())
            .field("codec", &self.codec.format_name())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Renders virtual nodes from the locked source for cache misses
struct SourceRenderer<'a> {
    tree: &'a VirtualTree,
    source: &'a Mutex<Box<dyn SourceContainer>>,
    codec: &'a dyn ImageCodec,
}

impl ContentRenderer for SourceRenderer<'_> {
    fn estimate(&self, path: &str) -> NxfsResult<u64> {
        Ok(self.tree.find(path)?.estimated_size)
    }

    fn render(&self, path: &str) -> NxfsResult<Bytes> {
        let node = self.tree.find(path)?;
        let rule = node
            .rule
            .as_ref()
            .ok_or_else(|| NxfsError::not_found(path))?;

        let source = self.source.lock();
        let source_node = source.node(&node.source_ref)?;
        rule.render(source.as_ref(), &source_node, self.codec)
    }
}
