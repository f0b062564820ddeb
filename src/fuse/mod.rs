/*!
 * FUSE Adaptor
 * Read-only mount of an [`NxFs`] context through fuser
 */

mod inode;

pub use inode::{InodeTable, ROOT_INODE};

use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEntry, ReplyOpen, Request,
};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

use crate::core::limits::ATTR_TTL;
use crate::core::{NxfsError, NxfsResult};
use crate::fs::NxFs;
use crate::rules::FsObjectType;
use crate::tree::paths;

const FILE_PERM: u16 = 0o444;
const FOLDER_PERM: u16 = 0o555;

/// fuser filesystem serving one context
pub struct NxfsMount {
    fs: Arc<NxFs>,
    inodes: InodeTable,
    mounted_at: SystemTime,
    uid: u32,
    gid: u32,
}

impl NxfsMount {
    pub fn new(fs: Arc<NxFs>) -> Self {
        Self {
            fs,
            inodes: InodeTable::new(),
            mounted_at: SystemTime::now(),
            // SAFETY: getuid and getgid cannot fail
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
        }
    }

    fn attr(&self, inode: u64, path: &str) -> NxfsResult<FileAttr> {
        let (kind, perm, size) = match self.fs.get_attributes(path)? {
            FsObjectType::Folder => (FileType::Directory, FOLDER_PERM, 0),
            FsObjectType::File => (FileType::RegularFile, FILE_PERM, self.fs.content_size(path)?),
            FsObjectType::None => return Err(NxfsError::not_found(path)),
        };

        Ok(FileAttr {
            ino: inode,
            size,
            blocks: size.div_ceil(512),
            atime: self.mounted_at,
            mtime: self.mounted_at,
            ctime: self.mounted_at,
            crtime: self.mounted_at,
            kind,
            perm,
            nlink: if kind == FileType::Directory { 2 } else { 1 },
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: 512,
            flags: 0,
        })
    }

    fn path_of(&self, inode: u64) -> NxfsResult<String> {
        self.inodes
            .path(inode)
            .map(str::to_string)
            .ok_or_else(|| NxfsError::not_found(format!("inode {}", inode)))
    }
}

impl Filesystem for NxfsMount {
    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let (Ok(parent_path), Some(name)) = (self.path_of(parent), name.to_str()) else {
            reply.error(libc::ENOENT);
            return;
        };
        let path = paths::join(&parent_path, name);

        // Attributes first: the reload trigger must not allocate an inode
        if let Err(e) = self.fs.get_attributes(&path) {
            reply.error(e.errno());
            return;
        }
        let inode = self.inodes.assign(&path);
        match self.attr(inode, &path) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn getattr(&mut self, _req: &Request, ino: u64, reply: ReplyAttr) {
        match self.path_of(ino).and_then(|path| self.attr(ino, &path)) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let path = match self.path_of(ino) {
            Ok(path) => path,
            Err(e) => {
                reply.error(e.errno());
                return;
            }
        };
        let children = match self.fs.list_children(&path) {
            Ok(children) => children.to_vec(),
            Err(NxfsError::InvalidPath(_)) => {
                reply.error(libc::ENOTDIR);
                return;
            }
            Err(e) => {
                reply.error(e.errno());
                return;
            }
        };

        let parent_inode = paths::parent(&path)
            .and_then(|parent| self.inodes.inode(parent))
            .unwrap_or(ROOT_INODE);
        let mut entries = vec![
            (ino, FileType::Directory, ".".to_string()),
            (parent_inode, FileType::Directory, "..".to_string()),
        ];
        for name in children {
            let child_path = paths::join(&path, &name);
            let kind = match self.fs.get_attributes(&child_path) {
                Ok(FsObjectType::Folder) => FileType::Directory,
                Ok(FsObjectType::File) => FileType::RegularFile,
                _ => continue,
            };
            entries.push((self.inodes.assign(&child_path), kind, name));
        }

        for (i, (entry_ino, kind, name)) in entries.iter().enumerate().skip(offset.max(0) as usize) {
            if reply.add(*entry_ino, (i + 1) as i64, *kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        if flags & libc::O_ACCMODE != libc::O_RDONLY {
            reply.error(libc::EACCES);
            return;
        }
        match self.path_of(ino).and_then(|path| self.fs.get_attributes(&path)) {
            // Sizes are estimates, so reads must not be clipped at st_size
            Ok(FsObjectType::File) => reply.opened(0, fuser::consts::FOPEN_DIRECT_IO),
            Ok(_) => reply.error(libc::EISDIR),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock: Option<u64>,
        reply: ReplyData,
    ) {
        let result = self
            .path_of(ino)
            .and_then(|path| self.fs.read_range(&path, offset.max(0) as u64, size as usize));
        match result {
            Ok(data) => reply.data(&data),
            Err(e) => {
                warn!(inode = ino, error = %e, "Read failed");
                reply.error(e.errno());
            }
        }
    }
}

/// Mount `fs` read-only at `mountpoint`, blocking until unmounted
pub fn mount(fs: Arc<NxFs>, mountpoint: &Path) -> NxfsResult<()> {
    info!(mountpoint = %mountpoint.display(), nodes = fs.tree().len(), "Mounting");
    fuser::mount2(
        NxfsMount::new(fs),
        mountpoint,
        &[
            MountOption::FSName("nxfs".into()),
            MountOption::RO,
            MountOption::DefaultPermissions,
        ],
    )
    .map_err(NxfsError::from)
}
