//! Resizable memory-mapped file
//!
//! 可调整大小的内存映射文件

use super::error::{Error, Result};
use super::mapper::{self, MAX_SIZE, MapMode, Mapping};
use super::probe::{self, FileKind, Verbosity};
use super::resize::{self, SizeChange};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

enum State {
    Unmapped,
    Mapped(Mapping),
    Closed,
}

/// Memory-mapped regular file or block device
///
/// 内存映射的普通文件或块设备
///
/// Owns at most one shared mapping of its path. Whenever the on-disk size
/// changes through this instance, a live mapping is torn down and recreated
/// before the call returns, so the exposed buffer always covers exactly
/// [`size`](FileMap::size) bytes.
///
/// 最多持有其路径的一个共享映射。通过该实例改变磁盘大小时，
/// 活动映射会在调用返回前被解除并重建，因此暴露的缓冲区始终恰好覆盖
/// [`size`](FileMap::size) 字节。
///
/// # Lifecycle
///
/// 1. [`new`](FileMap::new) binds the path, no I/O
/// 2. [`set_size`](FileMap::set_size) / [`expand`](FileMap::expand) resize regular files
/// 3. [`open`](FileMap::open) / [`open_with`](FileMap::open_with) map the content
/// 4. [`close`](FileMap::close) (or drop) releases the mapping
///
/// # 生命周期
///
/// 1. [`new`](FileMap::new) 绑定路径，不做 I/O
/// 2. [`set_size`](FileMap::set_size) / [`expand`](FileMap::expand) 调整普通文件大小
/// 3. [`open`](FileMap::open) / [`open_with`](FileMap::open_with) 映射内容
/// 4. [`close`](FileMap::close)（或 drop）释放映射
///
/// # Examples
///
/// ```
/// # use file_map::{FileMap, MapMode};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let dir = tempfile::tempdir()?;
/// # let path = dir.path().join("test.dat");
/// let mut fm = FileMap::new(&path);
/// fm.set_size(1024 * 1024)?;
/// fm.open()?;
///
/// let buf = fm.as_mut_slice().unwrap();
/// buf[..13].copy_from_slice(b"Hello, world\n");
/// fm.close();
///
/// let mut fm = FileMap::new(&path);
/// fm.open_with(MapMode::ReadOnly)?;
/// assert_eq!(&fm.as_slice().unwrap()[..5], b"Hello");
/// # Ok(())
/// # }
/// ```
pub struct FileMap {
    path: PathBuf,
    state: State,
    size: u64,
    mode: MapMode,

    /// Number of successful mappings so far
    ///
    /// 成功映射的次数
    pub(crate) generation: u64,
}

impl FileMap {
    /// Bind `path` without touching the filesystem
    ///
    /// 绑定 `path`，不访问文件系统
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: State::Unmapped,
            size: 0,
            mode: MapMode::default(),
            generation: 0,
        }
    }

    /// Set the on-disk size of a regular file to exactly `target` bytes
    ///
    /// 将普通文件的磁盘大小设置为 `target` 字节
    ///
    /// Missing files are created and zero-filled. If the size changes while
    /// mapped, the mapping is recreated with the same access mode.
    ///
    /// 文件不存在时会被创建并以零填充。映射期间大小改变时，
    /// 会以相同的访问模式重建映射。
    ///
    /// # Errors
    /// - `ResizeUnsupported` if the path is a block device
    /// - `SizeLimitExceeded` if `target` exceeds 63 bits
    /// - `Write` / `Truncate` if the resize itself fails
    /// - any [`open`](FileMap::open) error if the remap fails, leaving the
    ///   instance unmapped
    ///
    /// # Errors
    /// - 路径为块设备时返回 `ResizeUnsupported`
    /// - `target` 超出 63 位时返回 `SizeLimitExceeded`
    /// - 调整大小失败时返回 `Write` / `Truncate`
    /// - 重新映射失败时返回相应错误，实例保持未映射状态
    pub fn set_size(&mut self, target: u64) -> Result<SizeChange> {
        self.ensure_open()?;
        self.ensure_resizable()?;

        let change = resize::set_size(&self.path, target)?;
        match change {
            SizeChange::Changed => self.after_resize(target)?,
            SizeChange::Unchanged if !self.is_mapped() => self.size = target,
            SizeChange::Unchanged => {}
        }
        Ok(change)
    }

    /// Grow a regular file by `extra` zero bytes
    ///
    /// 将普通文件增长 `extra` 个零字节
    pub fn expand(&mut self, extra: u64) -> Result<()> {
        self.ensure_open()?;
        self.ensure_resizable()?;

        let current = match fs::metadata(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => 0,
            _ => probe::probe_with(&self.path, Verbosity::Report)?.size,
        };
        let target = match current.checked_add(extra) {
            Some(target) if target <= MAX_SIZE => target,
            _ => {
                return Err(Error::SizeLimitExceeded {
                    path: self.path.clone(),
                    size: current.saturating_add(extra),
                });
            }
        };

        if extra == 0 {
            return Ok(());
        }

        resize::expand(&self.path, extra)?;
        self.after_resize(target)
    }

    /// Map read-write
    ///
    /// 以读写模式映射
    ///
    /// Shorthand for `open_with(MapMode::ReadWrite)`.
    #[inline]
    pub fn open(&mut self) -> Result<()> {
        self.open_with(MapMode::default())
    }

    /// Map the file with the given access mode
    ///
    /// 以指定访问模式映射文件
    ///
    /// - Already mapped with `mode`: nothing happens
    /// - Mapped with the other mode: the old mapping is released first
    /// - Missing path: created as one page of zeros, then mapped
    ///
    /// - 已以 `mode` 映射：不做任何操作
    /// - 以另一模式映射：先释放旧映射
    /// - 路径不存在：创建一页零字节后映射
    ///
    /// # Errors
    /// - `Stat` / `UnsupportedType` / `DeviceSize` from probing the path
    /// - `SizeLimitExceeded` if the current size is 0 or too large
    /// - `Open` if the path cannot be opened in `mode`
    /// - `Map` if the mapping call fails
    ///
    /// # Errors
    /// - 探测路径时的 `Stat` / `UnsupportedType` / `DeviceSize`
    /// - 当前大小为 0 或过大时返回 `SizeLimitExceeded`
    /// - 无法以 `mode` 打开路径时返回 `Open`
    /// - 映射调用失败时返回 `Map`
    pub fn open_with(&mut self, mode: MapMode) -> Result<()> {
        self.ensure_open()?;

        match std::mem::replace(&mut self.state, State::Unmapped) {
            State::Mapped(mapping) if mapping.mode() == mode => {
                self.state = State::Mapped(mapping);
                return Ok(());
            }
            State::Mapped(mapping) => mapper::unmap(&self.path, mapping),
            _ => {}
        }

        match fs::metadata(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                resize::expand(&self.path, mapper::page_size() as u64)?;
            }
            _ => {}
        }

        self.map(mode)
    }

    /// Release the mapping
    ///
    /// 释放映射
    ///
    /// The instance is unusable afterwards. Calling this more than once is fine.
    ///
    /// 此后实例不可再用。多次调用是安全的。
    pub fn close(&mut self) {
        if let State::Mapped(mapping) = std::mem::replace(&mut self.state, State::Closed) {
            mapper::unmap(&self.path, mapping);
        }
    }

    /// Flush a read-write mapping to disk synchronously
    ///
    /// 同步刷新读写映射到磁盘
    ///
    /// No-op when unmapped or read-only.
    ///
    /// 未映射或只读时不做任何操作。
    pub fn flush(&self) -> Result<()> {
        match &self.state {
            State::Mapped(mapping) => mapping
                .flush()
                .map_err(|source| Error::Write { path: self.path.clone(), source }),
            _ => Ok(()),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logical size in bytes, as of the last probe or mapping
    ///
    /// 逻辑大小（字节），以最近一次探测或映射为准
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Access mode recorded at the last successful mapping
    ///
    /// 最近一次成功映射时记录的访问模式
    #[inline]
    pub fn mode(&self) -> MapMode {
        self.mode
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        matches!(self.state, State::Mapped(_))
    }

    /// Page-rounded length of the live mapping
    ///
    /// 活动映射按页取整后的长度
    #[inline]
    pub fn extent(&self) -> Option<usize> {
        match &self.state {
            State::Mapped(mapping) => Some(mapping.len()),
            _ => None,
        }
    }

    /// The mapped bytes, exactly [`size`](FileMap::size) long
    ///
    /// 已映射的字节，长度恰好为 [`size`](FileMap::size)
    #[inline]
    pub fn as_slice(&self) -> Option<&[u8]> {
        match &self.state {
            State::Mapped(mapping) => Some(&mapping.as_slice()[..self.size as usize]),
            _ => None,
        }
    }

    /// Mutable mapped bytes; `None` unless mapped read-write
    ///
    /// 可变的已映射字节；仅在读写映射时返回 `Some`
    #[inline]
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        let size = self.size as usize;
        match &mut self.state {
            State::Mapped(mapping) => mapping.as_mut_slice().map(|buf| &mut buf[..size]),
            _ => None,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            State::Closed => Err(Error::Closed { path: self.path.clone() }),
            _ => Ok(()),
        }
    }

    /// Reject block devices before any size arithmetic
    fn ensure_resizable(&self) -> Result<()> {
        match probe::kind_with(&self.path, Verbosity::Quiet) {
            Ok(FileKind::BlockDevice) => {
                warn!(path = %self.path.display(), "can not change size of block device");
                Err(Error::ResizeUnsupported { path: self.path.clone() })
            }
            _ => Ok(()),
        }
    }

    fn after_resize(&mut self, new_size: u64) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Unmapped) {
            State::Mapped(mapping) => {
                let mode = mapping.mode();
                mapper::unmap(&self.path, mapping);
                // stays accurate if the remap fails
                self.size = new_size;
                self.map(mode)
            }
            other => {
                self.state = other;
                self.size = new_size;
                Ok(())
            }
        }
    }

    fn map(&mut self, mode: MapMode) -> Result<()> {
        let (mapping, size) = mapper::map(&self.path, mode)?;
        self.size = size;
        self.mode = mode;
        self.generation += 1;
        self.state = State::Mapped(mapping);

        debug!(path = %self.path.display(), generation = self.generation, "file map ready");
        Ok(())
    }
}

impl Drop for FileMap {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FileMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mapping = match &self.state {
            State::Unmapped => "unmapped",
            State::Mapped(_) => "mapped",
            State::Closed => "closed",
        };
        f.debug_struct("FileMap")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("mode", &self.mode)
            .field("state", &mapping)
            .field("generation", &self.generation)
            .finish()
    }
}
