//! Page-aligned shared mappings based on memmap2
//!
//! 基于 memmap2 的页对齐共享映射

use super::error::{Error, Result};
use super::probe::{self, Verbosity};
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Largest logical size a mapping may have (63 bits)
///
/// 映射允许的最大逻辑大小（63 位）
pub const MAX_SIZE: u64 = (1 << 63) - 1;

const FALLBACK_PAGE_SIZE: usize = 4096;

/// Access mode of a mapping
///
/// 映射的访问模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MapMode {
    /// Readable and writable, the default
    ///
    /// 可读可写（默认）
    #[default]
    ReadWrite,

    /// Read only
    ///
    /// 只读
    ReadOnly,
}

impl MapMode {
    #[inline]
    pub fn is_read_only(self) -> bool {
        self == MapMode::ReadOnly
    }
}

/// OS memory page size, queried once
///
/// 操作系统内存页大小，仅查询一次
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

    *PAGE_SIZE.get_or_init(|| {
        // Safety: sysconf has no memory-safety preconditions
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 { size as usize } else { FALLBACK_PAGE_SIZE }
    })
}

/// Round `size` up to a whole number of pages
///
/// 将 `size` 向上取整到整页
#[inline]
pub(crate) fn round_up(size: u64) -> u64 {
    let page = page_size() as u64;
    size.div_ceil(page) * page
}

/// A live shared mapping, unmapped on drop
///
/// 一个活动的共享映射，drop 时解除映射
pub(crate) enum Mapping {
    ReadOnly(Mmap),
    ReadWrite(MmapMut),
}

impl Mapping {
    #[inline]
    pub(crate) fn mode(&self) -> MapMode {
        match self {
            Mapping::ReadOnly(_) => MapMode::ReadOnly,
            Mapping::ReadWrite(_) => MapMode::ReadWrite,
        }
    }

    /// Page-rounded extent of the mapping
    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Mapping::ReadOnly(mmap) => mmap.len(),
            Mapping::ReadWrite(mmap) => mmap.len(),
        }
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Mapping::ReadOnly(mmap) => &mmap[..],
            Mapping::ReadWrite(mmap) => &mmap[..],
        }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match self {
            Mapping::ReadOnly(_) => None,
            Mapping::ReadWrite(mmap) => Some(&mut mmap[..]),
        }
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        match self {
            Mapping::ReadOnly(_) => Ok(()),
            Mapping::ReadWrite(mmap) => mmap.flush(),
        }
    }
}

impl std::fmt::Debug for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapping")
            .field("mode", &self.mode())
            .field("len", &self.len())
            .finish()
    }
}

/// Map the current content of `path`
///
/// 映射 `path` 的当前内容
///
/// Returns the mapping together with the logical size it covers. The file
/// descriptor is closed before returning; the mapping stays valid without it.
///
/// 返回映射及其覆盖的逻辑大小。返回前会关闭文件描述符，映射在此之后仍然有效。
pub(crate) fn map(path: &Path, mode: MapMode) -> Result<(Mapping, u64)> {
    let size = probe::probe_with(path, Verbosity::Report)?.size;
    if size == 0 || size > MAX_SIZE {
        return Err(Error::SizeLimitExceeded { path: path.to_path_buf(), size });
    }

    let extent = usize::try_from(round_up(size))
        .map_err(|_| Error::SizeLimitExceeded { path: path.to_path_buf(), size })?;

    let file = OpenOptions::new()
        .read(true)
        .write(!mode.is_read_only())
        .open(path)
        .map_err(|source| Error::Open { path: path.to_path_buf(), source })?;

    let mut options = MmapOptions::new();
    options.len(extent);

    // Safety: the mapping is owned by a single FileMap and released before
    // it is dropped; concurrent truncation by others is the caller's concern
    let mapping = unsafe {
        match mode {
            MapMode::ReadOnly => options.map(&file).map(Mapping::ReadOnly),
            MapMode::ReadWrite => options.map_mut(&file).map(Mapping::ReadWrite),
        }
    }
    .map_err(|source| Error::Map { path: path.to_path_buf(), source })?;

    drop(file);

    debug!(path = %path.display(), size, extent, ?mode, "mapped");
    Ok((mapping, size))
}

/// Release a mapping
///
/// 释放映射
pub(crate) fn unmap(path: &Path, mapping: Mapping) {
    debug!(path = %path.display(), extent = mapping.len(), "unmapped");
    drop(mapping);
}
