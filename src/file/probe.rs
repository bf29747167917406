//! Size and kind discovery
//!
//! 大小与类型探测
//!
//! Regular files report their byte length, block devices report their
//! capacity. Everything else is rejected.
//!
//! 普通文件返回字节长度，块设备返回容量，其他类型一律拒绝。

use super::error::{Error, Result};
use std::fs::{self, File, Metadata};
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Kind of a mappable target
///
/// 可映射目标的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileKind {
    /// Regular file, resizable
    ///
    /// 普通文件，可调整大小
    Regular,

    /// Block device, fixed capacity
    ///
    /// 块设备，容量固定
    BlockDevice,
}

/// Result of a size probe
///
/// 大小探测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub kind: FileKind,
    pub size: u64,
}

/// Whether probe failures are reported
///
/// 探测失败时是否输出诊断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Verbosity {
    #[default]
    Report,
    Quiet,
}

impl Verbosity {
    fn report(self, err: &Error) {
        match self {
            Verbosity::Report => warn!(path = %err.path().display(), error = %err, "probe failed"),
            Verbosity::Quiet => trace!(path = %err.path().display(), error = %err, "quiet probe failed"),
        }
    }
}

/// Probe the kind and current size of `path`
///
/// 探测 `path` 的类型与当前大小
///
/// One level of symbolic link is resolved before the type is inspected.
///
/// 检查类型前会解析一层符号链接。
///
/// # Errors
/// - `Stat` if the path or its link target cannot be queried
/// - `UnsupportedType` if the target is not a regular file or block device
/// - `DeviceSize` if a block device's capacity cannot be read
///
/// # Errors
/// - 路径或链接目标无法查询时返回 `Stat`
/// - 目标不是普通文件或块设备时返回 `UnsupportedType`
/// - 无法读取块设备容量时返回 `DeviceSize`
///
/// # Examples
///
/// ```
/// # use file_map::{probe, FileKind};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let dir = tempfile::tempdir()?;
/// # let path = dir.path().join("probe.bin");
/// std::fs::write(&path, b"hello")?;
/// let info = probe(&path)?;
/// assert_eq!(info.kind, FileKind::Regular);
/// assert_eq!(info.size, 5);
/// # Ok(())
/// # }
/// ```
pub fn probe(path: impl AsRef<Path>) -> Result<FileInfo> {
    probe_with(path.as_ref(), Verbosity::Report)
}

pub(crate) fn probe_with(path: &Path, verbosity: Verbosity) -> Result<FileInfo> {
    let result = resolve(path).and_then(|(target, kind, meta)| {
        let size = match kind {
            FileKind::Regular => meta.len(),
            FileKind::BlockDevice => device_size(&target)?,
        };
        Ok(FileInfo { kind, size })
    });

    if let Err(err) = &result {
        verbosity.report(err);
    }
    result
}

/// Kind of `path` without querying the size
///
/// 仅查询 `path` 的类型，不查询大小
pub(crate) fn kind_with(path: &Path, verbosity: Verbosity) -> Result<FileKind> {
    let result = resolve(path).map(|(_, kind, _)| kind);
    if let Err(err) = &result {
        verbosity.report(err);
    }
    result
}

fn resolve(path: &Path) -> Result<(PathBuf, FileKind, Metadata)> {
    let (target, meta) = follow_link(path)?;

    let file_type = meta.file_type();
    let kind = if file_type.is_file() {
        FileKind::Regular
    } else if file_type.is_block_device() {
        FileKind::BlockDevice
    } else {
        return Err(Error::UnsupportedType { path: path.to_path_buf() });
    };

    Ok((target, kind, meta))
}

fn follow_link(path: &Path) -> Result<(PathBuf, Metadata)> {
    let stat_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| Error::Stat { path, source }
    };

    let meta = fs::symlink_metadata(path).map_err(stat_err(path))?;
    if !meta.file_type().is_symlink() {
        return Ok((path.to_path_buf(), meta));
    }

    let link = fs::read_link(path).map_err(stat_err(path))?;
    let target = match path.parent() {
        Some(parent) if link.is_relative() => parent.join(link),
        _ => link,
    };

    let meta = fs::metadata(&target).map_err(stat_err(&target))?;
    Ok((target, meta))
}

fn device_size(path: &Path) -> Result<u64> {
    let device_err = |source: io::Error| Error::DeviceSize { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(device_err)?;
    device_capacity(&file).map_err(device_err)
}

// `_IOR(0x12, 114, size_t)` from `<linux/fs.h>`; the kernel writes a u64
#[cfg(target_os = "linux")]
nix::ioctl_read_bad!(
    blkgetsize64,
    nix::request_code_read!(0x12, 114, std::mem::size_of::<libc::size_t>()),
    u64
);

#[cfg(target_os = "linux")]
fn device_capacity(file: &File) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    let mut size: u64 = 0;
    // Safety: the descriptor is open for the duration of the call
    unsafe { blkgetsize64(file.as_raw_fd(), &mut size) }?;
    Ok(size)
}

#[cfg(not(target_os = "linux"))]
fn device_capacity(mut file: &File) -> io::Result<u64> {
    use std::io::{Seek, SeekFrom};

    file.seek(SeekFrom::End(0))
}
