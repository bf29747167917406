//! On-disk resizing of regular files
//!
//! 普通文件的磁盘大小调整

use super::error::{Error, Result};
use super::mapper::MAX_SIZE;
use super::probe::{self, Verbosity};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Size of each zero-fill write
///
/// 每次零填充写入的大小
pub const ZERO_FILL_CHUNK: usize = 1024 * 1024;

static ZEROS: [u8; ZERO_FILL_CHUNK] = [0; ZERO_FILL_CHUNK];

/// Outcome of a size change request
///
/// 调整大小请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeChange {
    /// Already at the target size, nothing was done
    ///
    /// 已是目标大小，未做任何操作
    Unchanged,

    /// The on-disk size was changed
    ///
    /// 磁盘大小已改变
    Changed,
}

/// Append `delta` zero bytes to `path`, creating it if absent
///
/// 向 `path` 末尾追加 `delta` 个零字节，文件不存在时创建
pub(crate) fn expand(path: &Path, delta: u64) -> Result<()> {
    let write_err = |source: io::Error| Error::Write { path: path.to_path_buf(), source };

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(write_err)?;

    let mut remaining = delta;
    while remaining > 0 {
        let len = remaining.min(ZERO_FILL_CHUNK as u64) as usize;
        file.write_all(&ZEROS[..len]).map_err(write_err)?;
        remaining -= len as u64;
    }

    debug!(path = %path.display(), delta, "expanded");
    Ok(())
}

/// Set the on-disk size of `path` to exactly `target`
///
/// 将 `path` 的磁盘大小设为 `target`
///
/// Growth is zero-filled, shrinking truncates. A missing path is created.
///
/// 增长部分以零填充，缩小则截断。路径不存在时会被创建。
pub(crate) fn set_size(path: &Path, target: u64) -> Result<SizeChange> {
    if target > MAX_SIZE {
        return Err(Error::SizeLimitExceeded { path: path.to_path_buf(), size: target });
    }

    match fs::metadata(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            expand(path, target)?;
            return Ok(SizeChange::Changed);
        }
        _ => {}
    }

    let current = probe::probe_with(path, Verbosity::Report)?.size;
    if current < target {
        expand(path, target - current)?;
    } else if current > target {
        truncate(path, target)?;
    } else {
        return Ok(SizeChange::Unchanged);
    }

    Ok(SizeChange::Changed)
}

fn truncate(path: &Path, target: u64) -> Result<()> {
    let truncate_err = |source: io::Error| Error::Truncate { path: path.to_path_buf(), source };

    OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|file| file.set_len(target))
        .map_err(truncate_err)?;

    debug!(path = %path.display(), target, "truncated");
    Ok(())
}
