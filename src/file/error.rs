//! Error types for file-map
//!
//! file-map 的错误类型

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for file-map operations
///
/// file-map 操作的错误类型
///
/// Every variant backed by a failed system call keeps the original
/// [`io::Error`], so the OS error code stays available through
/// [`Error::raw_os_error`].
///
/// 所有由系统调用失败引起的变体都保留原始 [`io::Error`]，
/// 可以通过 [`Error::raw_os_error`] 获取操作系统错误码。
#[derive(Debug)]
pub enum Error {
    /// The path (or the target of its symbolic link) cannot be queried
    ///
    /// 路径（或其符号链接目标）无法查询
    Stat { path: PathBuf, source: io::Error },

    /// The path is neither a regular file nor a block device
    ///
    /// 路径既不是普通文件也不是块设备
    UnsupportedType { path: PathBuf },

    /// The capacity of a block device cannot be queried
    ///
    /// 无法查询块设备容量
    DeviceSize { path: PathBuf, source: io::Error },

    /// Block devices have a fixed size
    ///
    /// 块设备大小固定，无法调整
    ResizeUnsupported { path: PathBuf },

    /// Zero-fill extension failed
    ///
    /// 零填充扩展失败
    Write { path: PathBuf, source: io::Error },

    /// Truncation failed
    ///
    /// 截断失败
    Truncate { path: PathBuf, source: io::Error },

    /// The path cannot be opened for mapping
    ///
    /// 无法打开路径进行映射
    Open { path: PathBuf, source: io::Error },

    /// The mapping call itself failed
    ///
    /// 映射调用失败
    Map { path: PathBuf, source: io::Error },

    /// Size is zero or exceeds the representable limit
    ///
    /// 大小为零或超出可表示范围
    SizeLimitExceeded { path: PathBuf, size: u64 },

    /// The instance has been closed
    ///
    /// 实例已关闭
    Closed { path: PathBuf },
}

/// Field-less discriminant of [`Error`]
///
/// [`Error`] 的无字段判别类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Stat,
    UnsupportedType,
    DeviceSize,
    ResizeUnsupported,
    Write,
    Truncate,
    Open,
    Map,
    SizeLimitExceeded,
    Closed,
}

impl Error {
    /// Get the kind of this error
    ///
    /// 获取错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Stat { .. } => ErrorKind::Stat,
            Error::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Error::DeviceSize { .. } => ErrorKind::DeviceSize,
            Error::ResizeUnsupported { .. } => ErrorKind::ResizeUnsupported,
            Error::Write { .. } => ErrorKind::Write,
            Error::Truncate { .. } => ErrorKind::Truncate,
            Error::Open { .. } => ErrorKind::Open,
            Error::Map { .. } => ErrorKind::Map,
            Error::SizeLimitExceeded { .. } => ErrorKind::SizeLimitExceeded,
            Error::Closed { .. } => ErrorKind::Closed,
        }
    }

    /// Path the failed operation was working on
    ///
    /// 失败操作所针对的路径
    pub fn path(&self) -> &Path {
        match self {
            Error::Stat { path, .. }
            | Error::UnsupportedType { path }
            | Error::DeviceSize { path, .. }
            | Error::ResizeUnsupported { path }
            | Error::Write { path, .. }
            | Error::Truncate { path, .. }
            | Error::Open { path, .. }
            | Error::Map { path, .. }
            | Error::SizeLimitExceeded { path, .. }
            | Error::Closed { path } => path,
        }
    }

    /// Operating-system error code, if the failure came from a system call
    ///
    /// 操作系统错误码（如果失败来自系统调用）
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_error().and_then(io::Error::raw_os_error)
    }

    fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::Stat { source, .. }
            | Error::DeviceSize { source, .. }
            | Error::Write { source, .. }
            | Error::Truncate { source, .. }
            | Error::Open { source, .. }
            | Error::Map { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Stat { path, source } => {
                write!(f, "stat {} error: {}", path.display(), source)
            }
            Error::UnsupportedType { path } => {
                write!(f, "{} is not a regular file or block device", path.display())
            }
            Error::DeviceSize { path, source } => {
                write!(f, "get size of {} error: {}", path.display(), source)
            }
            Error::ResizeUnsupported { path } => {
                write!(f, "can not change size of block device {}", path.display())
            }
            Error::Write { path, source } => {
                write!(f, "write {} error: {}", path.display(), source)
            }
            Error::Truncate { path, source } => {
                write!(f, "truncate {} error: {}", path.display(), source)
            }
            Error::Open { path, source } => {
                write!(f, "open {} error: {}", path.display(), source)
            }
            Error::Map { path, source } => {
                write!(f, "map {} error: {}", path.display(), source)
            }
            Error::SizeLimitExceeded { path, size } => {
                write!(f, "error size of {}: {}", path.display(), size)
            }
            Error::Closed { path } => write!(f, "{} has been closed", path.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.io_error().map(|err| err as _)
    }
}

/// Convert from Error to io::Error for compatibility
///
/// 从 Error 转换到 io::Error 以保持兼容性
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::Stat { source, .. }
            | Error::DeviceSize { source, .. }
            | Error::Write { source, .. }
            | Error::Truncate { source, .. }
            | Error::Open { source, .. }
            | Error::Map { source, .. } => source.kind(),
            Error::UnsupportedType { .. }
            | Error::ResizeUnsupported { .. }
            | Error::SizeLimitExceeded { .. } => io::ErrorKind::InvalidInput,
            Error::Closed { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Result type alias using our custom Error type
///
/// 使用自定义 Error 类型的 Result 类型别名
pub type Result<T> = std::result::Result<T, Error>;
