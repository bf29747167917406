//! Resizable memory-mapped files and block devices
//!
//! 可调整大小的内存映射文件与块设备
//!
//! This library manages one shared memory mapping of a regular file or block
//! device, and re-establishes it transparently whenever the backing size
//! changes through the same handle.
//!
//! 本库管理普通文件或块设备的一个共享内存映射，
//! 当通过同一句柄改变底层大小时，会透明地重建映射。
//!
//! # Features
//!
//! - **One API for files and devices**: block devices are mapped at their capacity
//! - **Exact resizing**: zero-fill growth and truncation of regular files
//! - **Remap on change**: the buffer never disagrees with the logical size
//! - **Typed errors**: every failure carries its path and OS error code
//!
//! # 特性
//!
//! - **文件与设备统一 API**：块设备按其容量映射
//! - **精确调整大小**：普通文件的零填充增长与截断
//! - **变化即重映射**：缓冲区始终与逻辑大小一致
//! - **类型化错误**：每个失败都携带路径和操作系统错误码
//!
//! # Quick Start
//!
//! ```
//! use file_map::{FileMap, MapMode};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::tempdir()?;
//! # let path = dir.path().join("a.dat");
//!
//! let mut fm = FileMap::new(&path);
//! fm.set_size(2_000_000)?;
//! fm.open()?;
//!
//! let buf = fm.as_mut_slice().unwrap();
//! buf[0] = 0x11;
//! buf[1_999_999] = 0x22;
//! fm.close();
//!
//! // Reopen read-only
//! // 以只读方式重新打开
//! let mut fm = FileMap::new(&path);
//! fm.open_with(MapMode::ReadOnly)?;
//! let buf = fm.as_slice().unwrap();
//! assert_eq!((buf[0], buf[1_999_999]), (0x11, 0x22));
//! # Ok(())
//! # }
//! ```
//!
//! # Main Types
//!
//! - [`FileMap`]: The mapped-file manager
//! - [`MapMode`]: Read-write or read-only access
//! - [`SizeChange`]: Whether a resize changed anything
//! - [`Error`]: Failure taxonomy
//! - [`compare()`], [`compare_with()`]: Streaming byte-level diff used by the `xcmp` tool
//!
//! # 主要类型
//!
//! - [`FileMap`]：映射文件管理器
//! - [`MapMode`]：读写或只读访问
//! - [`SizeChange`]：调整大小是否产生变化
//! - [`Error`]：错误分类
//! - [`compare()`]、[`compare_with()`]：`xcmp` 工具使用的流式字节级比较

mod compare;
mod file;

pub use compare::{ByteDiff, Comparison, compare, compare_with};
pub use file::{
    Error, ErrorKind, FileInfo, FileKind, FileMap, MAX_SIZE, MapMode, Result, SizeChange,
    ZERO_FILL_CHUNK, page_size, probe,
};
