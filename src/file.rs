//! Resizable memory-mapped files based on memmap2
//!
//! 基于 memmap2 的可调整大小内存映射文件
//!
//! The manager is split into three layers, each usable only through
//! [`FileMap`]:
//! - `probe`: kind and size discovery (regular file or block device)
//! - `resize`: zero-fill extension and truncation of regular files
//! - `mapper`: page-aligned shared mapping and unmapping
//!
//! 管理器分为三层，均通过 [`FileMap`] 使用：
//! - `probe`：类型与大小探测（普通文件或块设备）
//! - `resize`：普通文件的零填充扩展与截断
//! - `mapper`：页对齐的共享映射与解除映射
//!
//! # Sizes
//!
//! Three sizes are involved and kept consistent:
//! 1. Logical size: the usable byte length, [`FileMap::size`]
//! 2. On-disk size: what the filesystem or device reports
//! 3. Mapped extent: the logical size rounded up to [`page_size`]
//!
//! # 大小
//!
//! 涉及三种大小，并保持一致：
//! 1. 逻辑大小：可用字节长度，即 [`FileMap::size`]
//! 2. 磁盘大小：文件系统或设备报告的大小
//! 3. 映射长度：逻辑大小按 [`page_size`] 向上取整
//!
//! ```
//! # use file_map::{FileMap, MapMode, SizeChange};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::tempdir()?;
//! # let path = dir.path().join("grow.bin");
//! let mut fm = FileMap::new(&path);
//! fm.open()?; // created as one page of zeros
//!             // 创建为一页零字节
//!
//! assert_eq!(fm.set_size(10_000)?, SizeChange::Changed);
//! assert_eq!(fm.as_slice().unwrap().len(), 10_000);
//!
//! assert_eq!(fm.set_size(10_000)?, SizeChange::Unchanged);
//! # Ok(())
//! # }
//! ```

mod error;
mod file_map;
mod mapper;
mod probe;
mod resize;


// Re-export public API
// 重新导出公共 API
pub use error::{Error, ErrorKind, Result};
pub use file_map::FileMap;
pub use mapper::{MAX_SIZE, MapMode, page_size};
pub use probe::{FileInfo, FileKind, probe};
pub use resize::{SizeChange, ZERO_FILL_CHUNK};
