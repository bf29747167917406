//! xcmp: compare two files or block devices byte by byte
//!
//! xcmp：逐字节比较两个文件或块设备
//!
//! Exit status: 0 if the common prefix is identical, 1 if it differs,
//! 2 if either path cannot be opened or the arguments are wrong.
//!
//! 退出码：公共前缀相同为 0，不同为 1，路径无法打开或参数错误为 2。

use clap::Parser;
use file_map::{FileMap, MapMode, compare_with, probe};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

const EXIT_DIFFERENT: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "xcmp")]
#[command(about = "Compare two files through read-only memory mappings")]
#[command(version)]
struct Cli {
    /// First file or block device
    file1: PathBuf,
    /// Second file or block device
    file2: PathBuf,
}

/// Map `path` read-only, refusing to create it
///
/// 以只读方式映射 `path`，不会创建文件
fn open_read_only(path: &Path) -> file_map::Result<FileMap> {
    probe(path)?;
    let mut fm = FileMap::new(path);
    fm.open_with(MapMode::ReadOnly)?;
    Ok(fm)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let (left, right) = match open_read_only(&cli.file1).and_then(|left| Ok((left, open_read_only(&cli.file2)?))) {
        Ok(pair) => pair,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let (Some(a), Some(b)) = (left.as_slice(), right.as_slice()) else {
        return ExitCode::from(EXIT_FAILURE);
    };

    let mut out = BufWriter::new(io::stdout().lock());
    let mut write_err = None;
    let result = compare_with(a, b, |diff| {
        if write_err.is_none() {
            if let Err(err) = writeln!(out, "{:08x} : {:02x} -- {:02x}", diff.offset, diff.left, diff.right) {
                write_err = Some(err);
            }
        }
    });

    let summary = if result.is_same() {
        writeln!(out, "{} and {} are same", cli.file1.display(), cli.file2.display())
    } else {
        writeln!(
            out,
            "{} and {} have {} bytes different",
            cli.file1.display(),
            cli.file2.display(),
            result.different
        )
    };

    let flushed = summary.and_then(|()| out.flush());
    if let Some(err) = write_err.or(flushed.err()) {
        error!("write stdout error: {}", err);
        return ExitCode::from(EXIT_FAILURE);
    }

    if result.is_same() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DIFFERENT)
    }
}
