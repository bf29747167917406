use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use file_map::{FileMap, MapMode, compare};
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;

/// 测试参数
const FILE_SIZE: u64 = 1024 * 1024 * 64; // 64MB
const DIFF_STRIDE: usize = 4096; // 每页一个不同字节

/// 创建两个只在每页首字节不同的文件
fn prepare(left: &Path, right: &Path) {
    let mut a = FileMap::new(left);
    a.set_size(FILE_SIZE).unwrap();
    a.open().unwrap();

    let mut b = FileMap::new(right);
    b.set_size(FILE_SIZE).unwrap();
    b.open().unwrap();

    let buf = b.as_mut_slice().unwrap();
    for offset in (0..buf.len()).step_by(DIFF_STRIDE) {
        buf[offset] = 1;
    }
    b.flush().unwrap();
}

/// 使用只读映射比较
fn bench_mapped(left: &Path, right: &Path) -> u64 {
    let mut a = FileMap::new(left);
    let mut b = FileMap::new(right);
    a.open_with(MapMode::ReadOnly).unwrap();
    b.open_with(MapMode::ReadOnly).unwrap();

    compare(a.as_slice().unwrap(), b.as_slice().unwrap()).different
}

/// 使用 std::fs::read 读入内存后比较
fn bench_read(left: &Path, right: &Path) -> u64 {
    let a = std::fs::read(left).unwrap();
    let b = std::fs::read(right).unwrap();

    compare(&a, &b).different
}

fn compare_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let left = dir.path().join("left.bin");
    let right = dir.path().join("right.bin");
    prepare(&left, &right);

    let mut group = c.benchmark_group("compare");
    group.sample_size(10);

    let label = format!("{}MB", FILE_SIZE / (1024 * 1024));

    group.bench_function(BenchmarkId::new("mapped", &label), |b| {
        b.iter(|| black_box(bench_mapped(&left, &right)));
    });

    group.bench_function(BenchmarkId::new("read", &label), |b| {
        b.iter(|| black_box(bench_read(&left, &right)));
    });

    group.finish();
}

criterion_group!(benches, compare_benchmark);
criterion_main!(benches);
