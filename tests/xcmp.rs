//! xcmp 命令行测试

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn xcmp(a: &Path, b: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xcmp"))
        .arg(a)
        .arg(b)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn test_same_prefix_different_lengths() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");

    let data: Vec<u8> = (0..20).collect();
    fs::write(&a, &data[..10]).unwrap();
    fs::write(&b, &data).unwrap();

    let output = xcmp(&a, &b);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with("are same\n"));
}

#[test]
fn test_single_byte_difference() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");

    let mut data = [0x11u8; 16];
    fs::write(&a, data).unwrap();
    data[5] = 0x22;
    fs::write(&b, data).unwrap();

    let output = xcmp(&a, &b);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "00000005 : 11 -- 22");
    assert!(lines[1].ends_with("have 1 bytes different"));
}

#[test]
fn test_differences_in_word_and_tail() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");

    // 19 字节：两个完整的 8 字节字加 3 字节尾部
    let data: Vec<u8> = (0..19).collect();
    fs::write(&a, &data).unwrap();
    let mut other = data.clone();
    other[9] = 0xaa;
    other[18] = 0xbb;
    fs::write(&b, &other).unwrap();

    let output = xcmp(&a, &b);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "00000009 : 09 -- aa");
    assert_eq!(lines[1], "00000012 : 12 -- bb");
    assert!(lines[2].ends_with("have 2 bytes different"));
}

#[test]
fn test_missing_file_is_not_created() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let missing = dir.path().join("missing.bin");
    fs::write(&a, b"data").unwrap();

    let output = xcmp(&a, &missing);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(!missing.exists());
}

#[test]
fn test_wrong_argument_count() {
    let output = Command::new(env!("CARGO_BIN_EXE_xcmp")).arg("only-one").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
