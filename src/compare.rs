//! Byte-level comparison of two mapped buffers
//!
//! 两个映射缓冲区的字节级比较

/// Word size used for the fast path
///
/// 快速路径使用的字长
const WORD: usize = std::mem::size_of::<u64>();

/// One differing byte
///
/// 一个不同的字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteDiff {
    /// Offset from the start of the buffers
    ///
    /// 相对缓冲区起始位置的偏移
    pub offset: u64,
    pub left: u8,
    pub right: u8,
}

/// Result of [`compare`] and [`compare_with`]
///
/// [`compare`] 与 [`compare_with`] 的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    /// Number of bytes compared, the shorter of the two lengths
    ///
    /// 比较的字节数，即两者中较短的长度
    pub compared: u64,

    /// Number of differing bytes
    ///
    /// 不同字节的数量
    pub different: u64,
}

impl Comparison {
    #[inline]
    pub fn is_same(&self) -> bool {
        self.different == 0
    }
}

/// Compare the common prefix of `left` and `right`, counting differences
///
/// 比较 `left` 与 `right` 的公共前缀，只统计不同字节数
///
/// # Examples
///
/// ```
/// # use file_map::compare;
/// let result = compare(b"0123456789abcdef", b"01234X6789abcdeX");
/// assert_eq!(result.compared, 16);
/// assert_eq!(result.different, 2);
/// ```
#[inline]
pub fn compare(left: &[u8], right: &[u8]) -> Comparison {
    compare_with(left, right, |_| {})
}

/// Compare the common prefix of `left` and `right`, reporting each difference
///
/// 比较 `left` 与 `right` 的公共前缀，逐个回调报告不同字节
///
/// `on_diff` is called once per differing byte in ascending offset order, as
/// soon as it is found. Nothing is buffered, so memory use does not depend
/// on how much of the input differs.
///
/// 每发现一个不同字节即按偏移升序调用一次 `on_diff`，不做缓存，
/// 内存占用与不同区域的大小无关。
///
/// Buffers are walked a word at a time; only differing words are inspected
/// byte by byte.
///
/// 按字遍历缓冲区，只有不同的字才逐字节检查。
///
/// # Examples
///
/// ```
/// # use file_map::{compare_with, ByteDiff};
/// let mut diffs = Vec::new();
/// let result = compare_with(b"0123456789abcdef", b"01234X6789abcdef", |d| diffs.push(d));
/// assert_eq!(result.different, 1);
/// assert_eq!(diffs, vec![ByteDiff { offset: 5, left: b'5', right: b'X' }]);
/// ```
pub fn compare_with(left: &[u8], right: &[u8], mut on_diff: impl FnMut(ByteDiff)) -> Comparison {
    let len = left.len().min(right.len());
    let (left, right) = (&left[..len], &right[..len]);

    let mut different = 0;
    let words = left.chunks_exact(WORD).zip(right.chunks_exact(WORD));
    for (index, (a, b)) in words.enumerate() {
        if a != b {
            different += scan(index * WORD, a, b, &mut on_diff);
        }
    }

    let tail = len - len % WORD;
    different += scan(tail, &left[tail..], &right[tail..], &mut on_diff);

    Comparison { compared: len as u64, different }
}

fn scan(base: usize, left: &[u8], right: &[u8], on_diff: &mut impl FnMut(ByteDiff)) -> u64 {
    let mut found = 0;
    for (i, (&a, &b)) in left.iter().zip(right).enumerate() {
        if a != b {
            on_diff(ByteDiff { offset: (base + i) as u64, left: a, right: b });
            found += 1;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diffs_of(a: &[u8], b: &[u8]) -> (Comparison, Vec<ByteDiff>) {
        let mut diffs = Vec::new();
        let result = compare_with(a, b, |d| diffs.push(d));
        (result, diffs)
    }

    #[test]
    fn test_identical_prefix_of_different_lengths() {
        let short = [7u8; 10];
        let mut long = [7u8; 20];
        long[15] = 0;

        let result = compare(&short, &long);
        assert_eq!(result.compared, 10);
        assert!(result.is_same());
    }

    #[test]
    fn test_single_difference() {
        let a = [0u8; 16];
        let mut b = [0u8; 16];
        b[5] = 0xff;

        let (result, diffs) = diffs_of(&a, &b);
        assert_eq!(result.different, 1);
        assert_eq!(diffs, vec![ByteDiff { offset: 5, left: 0, right: 0xff }]);
    }

    #[test]
    fn test_differences_in_word_and_tail() {
        // 8 字节一个字，19 字节包含 3 字节尾部
        let a: Vec<u8> = (0..19).collect();
        let mut b = a.clone();
        b[0] = 100;
        b[7] = 101;
        b[9] = 102;
        b[18] = 103;

        let (result, diffs) = diffs_of(&a, &b);
        let offsets: Vec<u64> = diffs.iter().map(|d| d.offset).collect();
        assert_eq!(offsets, vec![0, 7, 9, 18]);
        assert_eq!(result.different, 4);
        assert_eq!(compare(&a, &b), result);
    }

    #[test]
    fn test_empty_input() {
        let result = compare(&[], b"abc");
        assert_eq!(result.compared, 0);
        assert!(result.is_same());
    }

    #[test]
    fn test_callback_sees_every_difference_once() {
        // 全部不同：回调次数等于计数，且偏移严格递增
        let a = vec![0u8; 1000];
        let b = vec![1u8; 1000];

        let mut calls = 0u64;
        let mut last = None;
        let result = compare_with(&a, &b, |d| {
            assert!(last.is_none_or(|prev| prev < d.offset));
            last = Some(d.offset);
            calls += 1;
        });

        assert_eq!(calls, 1000);
        assert_eq!(result.different, 1000);
        assert_eq!(last, Some(999));
    }
}
