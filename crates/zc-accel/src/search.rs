//! Leftmost-occurrence substring search
//!
//! Needles of up to eight bytes are packed into a `u64` and matched against a
//! rolling window packed the same way, one shift per haystack byte. Longer
//! needles are tested at each offset with the comparator.
//!
//! An empty needle never matches.

use std::cmp::Ordering;

use crate::compare::ordering;

/// Longest needle handled by the packed-window path
const PACK_WIDTH: usize = 8;

/// Offset of the first occurrence of `needle` in `haystack`.
///
/// Returns `None` for an empty needle or one longer than the haystack.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    if n == 0 || n > haystack.len() {
        return None;
    }
    if n <= PACK_WIDTH {
        find_packed(haystack, needle)
    } else {
        find_long(haystack, needle)
    }
}

/// Little-endian pack: byte `i` lands in bits `8i..8i+8`.
#[inline]
fn pack(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &b)| acc | ((b as u64) << (i * 8)))
}

fn find_packed(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    let target = pack(needle);
    let top = (n - 1) * 8;

    let mut window = pack(&haystack[..n]);
    if window == target {
        return Some(0);
    }
    for (i, &incoming) in haystack[n..].iter().enumerate() {
        window = (window >> 8) | ((incoming as u64) << top);
        if window == target {
            return Some(i + 1);
        }
    }
    None
}

fn find_long(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|w| ordering(w, needle) == Ordering::Equal)
}
