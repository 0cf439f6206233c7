//! Three-way lexicographic comparison of byte buffers
//!
//! Bytes are compared eight at a time. Each group is loaded as a big-endian
//! `u64`, so integer order equals byte-wise lexicographic order regardless of
//! the platform's native endianness. The tail shorter than a group is
//! compared byte by byte.

use std::cmp::Ordering;

use zc_core::{ZcError, ZcResult};

const GROUP: usize = 8;

/// Compare the first `len` bytes of `a` and `b`.
///
/// Returns `ShortBuffer` if either buffer holds fewer than `len` bytes.
pub fn compare(a: &[u8], b: &[u8], len: usize) -> ZcResult<Ordering> {
    let available = a.len().min(b.len());
    if len > available {
        return Err(ZcError::ShortBuffer { needed: len, available });
    }
    Ok(ordering(&a[..len], &b[..len]))
}

/// Compare two buffers that must have the same length.
pub fn compare_slices(a: &[u8], b: &[u8]) -> ZcResult<Ordering> {
    if a.len() != b.len() {
        return Err(ZcError::ShortBuffer {
            needed: a.len().max(b.len()),
            available: a.len().min(b.len()),
        });
    }
    Ok(ordering(a, b))
}

/// Lexicographic order of two equal-length slices.
pub(crate) fn ordering(a: &[u8], b: &[u8]) -> Ordering {
    debug_assert_eq!(a.len(), b.len());

    let a_groups = a.chunks_exact(GROUP);
    let b_groups = b.chunks_exact(GROUP);
    let (a_tail, b_tail) = (a_groups.remainder(), b_groups.remainder());

    for (ga, gb) in a_groups.zip(b_groups) {
        let (wa, wb) = (load_be(ga), load_be(gb));
        if wa != wb {
            return wa.cmp(&wb);
        }
    }

    for (x, y) in a_tail.iter().zip(b_tail) {
        if x != y {
            return x.cmp(y);
        }
    }
    Ordering::Equal
}

#[inline]
fn load_be(group: &[u8]) -> u64 {
    let mut word = [0u8; GROUP];
    word.copy_from_slice(group);
    u64::from_be_bytes(word)
}
