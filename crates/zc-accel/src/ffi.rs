//! C ABI for hosts that load zc-accel as a shared library
//!
//! Buffers cross the boundary as `(pointer, length)` pairs owned by the
//! caller. A null pointer is read as an empty buffer whatever its length.

use std::cmp::Ordering;

use crate::{checksum, compare, entropy, search};

/// Returned by [`zc_find_pattern`] when the needle does not occur
pub const ZC_NOT_FOUND: usize = usize::MAX;

/// # Safety
///
/// A non-null `ptr` must be valid for reads of `len` bytes for the duration
/// of the call.
unsafe fn borrow<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

/// CRC-32 of a buffer.
///
/// # Safety
///
/// `data` must be null or valid for reads of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn zc_crc32(data: *const u8, len: usize) -> u32 {
    checksum::checksum(borrow(data, len))
}

/// Compare the first `len` bytes of two buffers: -1, 0 or 1.
///
/// # Safety
///
/// `a` and `b` must each be null or valid for reads of `len` bytes. A null
/// buffer compares as shorter than `len`, which orders it first.
#[no_mangle]
pub unsafe extern "C" fn zc_memcmp(a: *const u8, b: *const u8, len: usize) -> i32 {
    let (a, b) = (borrow(a, len), borrow(b, len));
    let ordering = match compare::compare(a, b, len) {
        Ok(ordering) => ordering,
        // A null side has no bytes; order by how many bytes each side has
        Err(_) => a.len().cmp(&b.len()),
    };
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Offset of the first occurrence of `needle`, or [`ZC_NOT_FOUND`].
///
/// # Safety
///
/// Each pointer must be null or valid for reads of its length.
#[no_mangle]
pub unsafe extern "C" fn zc_find_pattern(
    haystack: *const u8,
    haystack_len: usize,
    needle: *const u8,
    needle_len: usize,
) -> usize {
    search::find(borrow(haystack, haystack_len), borrow(needle, needle_len))
        .unwrap_or(ZC_NOT_FOUND)
}

/// Shannon entropy of a buffer in bits per byte.
///
/// # Safety
///
/// `data` must be null or valid for reads of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn zc_entropy(data: *const u8, len: usize) -> f64 {
    entropy::entropy(borrow(data, len))
}
