//! Golden vectors and cross-primitive properties through the public API.
//!
//! Covers the reference values every consumer of the crate relies on, plus
//! concurrent use of all four primitives from many threads at once.

use std::cmp::Ordering;

use zc_accel::checksum::{hardware_supported, table_crc32};
use zc_accel::{checksum, checksum_with, compare, entropy, find, Backend};

fn corpus() -> Vec<Vec<u8>> {
    let mut state = 0x2545_F491_u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as u8
    };
    [0usize, 1, 2, 7, 8, 9, 63, 64, 65, 255, 256, 1000, 4096, 65537]
        .iter()
        .map(|&len| (0..len).map(|_| next()).collect())
        .collect()
}

/// CRC-32/ISO-HDLC check value
#[test]
fn checksum_check_value() {
    assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
    assert_eq!(checksum(b""), 0x0000_0000);
    assert_eq!(checksum(b"The quick brown fox jumps over the lazy dog"), 0x414F_A339);
}

#[test]
fn checksum_backends_agree_on_corpus() {
    for data in corpus() {
        let table = checksum_with(Backend::Table, &data);
        assert_eq!(table, table_crc32(&data));
        assert_eq!(checksum_with(Backend::Hardware, &data), table, "len {}", data.len());
        assert_eq!(checksum(&data), table, "active backend, len {}", data.len());
    }
}

#[test]
fn detected_backend_matches_cpu() {
    let expected = if hardware_supported() { Backend::Hardware } else { Backend::Table };
    assert_eq!(Backend::detect(), expected);
}

#[test]
fn compare_mirror_images() {
    let cases: [(&[u8], &[u8]); 4] = [
        (b"abc", b"abd"),
        (b"abcdefgh", b"abcdefgh"),
        (b"abcdefghZ", b"abcdefghA"),
        (&[0x00, 0xFF], &[0x01, 0x00]),
    ];
    for (a, b) in cases {
        let len = a.len();
        let ab = compare(a, b, len).unwrap();
        let ba = compare(b, a, len).unwrap();
        assert_eq!(ab, ba.reverse());
        assert_eq!(compare(a, a, len).unwrap(), Ordering::Equal);
    }
}

#[test]
fn search_vectors() {
    assert_eq!(find(b"hello world", b"world"), Some(6));
    assert_eq!(find(b"hello", b"xyz"), None);
    assert_eq!(find(b"abc", b""), None);
    assert_eq!(find(b"aa", b"aaa"), None);
    assert_eq!(find(b"aXaXa", b"a"), Some(0));
    assert_eq!(find(b"the needle is a long needle indeed", b"long needle"), Some(16));
}

#[test]
fn entropy_vectors() {
    assert_eq!(entropy(b""), 0.0);
    assert_eq!(entropy(b"aaaa"), 0.0);
    assert_eq!(entropy(b"ab"), 1.0);
    let uniform: Vec<u8> = (0u8..=255).cycle().take(1 << 20).collect();
    assert_eq!(entropy(&uniform), 8.0);
}

/// All primitives are reentrant: concurrent callers see the same results as
/// a single thread.
#[test]
fn primitives_are_reentrant() {
    let corpus = corpus();
    let expected: Vec<(u32, f64, Option<usize>)> = corpus
        .iter()
        .map(|d| (checksum(d), entropy(d), find(d, b"\x00\x01")))
        .collect();

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for (data, want) in corpus.iter().zip(&expected) {
                    let got = (checksum(data), entropy(data), find(data, b"\x00\x01"));
                    assert_eq!(got.0, want.0);
                    assert_eq!(got.1.to_bits(), want.1.to_bits());
                    assert_eq!(got.2, want.2);
                    assert_eq!(compare(data, data, data.len()).unwrap(), Ordering::Equal);
                }
            });
        }
    });
}
