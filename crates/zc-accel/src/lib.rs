//! zc-accel: hot-path byte-buffer primitives for the zero-compress pipeline
//!
//! # Overview
//! - `checksum`: reflected CRC-32 (IEEE) with table and hardware backends
//! - `compare`: three-way lexicographic ordering of equal-length buffers
//! - `search`: leftmost-occurrence substring search
//! - `entropy`: Shannon entropy (bits/byte) and compression advice
//! - `scan`: block-wise checksum/entropy report with duplicate detection
//! - `ffi`: C ABI for loading the primitives as a shared library
//!
//! All primitives borrow their input and keep no state between calls, apart
//! from the process-wide checksum backend chosen once at first use.

pub mod checksum;
pub mod compare;
pub mod entropy;
pub mod ffi;
pub mod scan;
pub mod search;

// Convenience re-exports for the most common operations
pub use checksum::{active_backend, checksum, checksum_with, init_backend, Backend};
pub use compare::{compare, compare_slices};
pub use entropy::{advise, classify, classify_with, entropy, CompressionAdvice, EntropyClass};
pub use scan::{scan, BlockReport, ScanReport};
pub use search::find;
