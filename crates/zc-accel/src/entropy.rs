//! Shannon entropy of byte buffers and the compression advice derived from it
//!
//! Entropy is measured in bits per byte over the buffer's own byte histogram:
//!   - 0.0 = a single repeated value
//!   - ~4.5 = English text
//!   - ~7.5 = already-compressed data
//!   - 8.0 = uniform over all 256 values (encrypted or random)

use serde::Serialize;
use zc_core::EntropyConfig;

/// Shannon entropy of `data` in bits per byte, within `[0, 8]`.
///
/// An empty buffer has entropy 0.0 by convention.
pub fn entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut counts = [0u64; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }

    let len = data.len() as f64;
    let mut bits = 0.0_f64;
    for &count in counts.iter().filter(|&&c| c > 0) {
        let p = count as f64 / len;
        bits -= p * p.log2();
    }

    bits.clamp(0.0, 8.0)
}

/// Coarse content class for an entropy value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntropyClass {
    /// < 1.0: constant or sparse
    Constant,
    /// 1.0 - 4.0: simple structured binary
    Structured,
    /// 4.0 - 6.0: text, code
    Text,
    /// 6.0 - 7.5: compressed
    Compressed,
    /// >= 7.5: encrypted or random
    Random,
}

impl EntropyClass {
    pub const ALL: [EntropyClass; 5] = [
        EntropyClass::Constant,
        EntropyClass::Structured,
        EntropyClass::Text,
        EntropyClass::Compressed,
        EntropyClass::Random,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            EntropyClass::Constant => "constant/sparse data",
            EntropyClass::Structured => "structured binary data",
            EntropyClass::Text => "text or code",
            EntropyClass::Compressed => "compressed data",
            EntropyClass::Random => "encrypted or random data",
        }
    }
}

impl std::fmt::Display for EntropyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntropyClass::Constant => "constant",
            EntropyClass::Structured => "structured",
            EntropyClass::Text => "text",
            EntropyClass::Compressed => "compressed",
            EntropyClass::Random => "random",
        };
        f.pad(name)
    }
}

/// Class of `bits` under the default bands.
pub fn classify(bits: f64) -> EntropyClass {
    classify_with(bits, &EntropyConfig::default())
}

/// Class of `bits` with the constant band ending at `config.sparse_below`.
///
/// Values at or above that threshold fall into the fixed bands; anything the
/// fixed bands would still call constant is reported as structured.
pub fn classify_with(bits: f64, config: &EntropyConfig) -> EntropyClass {
    if bits < config.sparse_below {
        EntropyClass::Constant
    } else if bits < 4.0 {
        EntropyClass::Structured
    } else if bits < 6.0 {
        EntropyClass::Text
    } else if bits < 7.5 {
        EntropyClass::Compressed
    } else {
        EntropyClass::Random
    }
}

/// What a compression stage should do with a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAdvice {
    /// Nothing to store
    Skip,
    /// Store as-is; compression would not pay off
    Store,
    /// Worth compressing
    Compress,
}

impl std::fmt::Display for CompressionAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            CompressionAdvice::Skip => "skip",
            CompressionAdvice::Store => "store",
            CompressionAdvice::Compress => "compress",
        })
    }
}

/// Advise on compressing `data`.
pub fn advise(data: &[u8], config: &EntropyConfig) -> CompressionAdvice {
    advise_for(data.len(), entropy(data), config)
}

/// Advice for a buffer of `len` bytes whose entropy is already known.
pub fn advise_for(len: usize, bits: f64, config: &EntropyConfig) -> CompressionAdvice {
    if len == 0 {
        CompressionAdvice::Skip
    } else if len >= config.min_sample && bits > config.incompressible_above {
        CompressionAdvice::Store
    } else {
        CompressionAdvice::Compress
    }
}

/// Whether `data` is dominated by a single value under `config`.
pub fn is_sparse(data: &[u8], config: &EntropyConfig) -> bool {
    data.is_empty() || classify_with(entropy(data), config) == EntropyClass::Constant
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(entropy(b""), 0.0);
    }

    #[test]
    fn repeated_value_is_zero() {
        assert_eq!(entropy(b"aaaa"), 0.0);
        assert_eq!(entropy(&[0u8; 1000]), 0.0);
    }

    #[test]
    fn two_equal_values_is_one_bit() {
        assert_eq!(entropy(b"ab"), 1.0);
        assert_eq!(entropy(b"abababab"), 1.0);
    }

    #[test]
    fn uniform_distribution_is_eight_bits() {
        let data: Vec<u8> = (0u8..=255).cycle().take(256 * 64).collect();
        assert_eq!(entropy(&data), 8.0);
    }

    #[test]
    fn grows_with_distinct_values() {
        let mut previous = 0.0;
        for k in [1usize, 2, 4, 8, 16, 32, 64, 128, 256] {
            let data: Vec<u8> = (0..k).map(|v| v as u8).cycle().take(k * 16).collect();
            let bits = entropy(&data);
            assert!(bits >= previous, "k={k}: {bits} < {previous}");
            assert!((bits - (k as f64).log2()).abs() < 1e-9, "k={k}: {bits}");
            previous = bits;
        }
        assert_eq!(previous, 8.0);
    }

    #[test]
    fn english_text_is_text() {
        let data = b"The quick brown fox jumps over the lazy dog. This is sample English text.";
        assert_eq!(classify(entropy(data)), EntropyClass::Text);
    }

    #[test]
    fn classify_bands() {
        assert_eq!(classify(0.5), EntropyClass::Constant);
        assert_eq!(classify(3.0), EntropyClass::Structured);
        assert_eq!(classify(4.5), EntropyClass::Text);
        assert_eq!(classify(7.0), EntropyClass::Compressed);
        assert_eq!(classify(7.95), EntropyClass::Random);
    }

    #[test]
    fn advice_follows_thresholds() {
        let config = EntropyConfig::default();
        let random: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        assert_eq!(advise(b"", &config), CompressionAdvice::Skip);
        assert_eq!(advise(&random, &config), CompressionAdvice::Store);
        assert_eq!(advise(&[7u8; 4096], &config), CompressionAdvice::Compress);
        // Too short to judge incompressible
        assert_eq!(advise(&random[..64], &config), CompressionAdvice::Compress);
    }

    #[test]
    fn sparse_detection() {
        let config = EntropyConfig::default();
        assert!(is_sparse(&[0u8; 100], &config));
        assert!(is_sparse(b"", &config));
        assert!(!is_sparse(b"Hello World", &config));
    }

    #[test]
    fn sparse_threshold_moves_constant_band() {
        let strict = EntropyConfig { sparse_below: 0.0, ..EntropyConfig::default() };
        let loose = EntropyConfig { sparse_below: 3.0, ..EntropyConfig::default() };

        // A zero threshold leaves no constant band
        assert_eq!(classify_with(0.0, &strict), EntropyClass::Structured);
        assert_eq!(classify_with(0.0, &EntropyConfig::default()), EntropyClass::Constant);

        assert_eq!(classify_with(0.5, &strict), EntropyClass::Structured);
        assert_eq!(classify_with(2.0, &loose), EntropyClass::Constant);
        assert_eq!(classify_with(2.0, &EntropyConfig::default()), EntropyClass::Structured);
        assert_eq!(classify_with(4.5, &loose), EntropyClass::Text);

        // "Hello World" is about 2.85 bits/byte
        assert!(is_sparse(b"Hello World", &loose));
    }

    #[test]
    fn default_threshold_matches_fixed_bands() {
        let config = EntropyConfig::default();
        for bits in [0.0, 0.5, 0.99, 1.0, 3.9, 4.0, 5.9, 6.0, 7.49, 7.5, 8.0] {
            assert_eq!(classify_with(bits, &config), classify(bits), "bits {bits}");
        }
    }

    proptest! {
        #[test]
        fn entropy_is_bounded(data in proptest::collection::vec(any::<u8>(), 0..=4096)) {
            let bits = entropy(&data);
            prop_assert!((0.0..=8.0).contains(&bits), "entropy {} out of range", bits);
        }

        #[test]
        fn entropy_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..=2048)) {
            prop_assert_eq!(entropy(&data).to_bits(), entropy(&data).to_bits());
        }

        #[test]
        fn entropy_ignores_order(mut data in proptest::collection::vec(any::<u8>(), 0..=512)) {
            let before = entropy(&data);
            data.sort_unstable();
            prop_assert!((entropy(&data) - before).abs() < 1e-12);
        }
    }
}
