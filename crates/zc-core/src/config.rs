use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ZcError, ZcResult};

/// Top-level configuration (loaded from zc.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZcConfig {
    pub log: LogConfig,
    pub checksum: ChecksumConfig,
    pub entropy: EntropyConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksumConfig {
    /// Checksum implementation: "auto", "table", or "hardware"
    pub backend: BackendPreference,
}

/// Which CRC-32 implementation the process should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Hardware when the CPU supports it, table otherwise
    #[default]
    Auto,
    /// Always the portable table-driven path
    Table,
    /// Hardware only; fails on hosts without support
    Hardware,
}

/// Thresholds (bits per byte) used to turn an entropy value into advice
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// Below this a buffer is considered constant/sparse
    pub sparse_below: f64,
    /// Above this a buffer is not worth compressing
    pub incompressible_above: f64,
    /// Buffers shorter than this are never judged incompressible
    pub min_sample: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Block size in bytes for block-wise analysis (default: 64KB)
    pub block_size: usize,
    /// Analyze blocks on the rayon thread pool
    pub parallel: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            sparse_below: 1.0,
            incompressible_above: 7.5,
            min_sample: 256,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            block_size: 64 * 1024,
            parallel: true,
        }
    }
}

impl ZcConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> ZcResult<Self> {
        let config: ZcConfig =
            toml::from_str(s).map_err(|e| ZcError::Config(format!("parsing TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> ZcResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| ZcError::Config(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> ZcResult<()> {
        self.entropy.validate()?;
        if self.scan.block_size == 0 {
            return Err(ZcError::Config("scan.block_size must be non-zero".into()));
        }
        Ok(())
    }
}

impl EntropyConfig {
    pub fn validate(&self) -> ZcResult<()> {
        for (name, value) in [
            ("entropy.sparse_below", self.sparse_below),
            ("entropy.incompressible_above", self.incompressible_above),
        ] {
            if !(0.0..=8.0).contains(&value) {
                return Err(ZcError::Config(format!(
                    "{name} must be within [0, 8] bits/byte, got {value}"
                )));
            }
        }
        if self.sparse_below > self.incompressible_above {
            return Err(ZcError::Config(format!(
                "entropy.sparse_below ({}) exceeds entropy.incompressible_above ({})",
                self.sparse_below, self.incompressible_above
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[log]
level = "debug"
format = "json"

[checksum]
backend = "table"

[entropy]
sparse_below = 0.5
incompressible_above = 7.8
min_sample = 1024

[scan]
block_size = 4096
parallel = false
"#;
        let config = ZcConfig::from_toml_str(toml_str).unwrap();

        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.checksum.backend, BackendPreference::Table);
        assert_eq!(config.entropy.sparse_below, 0.5);
        assert_eq!(config.entropy.incompressible_above, 7.8);
        assert_eq!(config.entropy.min_sample, 1024);
        assert_eq!(config.scan.block_size, 4096);
        assert!(!config.scan.parallel);
    }

    #[test]
    fn test_parse_defaults() {
        let config = ZcConfig::from_toml_str("").unwrap();

        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.checksum.backend, BackendPreference::Auto);
        assert_eq!(config.entropy.incompressible_above, 7.5);
        assert_eq!(config.scan.block_size, 64 * 1024);
        assert!(config.scan.parallel);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[checksum]
backend = "hardware"
"#;
        let config = ZcConfig::from_toml_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.checksum.backend, BackendPreference::Hardware);
        // Defaults
        assert_eq!(config.entropy.min_sample, 256);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = ZcConfig::from_toml_str("[checksum]\nbackend = \"sse42\"\n").unwrap_err();
        assert!(matches!(err, ZcError::Config(_)));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = ZcConfig::from_toml_str("[entropy]\nincompressible_above = 9.0\n").unwrap_err();
        assert!(err.to_string().contains("incompressible_above"));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let toml_str = r#"
[entropy]
sparse_below = 6.0
incompressible_above = 5.0
"#;
        assert!(ZcConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let err = ZcConfig::from_toml_str("[scan]\nblock_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("block_size"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ZcConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.scan.block_size, 64 * 1024);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scan]\nblock_size = 512").unwrap();
        let config = ZcConfig::load(file.path()).unwrap();
        assert_eq!(config.scan.block_size, 512);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = ZcConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = ZcConfig::from_toml_str(&toml_str).unwrap();

        assert_eq!(config.checksum.backend, parsed.checksum.backend);
        assert_eq!(config.scan.block_size, parsed.scan.block_size);
        assert_eq!(config.log.format, parsed.log.format);
    }
}
