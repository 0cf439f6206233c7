pub mod config;
pub mod error;

pub use config::{BackendPreference, EntropyConfig, LogFormat, ScanConfig, ZcConfig};
pub use error::{ZcError, ZcResult};
