//! CRC-32 (IEEE, reflected) checksums
//!
//! Two backends compute the same function:
//!   - `Table`: byte-at-a-time over a 256-entry table built by const evaluation
//!   - `Hardware`: `crc32fast`, selected only when the CPU has carry-less
//!     multiply (x86_64) or the ARMv8 CRC extension (aarch64)
//!
//! The SSE4.2 `crc32` instruction computes CRC-32C (Castagnoli polynomial),
//! not this checksum, so it is never used here.
//!
//! The backend is chosen once per process and read lock-free afterwards.

use std::sync::OnceLock;

use tracing::{info, warn};
use zc_core::{BackendPreference, ZcError, ZcResult};

/// Reflected CRC-32 generator polynomial
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Full CRC-32 lookup table, generated from [`POLYNOMIAL`] at compile time
pub static CRC32_TABLE: [u32; 256] = make_table(POLYNOMIAL);

const fn make_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static ACTIVE: OnceLock<Backend> = OnceLock::new();

/// One implementation of "compute CRC-32 over a buffer"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Table,
    Hardware,
}

impl Backend {
    /// Best backend the running CPU supports
    pub fn detect() -> Self {
        if hardware_supported() {
            Backend::Hardware
        } else {
            Backend::Table
        }
    }

    pub fn is_available(self) -> bool {
        match self {
            Backend::Table => true,
            Backend::Hardware => hardware_supported(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Table => "table",
            Backend::Hardware => "hardware",
        }
    }

    /// Resolve a configured preference against the running CPU.
    pub fn from_preference(pref: BackendPreference) -> ZcResult<Self> {
        match pref {
            BackendPreference::Auto => Ok(Self::detect()),
            BackendPreference::Table => Ok(Backend::Table),
            BackendPreference::Hardware if hardware_supported() => Ok(Backend::Hardware),
            BackendPreference::Hardware => Err(ZcError::BackendUnavailable(format!(
                "no CRC-32 acceleration on this CPU ({})",
                describe_features()
            ))),
        }
    }

    /// Compute the checksum of `data` with this backend.
    ///
    /// Calling `Hardware` on a CPU without support is still correct;
    /// `crc32fast` falls back to its own portable path.
    #[inline]
    pub fn compute(self, data: &[u8]) -> u32 {
        match self {
            Backend::Table => table_crc32(data),
            Backend::Hardware => crc32fast::hash(data),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// CRC-32 of `data` using the process-wide backend.
///
/// Empty input yields `0x0000_0000`.
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    active_backend().compute(data)
}

/// CRC-32 of `data` using an explicit backend.
pub fn checksum_with(backend: Backend, data: &[u8]) -> u32 {
    backend.compute(data)
}

/// Portable table-driven CRC-32.
pub fn table_crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(0xFFFF_FFFF_u32, |crc, &byte| {
        CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    });
    !crc
}

/// Fix the process-wide backend from a configured preference.
///
/// The first successful call wins; later calls return the backend already in
/// use and warn if it differs from the one requested.
pub fn init_backend(pref: BackendPreference) -> ZcResult<Backend> {
    let wanted = Backend::from_preference(pref)?;
    let active = *ACTIVE.get_or_init(|| {
        log_selection(wanted);
        wanted
    });
    if active != wanted {
        warn!(
            active = %active,
            requested = %wanted,
            "checksum backend already initialized; keeping active backend"
        );
    }
    Ok(active)
}

/// Backend used by [`checksum`], detected on first use if not initialized.
pub fn active_backend() -> Backend {
    *ACTIVE.get_or_init(|| {
        let backend = Backend::detect();
        log_selection(backend);
        backend
    })
}

fn log_selection(backend: Backend) {
    info!(backend = %backend, cpu = %describe_features(), "checksum backend selected");
}

/// Whether the CPU has the instructions `crc32fast` accelerates with.
pub fn hardware_supported() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("pclmulqdq") && is_x86_feature_detected!("sse4.1")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("crc")
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

/// CPU features relevant to checksum dispatch, as `(name, detected)` pairs.
pub fn cpu_features() -> Vec<(&'static str, bool)> {
    #[cfg(target_arch = "x86_64")]
    {
        vec![
            ("sse4.1", is_x86_feature_detected!("sse4.1")),
            ("sse4.2", is_x86_feature_detected!("sse4.2")),
            ("pclmulqdq", is_x86_feature_detected!("pclmulqdq")),
        ]
    }
    #[cfg(target_arch = "aarch64")]
    {
        vec![("crc", std::arch::is_aarch64_feature_detected!("crc"))]
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        Vec::new()
    }
}

fn describe_features() -> String {
    let features = cpu_features();
    if features.is_empty() {
        return format!("{}: none", std::env::consts::ARCH);
    }
    let list: Vec<String> = features
        .iter()
        .map(|(name, on)| format!("{}{name}", if *on { "+" } else { "-" }))
        .collect();
    format!("{}: {}", std::env::consts::ARCH, list.join(" "))
}
