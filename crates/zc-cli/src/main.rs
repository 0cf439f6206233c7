//! zc: zero-compress byte-buffer toolkit
//!
//! Commands:
//!   checksum <file>...        - CRC-32 of each file
//!   compare <a> <b>           - lexicographic order of two files
//!   find <file> <pattern>     - offset of the first occurrence of a pattern
//!   entropy <file>...         - bits/byte, content class, compression advice
//!   scan <file>               - per-block checksum/entropy report with duplicates
//!   backend                   - configured/available checksum backends and CPU features
//!   config show               - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::cmp::Ordering;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use zc_accel::Backend;
use zc_core::{BackendPreference, LogFormat, ZcConfig};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "zc",
    version,
    about = "zero-compress byte-buffer toolkit",
    long_about = "zc: checksum, compare, search, and entropy-profile files with the zero-compress primitives"
)]
struct Cli {
    /// Path to zc.toml configuration file
    #[arg(long, short = 'c', env = "ZC_CONFIG", default_value = "zc.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long, env = "ZC_LOG")]
    log: Option<String>,

    /// Log format; overrides config
    #[arg(long, env = "ZC_LOG_FORMAT")]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Json,
    Text,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Text => LogFormat::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the CRC-32 of each file (8 lowercase hex digits)
    Checksum {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compare two files byte-wise: less, equal, or greater
    Compare {
        a: PathBuf,
        b: PathBuf,
        /// Number of leading bytes to compare (default: length of the shorter file)
        #[arg(long)]
        len: Option<usize>,
    },

    /// Print the offset of the first occurrence of PATTERN in FILE
    ///
    /// Exits with status 1 when the pattern does not occur.
    Find {
        file: PathBuf,
        pattern: String,
        /// Interpret PATTERN as hex bytes (e.g. "deadbeef")
        #[arg(long)]
        hex: bool,
    },

    /// Print Shannon entropy, content class, and compression advice per file
    Entropy {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Analyze a file block by block
    Scan {
        file: PathBuf,
        /// Block size in bytes (overrides scan.block_size)
        #[arg(long)]
        block_size: Option<usize>,
        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active checksum backend and detected CPU features
    Backend,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

impl Commands {
    /// Commands that compute checksums and so need the configured backend
    fn uses_checksum(&self) -> bool {
        matches!(self, Commands::Checksum { .. } | Commands::Scan { .. })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli.log_format.map(LogFormat::from).unwrap_or(config.log.format);
    init_logging(&level, format);

    if !cli.config.exists() {
        warn!("config file not found: {}  (using defaults)", cli.config.display());
    }

    debug!(version = env!("CARGO_PKG_VERSION"), "zc starting");

    let mut out = std::io::stdout().lock();
    run(cli.command, &config, &cli.config, &mut out)
}

fn run(
    command: Commands,
    config: &ZcConfig,
    config_path: &Path,
    out: &mut impl Write,
) -> Result<()> {
    if command.uses_checksum() {
        let backend = zc_accel::init_backend(config.checksum.backend)
            .context("initializing checksum backend")?;
        debug!(backend = %backend, "checksum backend ready");
    }

    match command {
        Commands::Checksum { files } => cmd_checksum(&files, out),
        Commands::Compare { a, b, len } => cmd_compare(&a, &b, len, out),
        Commands::Find { file, pattern, hex } => {
            if !cmd_find(&file, &pattern, hex, out)? {
                out.flush()?;
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Entropy { files } => cmd_entropy(config, &files, out),
        Commands::Scan { file, block_size, json } => {
            cmd_scan(config, &file, block_size, json, out)
        }
        Commands::Backend => cmd_backend(config.checksum.backend, out),
        Commands::Config { action: ConfigAction::Show } => {
            cmd_config_show(config, config_path, out)
        }
    }
}

fn load_config(path: &Path) -> Result<ZcConfig> {
    ZcConfig::load(path).with_context(|| format!("loading config: {}", path.display()))
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

// ── `zc checksum` ─────────────────────────────────────────────────────────────

fn cmd_checksum(files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for path in files {
        let data = read_file(path)?;
        writeln!(out, "{:08x}  {}", zc_accel::checksum(&data), path.display())?;
    }
    Ok(())
}

// ── `zc compare` ──────────────────────────────────────────────────────────────

fn cmd_compare(a: &Path, b: &Path, len: Option<usize>, out: &mut impl Write) -> Result<()> {
    let (left, right) = (read_file(a)?, read_file(b)?);
    let len = len.unwrap_or_else(|| left.len().min(right.len()));
    let ordering = zc_accel::compare(&left, &right, len)
        .with_context(|| format!("comparing first {len} bytes"))?;
    writeln!(out, "{}", ordering_name(ordering))?;
    Ok(())
}

fn ordering_name(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "less",
        Ordering::Equal => "equal",
        Ordering::Greater => "greater",
    }
}

// ── `zc find` ─────────────────────────────────────────────────────────────────

/// Returns whether the pattern was found.
fn cmd_find(file: &Path, pattern: &str, is_hex: bool, out: &mut impl Write) -> Result<bool> {
    let needle = parse_pattern(pattern, is_hex)?;
    let haystack = read_file(file)?;
    match zc_accel::find(&haystack, &needle) {
        Some(offset) => {
            writeln!(out, "{offset}")?;
            Ok(true)
        }
        None => {
            writeln!(out, "not found")?;
            Ok(false)
        }
    }
}

fn parse_pattern(pattern: &str, is_hex: bool) -> Result<Vec<u8>> {
    if is_hex {
        hex::decode(pattern.trim()).with_context(|| format!("invalid hex pattern '{pattern}'"))
    } else {
        Ok(pattern.as_bytes().to_vec())
    }
}

// ── `zc entropy` ──────────────────────────────────────────────────────────────

fn cmd_entropy(config: &ZcConfig, files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for path in files {
        let data = read_file(path)?;
        let bits = zc_accel::entropy(&data);
        let class = zc_accel::classify_with(bits, &config.entropy);
        let advice = zc_accel::entropy::advise_for(data.len(), bits, &config.entropy);
        writeln!(out, "{bits:.4}  {class:<10}  {advice:<8}  {}", path.display())?;
    }
    Ok(())
}

// ── `zc scan` ─────────────────────────────────────────────────────────────────

fn cmd_scan(
    config: &ZcConfig,
    file: &Path,
    block_size: Option<usize>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let data = read_file(file)?;
    let mut settings = config.scan.clone();
    if let Some(size) = block_size {
        anyhow::ensure!(size > 0, "--block-size must be non-zero");
        settings.block_size = size;
    }

    let report = zc_accel::scan(&data, &settings, &config.entropy);
    info!(
        file = %file.display(),
        blocks = report.blocks.len(),
        duplicate_groups = report.duplicates.len(),
        "scan finished"
    );

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("serializing scan report to JSON")?;
        writeln!(out, "{rendered}")?;
        return Ok(());
    }

    writeln!(out, "file:        {}", file.display())?;
    writeln!(out, "size:        {} bytes", report.total_size)?;
    writeln!(out, "crc32:       {:08x}", report.checksum)?;
    writeln!(out, "entropy:     {:.4} bits/byte", report.entropy)?;
    writeln!(
        out,
        "blocks:      {} x {} bytes (min {:.3}, mean {:.3}, max {:.3})",
        report.blocks.len(),
        report.block_size,
        report.stats.min,
        report.stats.mean,
        report.stats.max
    )?;
    for class in zc_accel::EntropyClass::ALL {
        let count = report.stats.class_counts.get(class);
        if count > 0 {
            writeln!(out, "  {class:<10} {count:>8}  ({})", class.description())?;
        }
    }
    writeln!(out, "incompressible: {} bytes", report.incompressible_bytes())?;
    writeln!(
        out,
        "duplicates:  {} group(s), {} reclaimable bytes",
        report.duplicates.len(),
        report.duplicate_bytes()
    )?;
    for group in &report.duplicates {
        let indices: Vec<String> = group.blocks.iter().map(|i| i.to_string()).collect();
        writeln!(
            out,
            "  {:08x}  len {:>8}  blocks [{}]",
            group.checksum,
            group.length,
            indices.join(", ")
        )?;
    }
    Ok(())
}

// ── `zc backend` ──────────────────────────────────────────────────────────────

fn cmd_backend(preference: BackendPreference, out: &mut impl Write) -> Result<()> {
    writeln!(out, "configured: {}", preference_name(preference))?;
    match Backend::from_preference(preference) {
        Ok(backend) => writeln!(out, "selected:   {backend}")?,
        Err(e) => {
            warn!("configured checksum backend cannot be used: {e}");
            writeln!(out, "selected:   none ({e})")?;
        }
    }
    writeln!(out, "arch:       {}", std::env::consts::ARCH)?;
    writeln!(out, "backends:")?;
    for backend in [Backend::Table, Backend::Hardware] {
        let state = if backend.is_available() { "available" } else { "unavailable" };
        writeln!(out, "  {backend:<10} {state}")?;
    }
    writeln!(out, "cpu features:")?;
    for (name, detected) in zc_accel::checksum::cpu_features() {
        writeln!(out, "  {name:<10} {}", if detected { "yes" } else { "no" })?;
    }
    Ok(())
}

fn preference_name(preference: BackendPreference) -> &'static str {
    match preference {
        BackendPreference::Auto => "auto",
        BackendPreference::Table => "table",
        BackendPreference::Hardware => "hardware",
    }
}

// ── `zc config show` ──────────────────────────────────────────────────────────

fn cmd_config_show(config: &ZcConfig, config_path: &Path, out: &mut impl Write) -> Result<()> {
    if config_path.exists() {
        writeln!(out, "# Configuration from: {}", config_path.display())?;
    } else {
        writeln!(out, "# Configuration: defaults (no file at {})", config_path.display())?;
    }
    writeln!(out)?;
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    write!(out, "{rendered}")?;
    Ok(())
}
