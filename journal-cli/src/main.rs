//! Journal CLI: candle server, chart queries, and store management.
//!
//! Commands:
//! - `serve`: run the HTTP server over the Parquet candle store
//! - `candles`: build one chart series and print it as JSON
//! - `import`: load a CSV of native candles into the store
//! - `seed`: write a deterministic synthetic series for development
//! - `status`: report stored symbols, ranges and candle counts

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use journal_core::data::{
    canonicalize, read_csv, synthetic_candles, CandleStore, IngestReport, ParquetStore,
    StoreMeta,
};
use journal_core::domain::{Candle, Timeframe, NATIVE_FRAME_MS};
use journal_core::engine::{CandleService, ChartRequest};
use journal_server::ServerConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// 2024-01-01T00:00:00Z
const DEFAULT_SEED_START_MS: i64 = 1_704_067_200_000;

#[derive(Parser)]
#[command(
    name = "journal",
    about = "Trade journal candle engine: chart server and candle store tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve {
        /// Path to a TOML server config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Candle store directory (overrides the config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Bind host (overrides the config file).
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides the config file).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Build one chart series and print it as JSON.
    Candles {
        symbol: String,

        /// Range start, ms since epoch (inclusive).
        #[arg(long)]
        start: i64,

        /// Range end, ms since epoch (exclusive).
        #[arg(long)]
        end: i64,

        /// Timeframe token, e.g. 15s, 1m, 4h, 1d.
        #[arg(long, default_value = "15s")]
        timeframe: String,

        /// Candle store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Import a `time,open,high,low,close,volume` CSV of 15s candles.
    Import {
        symbol: String,

        csv: PathBuf,

        /// Merge with the stored series instead of replacing it. Imported
        /// rows win on equal timestamps.
        #[arg(long, default_value_t = false)]
        merge: bool,

        /// Candle store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Write a deterministic random-walk series.
    Seed {
        symbol: String,

        /// First candle time, ms since epoch. Defaults to 2024-01-01.
        #[arg(long, default_value_t = DEFAULT_SEED_START_MS)]
        start: i64,

        /// Number of 15s candles. Defaults to one day.
        #[arg(long, default_value_t = 5_760)]
        count: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Opening price of the first candle.
        #[arg(long, default_value_t = 100.0)]
        price: f64,

        /// Candle store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Report stored symbols, ranges and candle counts.
    Status {
        /// Candle store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            data_dir,
            host,
            port,
        } => run_serve(config, data_dir, host, port),
        Commands::Candles {
            symbol,
            start,
            end,
            timeframe,
            data_dir,
        } => run_candles(&symbol, start, end, &timeframe, data_dir),
        Commands::Import {
            symbol,
            csv,
            merge,
            data_dir,
        } => run_import(&symbol, &csv, merge, data_dir),
        Commands::Seed {
            symbol,
            start,
            count,
            seed,
            price,
            data_dir,
        } => run_seed(&symbol, start, count, seed, price, data_dir),
        Commands::Status { data_dir } => run_status(&data_dir),
    }
}

fn run_serve(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ServerConfig::from_file(&path)?,
        None => ServerConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(journal_server::serve(config))?;
    Ok(())
}

fn run_candles(symbol: &str, start: i64, end: i64, timeframe: &str, data_dir: PathBuf) -> Result<()> {
    let timeframe: Timeframe = timeframe.parse()?;
    let service = CandleService::new(Arc::new(ParquetStore::new(data_dir)));
    let candles = service.chart(symbol, &ChartRequest::new(start, end, timeframe))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "candles": candles }))?
    );
    Ok(())
}

fn run_import(symbol: &str, csv: &Path, merge: bool, data_dir: PathBuf) -> Result<()> {
    let store = ParquetStore::new(data_dir);
    let imported = read_csv(csv).with_context(|| format!("failed to read {}", csv.display()))?;
    // Gate on the series file; a missing sidecar must not drop stored candles.
    let existing = if merge && store.is_symbol_supported(symbol)? {
        store.load(symbol)?
    } else {
        Vec::new()
    };

    let report = canonicalize(merge_series(imported, existing));
    if report.candles.is_empty() {
        bail!("no usable candles in {}", csv.display());
    }

    let meta = store.write(symbol, &report.candles, "csv")?;
    log_report(&report);
    log_meta(&meta);
    Ok(())
}

fn run_seed(
    symbol: &str,
    start: i64,
    count: usize,
    seed: u64,
    price: f64,
    data_dir: PathBuf,
) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let store = ParquetStore::new(data_dir);
    let candles = synthetic_candles(start, count, seed, price);
    let meta = store.write(symbol, &candles, "synthetic")?;
    log_meta(&meta);
    Ok(())
}

fn run_status(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        println!("Store directory does not exist: {}", data_dir.display());
        return Ok(());
    }

    let store = ParquetStore::new(data_dir);
    let symbols = store.list_symbols()?;
    if symbols.is_empty() {
        println!("Store is empty: {}", data_dir.display());
        return Ok(());
    }

    println!("Store: {}", data_dir.display());
    println!("Symbols: {}", symbols.len());
    println!();
    println!(
        "{:<10} {:<43} {:>10} {:<10}",
        "Symbol", "Range (UTC)", "Candles", "Source"
    );
    println!("{}", "-".repeat(76));
    for symbol in &symbols {
        match store.meta(symbol) {
            Some(meta) => println!(
                "{:<10} {:<43} {:>10} {:<10}",
                symbol,
                format!("{} to {}", format_ms(meta.first_time), format_ms(meta.last_time)),
                meta.candle_count,
                meta.source
            ),
            None => println!("{:<10} {:<43}", symbol, "(no meta)"),
        }
    }
    Ok(())
}

/// Imported rows first, so canonicalization keeps them over stored duplicates.
fn merge_series(imported: Vec<Candle>, existing: Vec<Candle>) -> Vec<Candle> {
    let mut all = imported;
    all.extend(existing);
    all
}

fn log_report(report: &IngestReport) {
    tracing::info!(
        kept = report.kept,
        dropped = report.dropped(),
        duplicates = report.duplicates,
        off_grid = report.misaligned,
        grid_secs = NATIVE_FRAME_MS / 1000,
        invalid = report.insane,
        "import canonicalized"
    );
}

fn log_meta(meta: &StoreMeta) {
    tracing::info!(
        symbol = %meta.symbol,
        candles = meta.candle_count,
        first = %format_ms(meta.first_time),
        last = %format_ms(meta.last_time),
        hash = &meta.data_hash[..meta.data_hash.len().min(12)],
        source = %meta.source,
        "stored series"
    );
}

fn format_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}
