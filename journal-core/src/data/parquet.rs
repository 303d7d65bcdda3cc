//! Parquet candle store.
//!
//! Layout: `{data_dir}/candles_{SYMBOL}.parquet` with a
//! `{data_dir}/candles_{SYMBOL}.meta.json` sidecar.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Range reads through a lazy scan with a `time` predicate
//! - Metadata sidecar per symbol (hash, time range, source)

use super::store::{snap_to_native, validate_symbol, CandleStore, StoreError};
use crate::domain::Candle;
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "candles_";

/// Metadata sidecar for a stored symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub symbol: String,
    pub first_time: i64,
    pub last_time: i64,
    pub candle_count: usize,
    pub data_hash: String,
    pub source: String,
    pub written_at: NaiveDateTime,
}

/// Native candle series stored as one Parquet file per symbol.
pub struct ParquetStore {
    data_dir: PathBuf,
}

impl ParquetStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn series_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{FILE_PREFIX}{symbol}.parquet"))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{FILE_PREFIX}{symbol}.meta.json"))
    }

    /// Replace the stored series for a symbol.
    ///
    /// `candles` must be strictly ascending by time (see
    /// [`canonicalize`](super::ingest::canonicalize)).
    pub fn write(&self, symbol: &str, candles: &[Candle], source: &str) -> Result<StoreMeta, StoreError> {
        validate_symbol(symbol)?;
        let (first, last) = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => return Err(StoreError::Validation("no candles to store".into())),
        };
        if candles.windows(2).any(|w| w[0].time >= w[1].time) {
            return Err(StoreError::Validation(
                "candles must be strictly ascending by time".into(),
            ));
        }

        fs::create_dir_all(&self.data_dir)?;

        let meta = StoreMeta {
            symbol: symbol.to_string(),
            first_time: first,
            last_time: last,
            candle_count: candles.len(),
            data_hash: data_hash(candles)?,
            source: source.to_string(),
            written_at: chrono::Utc::now().naive_utc(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| StoreError::Meta(format!("serialize: {e}")))?;

        let path = self.series_path(symbol);
        let tmp_path = path.with_extension("parquet.tmp");
        let meta_path = self.meta_path(symbol);
        let meta_tmp_path = meta_path.with_extension("json.tmp");

        let mut df = candles_to_dataframe(candles)?;
        write_parquet(&mut df, &tmp_path)?;
        if let Err(e) = fs::write(&meta_tmp_path, meta_json) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io(e));
        }

        // The old sidecar must never describe the new data.
        match fs::remove_file(&meta_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                let _ = fs::remove_file(&meta_tmp_path);
                return Err(StoreError::Io(e));
            }
        }
        rename_into_place(&tmp_path, &path)?;
        rename_into_place(&meta_tmp_path, &meta_path)?;

        tracing::info!(
            symbol,
            candles = meta.candle_count,
            first = meta.first_time,
            last = meta.last_time,
            "wrote candle series"
        );

        Ok(meta)
    }

    /// Load the whole stored series for a symbol, ascending.
    pub fn load(&self, symbol: &str) -> Result<Vec<Candle>, StoreError> {
        validate_symbol(symbol)?;
        let path = self.series_path(symbol);
        if !path.exists() {
            return Err(StoreError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let df = LazyFrame::scan_parquet(&path, Default::default())
            .map_err(parquet_err("scan"))?
            .sort(["time"], SortMultipleOptions::default())
            .collect()
            .map_err(parquet_err("read"))?;
        dataframe_to_candles(&df)
    }

    /// Metadata sidecar for a symbol, if present and readable.
    pub fn meta(&self, symbol: &str) -> Option<StoreMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Symbols with a stored series, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, StoreError> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }
        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(symbol) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(".parquet"))
            {
                if validate_symbol(symbol).is_ok() {
                    symbols.push(symbol.to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

impl CandleStore for ParquetStore {
    fn name(&self) -> &str {
        "parquet"
    }

    fn is_symbol_supported(&self, symbol: &str) -> Result<bool, StoreError> {
        validate_symbol(symbol)?;
        Ok(self.series_path(symbol).is_file())
    }

    fn candles_in_range(
        &self,
        start_ms: i64,
        end_ms: i64,
        symbol: &str,
    ) -> Result<Vec<Candle>, StoreError> {
        validate_symbol(symbol)?;
        let path = self.series_path(symbol);
        if !path.exists() {
            return Err(StoreError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let start = snap_to_native(start_ms);
        let df = LazyFrame::scan_parquet(&path, Default::default())
            .map_err(parquet_err("scan"))?
            .filter(col("time").gt_eq(lit(start)).and(col("time").lt(lit(end_ms))))
            .sort(["time"], SortMultipleOptions::default())
            .collect()
            .map_err(parquet_err("range read"))?;

        let candles = dataframe_to_candles(&df)?;
        tracing::debug!(symbol, start, end = end_ms, rows = candles.len(), "range read");
        Ok(candles)
    }

    fn time_range(&self, symbol: &str) -> Result<Option<(i64, i64)>, StoreError> {
        validate_symbol(symbol)?;
        if let Some(meta) = self.meta(symbol) {
            return Ok(Some((meta.first_time, meta.last_time)));
        }
        if !self.series_path(symbol).exists() {
            return Ok(None);
        }
        let candles = self.load(symbol)?;
        Ok(candles
            .first()
            .zip(candles.last())
            .map(|(first, last)| (first.time, last.time)))
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn parquet_err(context: &'static str) -> impl Fn(PolarsError) -> StoreError {
    move |e| StoreError::Parquet(format!("{context}: {e}"))
}

/// BLAKE3 over the serialized series.
fn data_hash(candles: &[Candle]) -> Result<String, StoreError> {
    let bytes = serde_json::to_vec(candles)
        .map_err(|e| StoreError::Meta(format!("hash serialization: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn candles_to_dataframe(candles: &[Candle]) -> Result<DataFrame, StoreError> {
    let times: Vec<i64> = candles.iter().map(|c| c.time).collect();
    let opens: Vec<f64> = candles.iter().map(|c| c.open).collect();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

    DataFrame::new(vec![
        Column::new("time".into(), times),
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(parquet_err("dataframe creation"))
}

fn rename_into_place(tmp_path: &Path, path: &Path) -> Result<(), StoreError> {
    fs::rename(tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(tmp_path);
        StoreError::Io(e)
    })
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), StoreError> {
    let file = fs::File::create(path)?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(parquet_err("write parquet"))?;
    Ok(())
}

fn dataframe_to_candles(df: &DataFrame) -> Result<Vec<Candle>, StoreError> {
    for name in ["time", "open", "high", "low", "close", "volume"] {
        if df.column(name).is_err() {
            return Err(StoreError::Validation(format!("missing column '{name}'")));
        }
    }

    let time_ca = df
        .column("time")
        .and_then(|c| c.i64())
        .map_err(parquet_err("time column type"))?;
    let f64_col = |name: &'static str| {
        df.column(name)
            .and_then(|c| c.f64())
            .map_err(parquet_err(name))
    };
    let open_ca = f64_col("open")?;
    let high_ca = f64_col("high")?;
    let low_ca = f64_col("low")?;
    let close_ca = f64_col("close")?;
    let vol_ca = f64_col("volume")?;

    let n = df.height();
    let mut candles = Vec::with_capacity(n);
    for i in 0..n {
        let time = time_ca
            .get(i)
            .ok_or_else(|| StoreError::Validation(format!("null time at row {i}")))?;
        candles.push(Candle {
            time,
            open: open_ca.get(i).unwrap_or(f64::NAN),
            high: high_ca.get(i).unwrap_or(f64::NAN),
            low: low_ca.get(i).unwrap_or(f64::NAN),
            close: close_ca.get(i).unwrap_or(f64::NAN),
            volume: vol_ca.get(i).unwrap_or(0.0),
        });
    }

    Ok(candles)
}
