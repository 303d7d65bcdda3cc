//! CSV ingestion and canonicalization of native candles.

use super::store::StoreError;
use crate::domain::{Candle, NATIVE_FRAME_MS};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Outcome of canonicalizing a raw candle batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Canonical candles: strictly ascending, on the native grid, sane.
    #[serde(skip)]
    pub candles: Vec<Candle>,
    pub kept: usize,
    pub duplicates: usize,
    pub misaligned: usize,
    pub insane: usize,
}

impl IngestReport {
    pub fn dropped(&self) -> usize {
        self.duplicates + self.misaligned + self.insane
    }
}

/// Read `time,open,high,low,close,volume` rows from a CSV file with a header.
pub fn read_csv(path: &Path) -> Result<Vec<Candle>, StoreError> {
    let file = std::fs::File::open(path)?;
    read_csv_from(file)
}

/// Same as [`read_csv`] over any reader.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<Candle>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles = Vec::new();
    for row in rdr.deserialize() {
        let candle: Candle = row?;
        candles.push(candle);
    }
    Ok(candles)
}

/// Sort by time, then drop rows that cannot be served.
///
/// Duplicate timestamps keep the first occurrence in input order. Rows off the
/// 15-second grid and rows failing [`Candle::is_sane`] are dropped.
pub fn canonicalize(mut candles: Vec<Candle>) -> IngestReport {
    // Stable sort keeps input order among equal timestamps.
    candles.sort_by_key(|c| c.time);

    let mut report = IngestReport::default();
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());

    for candle in candles {
        if candle.time.rem_euclid(NATIVE_FRAME_MS) != 0 {
            report.misaligned += 1;
            continue;
        }
        if !candle.is_sane() {
            report.insane += 1;
            continue;
        }
        if out.last().is_some_and(|last| last.time == candle.time) {
            report.duplicates += 1;
            continue;
        }
        out.push(candle);
    }

    report.kept = out.len();
    report.candles = out;

    if report.dropped() > 0 {
        tracing::warn!(
            kept = report.kept,
            duplicates = report.duplicates,
            misaligned = report.misaligned,
            insane = report.insane,
            "dropped rows during canonicalization"
        );
    }

    report
}
