//! Bar and BarSeries — the fundamental market data units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// OHLCV bar for a single instrument at a fixed interval.
///
/// `mid_price` is derived on ingest as the midpoint of the bar's range and is
/// the reference price for quoting, marking inventory, and liquidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub mid_price: f64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            mid_price: (high + low) / 2.0,
        }
    }

    /// Build a bar from a single reference price (flat range).
    ///
    /// Used by synthetic series and tests where only a mid path matters.
    pub fn from_mid(timestamp: DateTime<Utc>, mid: f64) -> Self {
        Self {
            timestamp,
            open: mid,
            high: mid,
            low: mid,
            close: mid,
            volume: 0.0,
            mid_price: mid,
        }
    }

    /// Basic OHLC sanity check: high >= low, range contains open/close,
    /// all prices positive and finite.
    pub fn is_sane(&self) -> bool {
        let fields = [self.open, self.high, self.low, self.close, self.mid_price];
        if fields.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// An ordered, validated series of bars.
///
/// Construction validates chronology and price sanity so the simulator never
/// has to re-check them bar by bar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and wrap a bar vector.
    ///
    /// Fails with `DataError` on an out-of-order timestamp or an insane bar —
    /// malformed input is rejected up front, never silently truncated.
    pub fn new(bars: Vec<Bar>) -> Result<Self, DataError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(DataError::MalformedBar {
                    index: i,
                    timestamp: bar.timestamp,
                });
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(DataError::OutOfOrder {
                    index: i,
                    timestamp: bar.timestamp,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// Sub-series over a bar index range [start, end).
    ///
    /// The slice is re-wrapped without re-validation — a valid series stays
    /// valid under slicing.
    pub fn slice(&self, start: usize, end: usize) -> BarSeries {
        let end = end.min(self.bars.len());
        let start = start.min(end);
        BarSeries {
            bars: self.bars[start..end].to_vec(),
        }
    }

    /// Per-bar simple returns of the mid price. First element is 0.0.
    pub fn returns(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.bars.len()];
        for i in 1..self.bars.len() {
            let prev = self.bars[i - 1].mid_price;
            if prev > 0.0 {
                out[i] = (self.bars[i].mid_price - prev) / prev;
            }
        }
        out
    }
}
