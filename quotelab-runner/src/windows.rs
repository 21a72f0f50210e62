//! Window splitting for walk-forward evaluation.
//!
//! Fixed-stride chronological windows over a bar series. Every window is fed
//! through a fresh simulator instance, so no position, cooldown, or breaker
//! state can leak between windows.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use quotelab_core::domain::BarSeries;
use quotelab_core::DataError;

/// One evaluation window: a contiguous bar index range with its time span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// 1-based chronological id among the kept windows.
    pub window_id: usize,
    pub start_index: usize,
    /// Exclusive end index.
    pub end_index: usize,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

impl WindowSpec {
    pub fn n_bars(&self) -> usize {
        self.end_index - self.start_index
    }
}

/// Split a series into fixed-stride windows of `window_days`.
///
/// Windows with fewer than `min_bars` bars are dropped; the result is capped
/// at the `max_windows` most recent windows, re-numbered chronologically.
/// If no window survives, the series is too short — a `DataError`, never a
/// silent truncation.
pub fn split(
    series: &BarSeries,
    window_days: i64,
    max_windows: usize,
    min_bars: usize,
) -> Result<Vec<WindowSpec>, DataError> {
    if series.is_empty() {
        return Err(DataError::TooShort {
            got: 0,
            need: min_bars,
        });
    }
    let bars = series.bars();
    let start = bars[0].timestamp;
    let end = bars[bars.len() - 1].timestamp;
    let stride = Duration::days(window_days.max(1));

    let mut windows = Vec::new();
    let mut cursor = start;
    let mut index = 0usize;
    while cursor <= end {
        let right = cursor + stride;
        let start_index = index;
        while index < bars.len() && bars[index].timestamp < right {
            index += 1;
        }
        let end_index = index;
        if end_index - start_index >= min_bars {
            windows.push(WindowSpec {
                window_id: 0, // assigned after capping
                start_index,
                end_index,
                start_utc: bars[start_index].timestamp,
                end_utc: bars[end_index - 1].timestamp,
            });
        }
        cursor = right;
    }

    if windows.is_empty() {
        return Err(DataError::TooShort {
            got: series.len(),
            need: min_bars,
        });
    }

    // Keep the most recent windows, then restore chronological numbering.
    if windows.len() > max_windows && max_windows > 0 {
        windows.drain(..windows.len() - max_windows);
    }
    for (i, w) in windows.iter_mut().enumerate() {
        w.window_id = i + 1;
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quotelab_core::domain::Bar;

    /// One bar every 15 minutes: 96 bars per day.
    fn series(days: i64) -> BarSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..days * 96)
            .map(|i| Bar::from_mid(start + Duration::minutes(15 * i), 100.0))
            .collect();
        BarSeries::new(bars).unwrap()
    }

    #[test]
    fn windows_are_chronological_and_non_overlapping() {
        let windows = split(&series(30), 5, 100, 200).unwrap();
        assert_eq!(windows.len(), 6);
        for pair in windows.windows(2) {
            assert!(pair[0].end_index <= pair[1].start_index);
            assert!(pair[0].end_utc < pair[1].start_utc);
        }
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.window_id, i + 1);
            assert_eq!(w.n_bars(), 5 * 96);
        }
    }

    #[test]
    fn cap_keeps_most_recent_windows() {
        let all = split(&series(30), 5, 100, 200).unwrap();
        let capped = split(&series(30), 5, 3, 200).unwrap();
        assert_eq!(capped.len(), 3);
        // The capped set is the tail of the full set, re-numbered.
        assert_eq!(capped[0].start_index, all[all.len() - 3].start_index);
        assert_eq!(capped[0].window_id, 1);
        assert_eq!(capped[2].window_id, 3);
    }

    #[test]
    fn short_tail_window_is_dropped() {
        // 23 days -> 4 full 5-day windows plus a 3-day tail below min_bars.
        let windows = split(&series(23), 5, 100, 400).unwrap();
        assert_eq!(windows.len(), 4);
    }

    #[test]
    fn too_short_series_errors() {
        assert!(matches!(
            split(&series(1), 5, 100, 200),
            Err(DataError::TooShort { .. })
        ));
        assert!(matches!(
            split(&BarSeries::default(), 5, 100, 200),
            Err(DataError::TooShort { got: 0, .. })
        ));
    }
}
