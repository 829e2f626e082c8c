use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Ordered bar history for one timeframe.
///
/// Timestamps are strictly increasing; construction through [`BarSeries::new`]
/// or deserialization rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> CoreResult<Self> {
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(CoreError::UnorderedBars { index: pos + 1 });
        }
        Ok(Self { bars })
    }

    fn from_sorted(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The last `n` bars (or all of them if there are fewer).
    pub fn tail(&self, n: usize) -> BarSeries {
        let start = self.bars.len().saturating_sub(n);
        Self::from_sorted(self.bars[start..].to_vec())
    }

    /// Bars with `timestamp <= t`, capped at the most recent `limit`.
    pub fn up_to(&self, t: DateTime<Utc>, limit: usize) -> BarSeries {
        let end = self.bars.partition_point(|b| b.timestamp <= t);
        let start = end.saturating_sub(limit);
        Self::from_sorted(self.bars[start..end].to_vec())
    }

    /// Borrowed view over `[start, end)`, clamped to the series bounds.
    pub fn window(&self, start: usize, end: usize) -> SeriesWindow<'_> {
        let e = end.min(self.bars.len());
        let s = start.min(e);
        SeriesWindow {
            bars: &self.bars[s..e],
            start: s,
        }
    }

    /// Aggregate into larger buckets aligned to the Unix epoch.
    pub fn resample(&self, bucket: Duration) -> BarSeries {
        let bucket_secs = bucket.as_secs() as i64;
        if self.bars.is_empty() || bucket_secs == 0 {
            return self.clone();
        }
        let mut result: Vec<Bar> = Vec::new();

        for bar in &self.bars {
            let ts = bar.timestamp.timestamp();
            let bucket_start = ts - ts.rem_euclid(bucket_secs);
            let bucket_ts = DateTime::from_timestamp(bucket_start, 0).unwrap_or(bar.timestamp);

            if let Some(last) = result.last_mut() {
                if last.timestamp == bucket_ts {
                    last.high = last.high.max(bar.high);
                    last.low = last.low.min(bar.low);
                    last.close = bar.close;
                    last.volume += bar.volume;
                    continue;
                }
            }

            result.push(Bar {
                timestamp: bucket_ts,
                ..bar.clone()
            });
        }

        Self::from_sorted(result)
    }
}

impl TryFrom<Vec<Bar>> for BarSeries {
    type Error = CoreError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<BarSeries> for Vec<Bar> {
    fn from(series: BarSeries) -> Self {
        series.bars
    }
}

impl std::ops::Index<usize> for BarSeries {
    type Output = Bar;
    fn index(&self, index: usize) -> &Self::Output {
        &self.bars[index]
    }
}

/// Fixed-size, read-only view into a [`BarSeries`].
///
/// Remembers where it starts so positions can be mapped back to the source.
#[derive(Debug, Clone, Copy)]
pub struct SeriesWindow<'a> {
    bars: &'a [Bar],
    start: usize,
}

impl<'a> SeriesWindow<'a> {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Source index of the first bar in the view.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn highs_max(&self) -> f64 {
        self.bars
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn lows_min(&self) -> f64 {
        self.bars
            .iter()
            .map(|b| b.low)
            .fold(f64::INFINITY, f64::min)
    }
}
