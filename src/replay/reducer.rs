//! Daily statistic reducer
//!
//! Mean and median use truncating integer division so results are exact and
//! reproducible across platforms.

use chrono::NaiveDate;

use crate::types::DailyStatistic;

use super::error::{ReplayError, ReplayResult};

/// Reduce the active prices of one day into a `DailyStatistic`
///
/// `prices` is sorted in place.
pub fn reduce(date: NaiveDate, prices: &mut [i64]) -> ReplayResult<DailyStatistic> {
    if prices.is_empty() {
        return Err(ReplayError::EmptyActiveSet { date });
    }

    prices.sort_unstable();

    Ok(DailyStatistic {
        date,
        mean_price: mean(prices),
        median_price: median(prices),
        active_count: prices.len(),
    })
}

fn mean(prices: &[i64]) -> i64 {
    let sum: i128 = prices.iter().map(|&p| p as i128).sum();
    (sum / prices.len() as i128) as i64
}

/// Median of a sorted, non-empty slice
fn median(sorted: &[i64]) -> i64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        ((sorted[mid - 1] as i128 + sorted[mid] as i128) / 2) as i64
    } else {
        sorted[mid]
    }
}
