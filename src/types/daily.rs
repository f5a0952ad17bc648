//! Daily statistic records and the per-partition series

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Price statistics over the active listings of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatistic {
    pub date: NaiveDate,
    pub mean_price: i64,
    pub median_price: i64,
    pub active_count: usize,
}

impl DailyStatistic {
    /// Compact `M/D,mean,median,count` line used by the plotting scripts
    pub fn csv_line(&self) -> String {
        format!(
            "{}/{},{},{},{}",
            self.date.month(),
            self.date.day(),
            self.mean_price,
            self.median_price,
            self.active_count
        )
    }
}

impl std::fmt::Display for DailyStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.mean_price, self.median_price, self.active_count, self.date
        )
    }
}

/// Ordered daily statistics for one partition
///
/// Dates are strictly ascending with no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySeries {
    days: Vec<DailyStatistic>,
}

impl DailySeries {
    pub fn new(days: Vec<DailyStatistic>) -> Self {
        Self { days }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyStatistic> {
        self.days.iter()
    }

    pub fn last(&self) -> Option<&DailyStatistic> {
        self.days.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.iter().map(|d| d.date).collect()
    }

    pub fn mean_prices(&self) -> Vec<i64> {
        self.days.iter().map(|d| d.mean_price).collect()
    }

    pub fn median_prices(&self) -> Vec<i64> {
        self.days.iter().map(|d| d.median_price).collect()
    }

    pub fn active_counts(&self) -> Vec<usize> {
        self.days.iter().map(|d| d.active_count).collect()
    }
}

impl std::fmt::Display for DailySeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for day in &self.days {
            writeln!(f, "{}", day)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = &'a DailyStatistic;
    type IntoIter = std::slice::Iter<'a, DailyStatistic>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}
