//! Day Replay Engine
//!
//! Walks every calendar day of a partition's observed window. Each day runs
//! arrivals, then price changes, then the snapshot, then departures, so a
//! listing is counted on both its first and its last day.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::types::DailyStatistic;

use super::error::{ReplayError, ReplayResult};
use super::reducer::reduce;
use super::registry::ListingRegistry;

/// Iterator yielding one `DailyStatistic` per day of the window
///
/// Stops after the first error. A price change left unapplied once the
/// window is exhausted is yielded as a final error.
#[derive(Debug)]
pub struct DayReplay {
    registry: ListingRegistry,
    active: HashSet<String>,
    today: NaiveDate,
    last_day: NaiveDate,
    window_done: bool,
    done: bool,
}

impl DayReplay {
    pub fn new(registry: ListingRegistry) -> Self {
        let (today, last_day, done) = match registry.window() {
            Some((first, last)) => (first, last, false),
            None => (NaiveDate::MIN, NaiveDate::MIN, true),
        };

        Self {
            registry,
            active: HashSet::new(),
            today,
            last_day,
            window_done: false,
            done,
        }
    }

    fn collect_arrivals(&mut self) {
        while let Some(id) = self.registry.pop_arrival(self.today) {
            self.active.insert(id);
        }
    }

    fn apply_price_changes(&mut self) -> ReplayResult<()> {
        while let Some(change) = self.registry.pop_change(self.today) {
            // Anything dated before today was never applied on its own day.
            if change.effective_date != self.today || !self.active.contains(&change.listing_id) {
                return Err(ReplayError::OrphanPriceChange { event: change });
            }
            match self.registry.listing_mut(&change.listing_id) {
                Some(listing) => listing.current_price = change.new_price,
                None => return Err(ReplayError::OrphanPriceChange { event: change }),
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> ReplayResult<DailyStatistic> {
        let mut prices: Vec<i64> = self
            .active
            .iter()
            .filter_map(|id| self.registry.listing(id))
            .map(|listing| listing.current_price)
            .collect();

        reduce(self.today, &mut prices)
    }

    fn remove_departures(&mut self) {
        while let Some(id) = self.registry.pop_departure(self.today) {
            self.active.remove(&id);
        }
    }

    fn step(&mut self) -> ReplayResult<DailyStatistic> {
        self.collect_arrivals();
        self.apply_price_changes()?;
        let stat = self.snapshot()?;
        self.remove_departures();
        Ok(stat)
    }
}

impl Iterator for DayReplay {
    type Item = ReplayResult<DailyStatistic>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.window_done {
            self.done = true;
            return self
                .registry
                .pop_pending_change()
                .map(|event| Err(ReplayError::OrphanPriceChange { event }));
        }

        let result = self.step();

        if result.is_err() {
            self.done = true;
        } else {
            match self.today.succ_opt() {
                Some(next) if next <= self.last_day => self.today = next,
                _ => self.window_done = true,
            }
        }

        Some(result)
    }
}

impl std::iter::FusedIterator for DayReplay {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Listing, PartitionData, PriceChangeEvent};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn replay(listings: Vec<Listing>, changes: Vec<PriceChangeEvent>) -> DayReplay {
        DayReplay::new(ListingRegistry::build(PartitionData::new(listings, changes)).unwrap())
    }

    #[test]
    fn test_empty_registry_yields_nothing() {
        let mut days = DayReplay::new(ListingRegistry::default());
        assert!(days.next().is_none());
    }

    #[test]
    fn test_one_statistic_per_day_then_fused() {
        let mut days = replay(vec![Listing::new("A", 10, day(1), day(3))], vec![]);

        for d in 1..=3 {
            assert_eq!(days.next().unwrap().unwrap().date, day(d));
        }
        assert!(days.next().is_none());
        assert!(days.next().is_none());
    }

    #[test]
    fn test_stale_change_is_orphan_even_when_listing_is_active() {
        let mut days = replay(
            vec![Listing::new("A", 10, day(3), day(4))],
            vec![PriceChangeEvent::new("A", 10, 12, day(1))],
        );

        let err = days.next().unwrap().unwrap_err();
        assert!(matches!(err, ReplayError::OrphanPriceChange { ref event } if event.effective_date == day(1)));
        assert!(days.next().is_none());
    }

    #[test]
    fn test_change_past_window_end_is_reported_last() {
        let mut days = replay(
            vec![Listing::new("A", 10, day(1), day(2))],
            vec![PriceChangeEvent::new("A", 10, 12, day(9))],
        );

        assert!(days.next().unwrap().is_ok());
        assert!(days.next().unwrap().is_ok());
        let err = days.next().unwrap().unwrap_err();
        assert!(matches!(err, ReplayError::OrphanPriceChange { ref event } if event.effective_date == day(9)));
        assert!(days.next().is_none());
    }

    #[test]
    fn test_change_on_arrival_day_applies_before_snapshot() {
        let stats: Vec<_> = replay(
            vec![Listing::new("A", 10, day(1), day(2))],
            vec![PriceChangeEvent::new("A", 10, 20, day(1))],
        )
        .collect::<ReplayResult<_>>()
        .unwrap();

        assert_eq!(stats[0].mean_price, 20);
        assert_eq!(stats[1].mean_price, 20);
    }

    #[test]
    fn test_change_on_departure_day_is_counted() {
        let stats: Vec<_> = replay(
            vec![Listing::new("A", 10, day(1), day(2))],
            vec![PriceChangeEvent::new("A", 10, 15, day(2))],
        )
        .collect::<ReplayResult<_>>()
        .unwrap();

        assert_eq!(stats[1].median_price, 15);
    }

    #[test]
    fn test_change_after_departure_is_orphan() {
        let mut days = replay(
            vec![
                Listing::new("A", 10, day(1), day(1)),
                Listing::new("B", 10, day(1), day(3)),
            ],
            vec![PriceChangeEvent::new("A", 10, 12, day(2))],
        );

        assert!(days.next().unwrap().is_ok());
        let err = days.next().unwrap().unwrap_err();
        assert!(matches!(err, ReplayError::OrphanPriceChange { ref event } if event.listing_id == "A"));
        assert!(days.next().is_none());
    }

    #[test]
    fn test_gap_in_window_is_empty_active_set() {
        let mut days = replay(
            vec![
                Listing::new("A", 10, day(1), day(1)),
                Listing::new("B", 10, day(3), day(3)),
            ],
            vec![],
        );

        assert!(days.next().unwrap().is_ok());
        assert_eq!(
            days.next().unwrap().unwrap_err(),
            ReplayError::EmptyActiveSet { date: day(2) }
        );
        assert!(days.next().is_none());
    }

    #[test]
    fn test_multiple_changes_same_day_apply_in_order() {
        let stats: Vec<_> = replay(
            vec![Listing::new("A", 10, day(1), day(1))],
            vec![
                PriceChangeEvent::new("A", 10, 11, day(1)),
                PriceChangeEvent::new("A", 11, 13, day(1)),
            ],
        )
        .collect::<ReplayResult<_>>()
        .unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].mean_price, 13);
    }
}
