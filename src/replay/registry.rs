//! Listing Registry
//!
//! Owns one `Listing` per id and three date-ordered cursors over them:
//! arrivals (by `first_seen`), departures (by `last_seen`) and price changes
//! (by `effective_date`). The arrival and departure queues hold ids that
//! look up into the same table, so a price set while a listing is active is
//! the one seen from either traversal.

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;

use crate::types::{Listing, PartitionData, PriceChangeEvent};

use super::error::{ReplayError, ReplayResult};

/// Per-partition listing table plus replay cursors
#[derive(Debug, Clone, Default)]
pub struct ListingRegistry {
    listings: HashMap<String, Listing>,
    baseline: HashMap<String, i64>,
    arrivals: VecDeque<String>,
    departures: VecDeque<String>,
    changes: VecDeque<PriceChangeEvent>,
}

impl ListingRegistry {
    /// Build the registry from a partition's listings and changes
    ///
    /// Listings must arrive sorted by `first_seen` and changes by
    /// `effective_date`; only per-row integrity is checked here.
    pub fn build(partition: PartitionData) -> ReplayResult<Self> {
        let PartitionData { listings, changes } = partition;

        debug_assert!(listings.windows(2).all(|w| w[0].first_seen <= w[1].first_seen));
        debug_assert!(changes
            .windows(2)
            .all(|w| w[0].effective_date <= w[1].effective_date));

        let baseline = Self::collect_baseline(&listings, &changes);

        let mut table = HashMap::with_capacity(listings.len());
        let mut arrivals = VecDeque::with_capacity(listings.len());
        let mut by_last_seen = Vec::with_capacity(listings.len());

        for listing in listings {
            if listing.first_seen > listing.last_seen {
                return Err(ReplayError::InvalidWindow {
                    id: listing.id,
                    first_seen: listing.first_seen,
                    last_seen: listing.last_seen,
                });
            }
            if table.contains_key(&listing.id) {
                return Err(ReplayError::DuplicateListing { id: listing.id });
            }

            arrivals.push_back(listing.id.clone());
            by_last_seen.push((listing.last_seen, listing.id.clone()));
            table.insert(listing.id.clone(), listing);
        }

        // Stable, so ties keep arrival order.
        by_last_seen.sort_by_key(|(last_seen, _)| *last_seen);
        let departures = by_last_seen.into_iter().map(|(_, id)| id).collect();

        Ok(Self {
            listings: table,
            baseline,
            arrivals,
            departures,
            changes: changes.into(),
        })
    }

    /// Baseline price per listing
    ///
    /// The `old_price` of a listing's earliest change when it has one, else
    /// its stored price. Assumes change history is complete for the window.
    fn collect_baseline(listings: &[Listing], changes: &[PriceChangeEvent]) -> HashMap<String, i64> {
        let mut baseline = HashMap::with_capacity(listings.len());

        for change in changes {
            baseline
                .entry(change.listing_id.clone())
                .or_insert(change.old_price);
        }
        for listing in listings {
            baseline
                .entry(listing.id.clone())
                .or_insert(listing.current_price);
        }

        baseline
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Observed window `(first_seen_min, last_seen_max)`, `None` when empty
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.listings.get(self.arrivals.front()?)?.first_seen;
        let last = self.listings.get(self.departures.back()?)?.last_seen;
        Some((first, last))
    }

    pub fn baseline(&self, id: &str) -> Option<i64> {
        self.baseline.get(id).copied()
    }

    pub fn listing(&self, id: &str) -> Option<&Listing> {
        self.listings.get(id)
    }

    pub(crate) fn listing_mut(&mut self, id: &str) -> Option<&mut Listing> {
        self.listings.get_mut(id)
    }

    /// Dequeue the next listing first seen on `today` and reset its price
    /// to baseline
    pub(crate) fn pop_arrival(&mut self, today: NaiveDate) -> Option<String> {
        let front = self.arrivals.front()?;
        if self.listings.get(front)?.first_seen != today {
            return None;
        }

        let id = self.arrivals.pop_front()?;
        let baseline = self.baseline.get(&id).copied();
        if let (Some(listing), Some(price)) = (self.listings.get_mut(&id), baseline) {
            listing.current_price = price;
        }
        Some(id)
    }

    /// Dequeue the next price change effective on or before `today`
    ///
    /// A change dated before `today` missed its day and is still returned,
    /// so the caller can reject it instead of leaving the queue stuck.
    pub(crate) fn pop_change(&mut self, today: NaiveDate) -> Option<PriceChangeEvent> {
        if self.changes.front()?.effective_date > today {
            return None;
        }
        self.changes.pop_front()
    }

    /// Dequeue a change still waiting once every day has been replayed
    pub(crate) fn pop_pending_change(&mut self) -> Option<PriceChangeEvent> {
        self.changes.pop_front()
    }

    /// Dequeue the next listing last seen on `today`
    pub(crate) fn pop_departure(&mut self, today: NaiveDate) -> Option<String> {
        let front = self.departures.front()?;
        if self.listings.get(front)?.last_seen != today {
            return None;
        }
        self.departures.pop_front()
    }
}
