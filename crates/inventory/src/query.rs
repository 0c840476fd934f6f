use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use stocktake_core::{ItemId, LocationId, PartId, UserId};

use crate::{Location, Part, StockItem};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not serve the read.
    #[error("inventory store unavailable: {0}")]
    Unavailable(String),

    /// A record was inconsistent (e.g. dangling part or location reference).
    #[error("malformed inventory record: {0}")]
    Malformed(String),
}

/// Read access to the inventory system, as needed by the stocktake selector.
///
/// Implementations either succeed or fail atomically per call; callers add no
/// retry logic on top.
pub trait InventoryQuery: Send + Sync {
    /// Number of items last counted by `user` on `date`.
    fn count_stocktakes(&self, user: UserId, date: NaiveDate) -> StoreResult<usize>;

    /// All items satisfying the inventory system's in-stock predicate.
    fn in_stock_items(&self) -> StoreResult<Vec<StockItem>>;

    fn part(&self, id: PartId) -> StoreResult<Option<Part>>;

    fn location(&self, id: LocationId) -> StoreResult<Option<Location>>;

    /// Date of the oldest tracking entry for the item (its creation date).
    fn earliest_tracking_date(&self, item: ItemId) -> StoreResult<Option<NaiveDate>>;

    /// The location itself plus every location below it in the tree.
    ///
    /// Unknown ids yield an empty set.
    fn location_with_descendants(&self, id: LocationId) -> StoreResult<HashSet<LocationId>>;
}

impl<S> InventoryQuery for Arc<S>
where
    S: InventoryQuery + ?Sized,
{
    fn count_stocktakes(&self, user: UserId, date: NaiveDate) -> StoreResult<usize> {
        (**self).count_stocktakes(user, date)
    }

    fn in_stock_items(&self) -> StoreResult<Vec<StockItem>> {
        (**self).in_stock_items()
    }

    fn part(&self, id: PartId) -> StoreResult<Option<Part>> {
        (**self).part(id)
    }

    fn location(&self, id: LocationId) -> StoreResult<Option<Location>> {
        (**self).location(id)
    }

    fn earliest_tracking_date(&self, item: ItemId) -> StoreResult<Option<NaiveDate>> {
        (**self).earliest_tracking_date(item)
    }

    fn location_with_descendants(&self, id: LocationId) -> StoreResult<HashSet<LocationId>> {
        (**self).location_with_descendants(id)
    }
}

impl<S> InventoryQuery for &S
where
    S: InventoryQuery + ?Sized,
{
    fn count_stocktakes(&self, user: UserId, date: NaiveDate) -> StoreResult<usize> {
        (**self).count_stocktakes(user, date)
    }

    fn in_stock_items(&self) -> StoreResult<Vec<StockItem>> {
        (**self).in_stock_items()
    }

    fn part(&self, id: PartId) -> StoreResult<Option<Part>> {
        (**self).part(id)
    }

    fn location(&self, id: LocationId) -> StoreResult<Option<Location>> {
        (**self).location(id)
    }

    fn earliest_tracking_date(&self, item: ItemId) -> StoreResult<Option<NaiveDate>> {
        (**self).earliest_tracking_date(item)
    }

    fn location_with_descendants(&self, id: LocationId) -> StoreResult<HashSet<LocationId>> {
        (**self).location_with_descendants(id)
    }
}
