use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};

use stocktake_core::{DomainError, DomainResult, Entity, ItemId, LocationId, PartId, UserId};

use crate::query::{InventoryQuery, StoreError, StoreResult};
use crate::{Location, Part, StockItem, TrackingEntry};

#[derive(Debug, Default)]
struct Tables {
    parts: HashMap<PartId, Part>,
    locations: HashMap<LocationId, Location>,
    children: HashMap<LocationId, Vec<LocationId>>,
    // Ordered so listings are stable across calls.
    items: BTreeMap<ItemId, StockItem>,
    tracking: HashMap<ItemId, Vec<TrackingEntry>>,
}

/// In-memory inventory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    inner: RwLock<Tables>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("inventory lock poisoned".to_string()))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| DomainError::validation("inventory lock poisoned"))
    }

    pub fn insert_part(&self, part: Part) -> DomainResult<()> {
        let mut t = self.write()?;
        t.parts.insert(*part.id(), part);
        Ok(())
    }

    /// Insert or replace a location. The parent, if any, must already exist.
    pub fn insert_location(&self, location: Location) -> DomainResult<()> {
        let mut t = self.write()?;
        if let Some(parent) = location.parent {
            if !t.locations.contains_key(&parent) {
                return Err(DomainError::validation(format!("unknown parent location {parent}")));
            }
        }

        if let Some(previous) = t.locations.get(&location.id).and_then(|l| l.parent) {
            if let Some(siblings) = t.children.get_mut(&previous) {
                siblings.retain(|c| *c != location.id);
            }
        }
        if let Some(parent) = location.parent {
            t.children.entry(parent).or_default().push(location.id);
        }
        t.locations.insert(*location.id(), location);
        Ok(())
    }

    /// Insert or replace a stock item. Its part and location must already exist.
    pub fn insert_item(&self, item: StockItem) -> DomainResult<()> {
        let mut t = self.write()?;
        if !t.parts.contains_key(&item.part) {
            return Err(DomainError::validation(format!("unknown part {}", item.part)));
        }
        if let Some(loc) = item.location {
            if !t.locations.contains_key(&loc) {
                return Err(DomainError::validation(format!("unknown location {loc}")));
            }
        }
        t.items.insert(*item.id(), item);
        Ok(())
    }

    pub fn record_tracking(&self, item: ItemId, date: DateTime<Utc>) -> DomainResult<()> {
        let mut t = self.write()?;
        if !t.items.contains_key(&item) {
            return Err(DomainError::not_found());
        }
        t.tracking.entry(item).or_default().push(TrackingEntry::new(item, date));
        Ok(())
    }

    /// Record a completed count. This is the host system's write path; the
    /// selector itself never calls it.
    pub fn record_stocktake(
        &self,
        item: ItemId,
        user: UserId,
        date: NaiveDate,
    ) -> DomainResult<()> {
        let mut t = self.write()?;
        let record = t.items.get_mut(&item).ok_or(DomainError::NotFound)?;
        record.stocktake_date = Some(date);
        record.stocktake_user = Some(user);
        tracing::debug!(item = %item, user = %user, %date, "stocktake recorded");
        Ok(())
    }
}

impl InventoryQuery for InMemoryInventory {
    fn count_stocktakes(&self, user: UserId, date: NaiveDate) -> StoreResult<usize> {
        let t = self.read()?;
        Ok(t.items
            .values()
            .filter(|i| i.stocktake_date == Some(date) && i.stocktake_user == Some(user))
            .count())
    }

    fn in_stock_items(&self) -> StoreResult<Vec<StockItem>> {
        let t = self.read()?;
        Ok(t.items.values().filter(|i| i.is_in_stock()).cloned().collect())
    }

    fn part(&self, id: PartId) -> StoreResult<Option<Part>> {
        Ok(self.read()?.parts.get(&id).cloned())
    }

    fn location(&self, id: LocationId) -> StoreResult<Option<Location>> {
        Ok(self.read()?.locations.get(&id).cloned())
    }

    fn earliest_tracking_date(&self, item: ItemId) -> StoreResult<Option<NaiveDate>> {
        let t = self.read()?;
        Ok(t.tracking
            .get(&item)
            .and_then(|entries| entries.iter().map(TrackingEntry::day).min()))
    }

    fn location_with_descendants(&self, id: LocationId) -> StoreResult<HashSet<LocationId>> {
        let t = self.read()?;
        let mut out = HashSet::new();
        if !t.locations.contains_key(&id) {
            return Ok(out);
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            // Each node is expanded once, so a corrupted parent cycle cannot loop.
            if !out.insert(next) {
                continue;
            }
            if let Some(children) = t.children.get(&next) {
                stack.extend(children.iter().copied());
            }
        }
        Ok(out)
    }
}
