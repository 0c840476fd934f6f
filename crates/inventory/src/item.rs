use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stocktake_core::{Entity, ItemId, LocationId, PartId, UserId};

/// Quality/availability status of a stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    Ok,
    Attention,
    Damaged,
    Destroyed,
    Rejected,
    Lost,
    Quarantined,
    Returned,
}

impl StockStatus {
    /// Statuses for which the item is still physically on hand.
    pub fn is_in_stock(self) -> bool {
        matches!(self, StockStatus::Ok | StockStatus::Attention | StockStatus::Damaged)
    }
}

/// One countable physical stock unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: ItemId,
    pub part: PartId,
    pub location: Option<LocationId>,
    pub quantity: i64,
    pub status: StockStatus,
    /// Item is the output of a build order still in progress.
    pub is_building: bool,
    /// Item has been shipped or assigned to a customer.
    pub customer: Option<String>,
    /// Date of the last count, if the item was ever counted.
    pub stocktake_date: Option<NaiveDate>,
    /// Who performed the last count.
    pub stocktake_user: Option<UserId>,
}

impl StockItem {
    pub fn new(id: ItemId, part: PartId, location: Option<LocationId>, quantity: i64) -> Self {
        Self {
            id,
            part,
            location,
            quantity,
            status: StockStatus::Ok,
            is_building: false,
            customer: None,
            stocktake_date: None,
            stocktake_user: None,
        }
    }

    pub fn with_status(mut self, status: StockStatus) -> Self {
        self.status = status;
        self
    }

    pub fn counted(mut self, user: UserId, date: NaiveDate) -> Self {
        self.stocktake_user = Some(user);
        self.stocktake_date = Some(date);
        self
    }

    /// In-stock predicate as defined by the inventory system.
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
            && self.status.is_in_stock()
            && !self.is_building
            && self.customer.is_none()
    }
}

impl Entity for StockItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Historical event recorded against a stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub item: ItemId,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl TrackingEntry {
    pub fn new(item: ItemId, date: DateTime<Utc>) -> Self {
        Self { item, date, notes: None }
    }

    /// Calendar date of the event (UTC).
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}
