//! "Next stocktake" entry point for host integrations.
//!
//! Wraps access checking and selection, and shapes the result the way the
//! host's API and dashboard widget consume it.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use stocktake_core::{ItemId, LocationId, PartId, UserId};
use stocktake_inventory::{InventoryQuery, StoreError};

use crate::access::{AccessError, Requester, authorize};
use crate::config::PolicyConfig;
use crate::selector::{Candidate, Selector};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StocktakeError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StocktakeError {
    /// HTTP status a hosting API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            StocktakeError::Access(AccessError::Unauthenticated) => 401,
            StocktakeError::Access(AccessError::NotInGroup(_)) => 403,
            StocktakeError::Store(_) => 500,
        }
    }

    /// Error payload, shaped like an empty [`NextStocktake`] plus a message.
    pub fn body(&self) -> serde_json::Value {
        json!({
            "items": [],
            "stocktake_date": null,
            "creation_date": null,
            "error": self.to_string(),
        })
    }
}

/// One selected item, flattened for API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockItemSummary {
    pub id: ItemId,
    pub part: PartId,
    pub part_name: String,
    pub location: Option<LocationId>,
    pub location_name: Option<String>,
    pub quantity: i64,
    pub stocktake_date: Option<NaiveDate>,
    pub stocktake_user: Option<UserId>,
    pub creation_date: Option<NaiveDate>,
}

impl From<Candidate> for StockItemSummary {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.item.id,
            part: c.item.part,
            part_name: c.part.name,
            location: c.item.location,
            location_name: c.location.map(|l| l.name),
            quantity: c.item.quantity,
            stocktake_date: c.item.stocktake_date,
            stocktake_user: c.item.stocktake_user,
            creation_date: c.creation_date,
        }
    }
}

/// Response for "what should I count next?".
///
/// `stocktake_date` and `creation_date` are those of the first (oldest) item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NextStocktake {
    pub items: Vec<StockItemSummary>,
    pub stocktake_date: Option<NaiveDate>,
    pub creation_date: Option<NaiveDate>,
}

impl NextStocktake {
    pub fn from_selection(selection: Vec<Candidate>) -> Self {
        let (stocktake_date, creation_date) = selection
            .first()
            .map(|c| (c.item.stocktake_date, c.creation_date))
            .unwrap_or_default();

        Self {
            items: selection.into_iter().map(StockItemSummary::from).collect(),
            stocktake_date,
            creation_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Dashboard widget descriptor for hosts with a plugin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardItem {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub settings: PolicyConfig,
}

/// Rolling stocktake service: policy + store handle.
#[derive(Debug, Clone)]
pub struct RollingStocktake<Q> {
    selector: Selector<Q>,
    config: PolicyConfig,
}

impl<Q> RollingStocktake<Q>
where
    Q: InventoryQuery,
{
    pub fn new(store: Q, config: PolicyConfig) -> Self {
        Self {
            selector: Selector::new(store),
            config,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Items the requester should count next.
    pub fn next(
        &self,
        requester: &Requester,
        today: NaiveDate,
    ) -> Result<NextStocktake, StocktakeError> {
        if let Err(e) = authorize(requester, &self.config) {
            tracing::info!(user = %requester.user, error = %e, "stocktake request denied");
            return Err(e.into());
        }

        let selection = self.selector.select(requester.user, today, &self.config)?;
        Ok(NextStocktake::from_selection(selection))
    }

    /// Widget shown on the requester's dashboard, if they may take part.
    pub fn dashboard_widget(&self, requester: &Requester) -> Option<DashboardItem> {
        authorize(requester, &self.config).ok()?;
        Some(DashboardItem {
            key: "rolling-stocktake-dashboard",
            title: "Rolling Stocktake Dashboard Item",
            description: "Display a stock item which needs to be counted next",
            icon: "ti:dashboard:outline",
            settings: self.config.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stocktake_core::GroupId;
    use stocktake_inventory::{InMemoryInventory, Location, Part, StockItem};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> (InMemoryInventory, ItemId) {
        let store = InMemoryInventory::new();
        let part = PartId::new();
        let loc = LocationId::new();
        store.insert_part(Part::new(part, "M3 Screw")).unwrap();
        store.insert_location(Location::root(loc, "Shelf A")).unwrap();

        let item = StockItem::new(ItemId::new(), part, Some(loc), 100);
        let id = item.id;
        store.insert_item(item).unwrap();
        store
            .record_tracking(id, Utc.with_ymd_and_hms(2023, 6, 1, 9, 30, 0).unwrap())
            .unwrap();
        (store, id)
    }

    #[test]
    fn next_reports_anchor_dates_and_names() {
        let (store, id) = seeded();
        let service = RollingStocktake::new(store, PolicyConfig::default());
        let requester = Requester::authenticated(UserId::new());

        let next = service.next(&requester, day(2024, 1, 10)).unwrap();
        assert_eq!(next.items.len(), 1);
        assert_eq!(next.items[0].id, id);
        assert_eq!(next.items[0].part_name, "M3 Screw");
        assert_eq!(next.items[0].location_name.as_deref(), Some("Shelf A"));
        assert_eq!(next.stocktake_date, None);
        assert_eq!(next.creation_date, Some(day(2023, 6, 1)));
    }

    #[test]
    fn next_denies_users_outside_the_group() {
        let (store, _) = seeded();
        let group = GroupId::new();
        let config = PolicyConfig::default().with_allowed_group(Some(group));
        let service = RollingStocktake::new(store, config);

        let err = service
            .next(&Requester::authenticated(UserId::new()), day(2024, 1, 10))
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(
            err.body()["error"],
            "User does not have permission to perform stocktake operations"
        );
        assert_eq!(err.body()["items"], json!([]));
    }

    #[test]
    fn empty_selection_serializes_with_null_dates() {
        let store = InMemoryInventory::new();
        let service = RollingStocktake::new(store, PolicyConfig::default());

        let next = service
            .next(&Requester::authenticated(UserId::new()), day(2024, 1, 10))
            .unwrap();
        assert!(next.is_empty());
        assert_eq!(
            serde_json::to_value(&next).unwrap(),
            json!({ "items": [], "stocktake_date": null, "creation_date": null })
        );
    }

    #[test]
    fn anonymous_requests_map_to_unauthenticated() {
        let (store, _) = seeded();
        let service = RollingStocktake::new(store, PolicyConfig::default());

        let err = service
            .next(&Requester::anonymous(UserId::new()), day(2024, 1, 10))
            .unwrap_err();
        assert_eq!(err, StocktakeError::Access(AccessError::Unauthenticated));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn store_failures_map_to_server_error() {
        let err = StocktakeError::from(StoreError::Malformed("dangling part".to_string()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.body()["error"], "malformed inventory record: dangling part");
    }

    #[test]
    fn dashboard_widget_follows_access_rules() {
        let (store, _) = seeded();
        let group = GroupId::new();
        let config = PolicyConfig::default().with_allowed_group(Some(group));
        let service = RollingStocktake::new(store, config);

        assert!(service.dashboard_widget(&Requester::authenticated(UserId::new())).is_none());
        let anonymous = Requester::anonymous(UserId::new()).in_group(group);
        assert!(service.dashboard_widget(&anonymous).is_none());

        let widget = service
            .dashboard_widget(&Requester::authenticated(UserId::new()).in_group(group))
            .unwrap();
        assert_eq!(widget.key, "rolling-stocktake-dashboard");
        assert_eq!(widget.title, "Rolling Stocktake Dashboard Item");
        assert_eq!(widget.settings.allowed_group, Some(group));
    }
}
