//! Selection of the next stock item(s) due for counting.
//!
//! Pipeline, each step short-circuiting to an empty result:
//! 1. quota check for the user's counts today
//! 2. candidate filter (in stock, countable part, optionally not external)
//! 3. staleness annotation (last count date, else creation date)
//! 4. anchor = oldest dated candidate
//! 5. scope expansion around the anchor
//!
//! Every step is a standalone function so it can be exercised on its own.
//! The whole pipeline is a read-only query: it never marks anything as counted.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDate;

use stocktake_core::{ItemId, LocationId, PartId, UserId};
use stocktake_inventory::{InventoryQuery, Location, Part, StockItem, StoreError, StoreResult};

use crate::config::{PolicyConfig, StocktakeScope};

/// An in-stock item that passed the filters, annotated with its creation date.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub item: StockItem,
    pub part: Part,
    pub location: Option<Location>,
    /// Date of the item's earliest tracking entry.
    pub creation_date: Option<NaiveDate>,
}

impl Candidate {
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    pub fn location_id(&self) -> Option<LocationId> {
        self.item.location
    }

    /// Last count date, else creation date.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.item.stocktake_date.or(self.creation_date)
    }

    /// Sort key: dated before undated, oldest first, then item id.
    fn staleness_key(&self) -> (bool, Option<NaiveDate>, ItemId) {
        let date = self.effective_date();
        (date.is_none(), date, self.item.id)
    }
}

/// True when a positive daily limit applies and the user has already reached it.
pub fn quota_exhausted<Q>(
    store: &Q,
    user: UserId,
    today: NaiveDate,
    config: &PolicyConfig,
) -> StoreResult<bool>
where
    Q: InventoryQuery + ?Sized,
{
    let Some(limit) = config.quota() else {
        return Ok(false);
    };
    let counted = store.count_stocktakes(user, today)?;
    tracing::debug!(user = %user, %today, counted, limit, "daily stocktake quota");
    Ok(counted >= limit as usize)
}

/// Candidate filter for a single item.
pub fn is_candidate(
    item: &StockItem,
    part: &Part,
    location: Option<&Location>,
    config: &PolicyConfig,
) -> bool {
    if !item.is_in_stock() || !part.is_countable() {
        return false;
    }
    if config.ignore_external && location.is_some_and(|l| l.external) {
        return false;
    }
    true
}

/// Build the filtered candidate set, annotated with creation dates.
pub fn candidates<Q>(store: &Q, config: &PolicyConfig) -> StoreResult<Vec<Candidate>>
where
    Q: InventoryQuery + ?Sized,
{
    let mut parts: HashMap<PartId, Part> = HashMap::new();
    let mut locations: HashMap<LocationId, Location> = HashMap::new();
    let mut out = Vec::new();

    for item in store.in_stock_items()? {
        let part = match parts.entry(item.part) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let part = store.part(item.part)?.ok_or_else(|| {
                    StoreError::Malformed(format!(
                        "item {} references unknown part {}",
                        item.id, item.part
                    ))
                })?;
                e.insert(part)
            }
        };

        let location = match item.location {
            None => None,
            Some(id) => Some(match locations.entry(id) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    let location = store.location(id)?.ok_or_else(|| {
                        StoreError::Malformed(format!(
                            "item {} references unknown location {id}",
                            item.id
                        ))
                    })?;
                    e.insert(location)
                }
            }),
        };

        if !is_candidate(&item, part, location.as_deref(), config) {
            continue;
        }

        let part = part.clone();
        let location = location.cloned();
        let creation_date = store.earliest_tracking_date(item.id)?;
        out.push(Candidate {
            item,
            part,
            location,
            creation_date,
        });
    }

    Ok(out)
}

/// Dated candidates, oldest first. Ties on date are broken by item id.
pub fn rank(candidates: &[Candidate]) -> Vec<&Candidate> {
    let mut ranked: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.effective_date().is_some())
        .collect();
    ranked.sort_by_key(|c| c.staleness_key());
    ranked
}

/// Expand the anchor into the set of items to count, according to `scope`.
///
/// Matches are drawn from the full candidate set, including candidates without
/// any date. The result is in staleness order, so the anchor comes first.
pub fn expand<Q>(
    store: &Q,
    anchor: &Candidate,
    candidates: &[Candidate],
    scope: StocktakeScope,
) -> StoreResult<Vec<Candidate>>
where
    Q: InventoryQuery + ?Sized,
{
    let same_part = |c: &&Candidate| c.item.part == anchor.item.part;

    let mut selected: Vec<Candidate> = match (scope, anchor.location_id()) {
        (StocktakeScope::Item, _) => return Ok(vec![anchor.clone()]),
        (StocktakeScope::All, _) => candidates.iter().filter(same_part).cloned().collect(),
        (StocktakeScope::Location | StocktakeScope::LocationWithSublocations, None) => candidates
            .iter()
            .filter(same_part)
            .filter(|c| c.location_id().is_none())
            .cloned()
            .collect(),
        (StocktakeScope::Location, Some(loc)) => candidates
            .iter()
            .filter(same_part)
            .filter(|c| c.location_id() == Some(loc))
            .cloned()
            .collect(),
        (StocktakeScope::LocationWithSublocations, Some(loc)) => {
            let subtree = store.location_with_descendants(loc)?;
            candidates
                .iter()
                .filter(same_part)
                .filter(|c| c.location_id().is_some_and(|l| subtree.contains(&l)))
                .cloned()
                .collect()
        }
    };

    selected.sort_by_key(|c| c.staleness_key());
    Ok(selected)
}

/// Run the full selection pipeline for `user` on `today`.
///
/// Always returns a list (possibly empty). Store failures propagate unchanged.
pub fn select<Q>(
    store: &Q,
    user: UserId,
    today: NaiveDate,
    config: &PolicyConfig,
) -> StoreResult<Vec<Candidate>>
where
    Q: InventoryQuery + ?Sized,
{
    if quota_exhausted(store, user, today, config)? {
        tracing::debug!(user = %user, "daily stocktake limit reached");
        return Ok(Vec::new());
    }

    let candidates = candidates(store, config)?;
    let Some(anchor) = rank(&candidates).first().copied() else {
        tracing::debug!(candidates = candidates.len(), "no dated stocktake candidates");
        return Ok(Vec::new());
    };

    tracing::debug!(
        anchor = %anchor.id(),
        effective_date = ?anchor.effective_date(),
        scope = %config.scope,
        candidates = candidates.len(),
        "stocktake anchor selected"
    );

    let selected = expand(store, anchor, &candidates, config.scope)?;
    tracing::debug!(selected = selected.len(), "stocktake selection complete");
    Ok(selected)
}

/// Stateless selector bound to an inventory store handle.
#[derive(Debug, Clone)]
pub struct Selector<Q> {
    store: Q,
}

impl<Q> Selector<Q>
where
    Q: InventoryQuery,
{
    pub fn new(store: Q) -> Self {
        Self { store }
    }

    pub fn select(
        &self,
        user: UserId,
        today: NaiveDate,
        config: &PolicyConfig,
    ) -> StoreResult<Vec<Candidate>> {
        select(&self.store, user, today, config)
    }
}
