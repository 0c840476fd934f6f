//! `rolling-stocktake`
//!
//! **Responsibility:** decide which stock item(s) a user should count next as
//! part of a continuous (rolling) stocktake.
//!
//! - Pure read/selection over the inventory store; nothing is written.
//! - Policy is passed in explicitly as a [`PolicyConfig`].
//! - Identity and group checks belong to the caller ([`access`]).

pub mod access;
pub mod config;
pub mod selector;
pub mod service;

pub use access::{AccessError, Requester, authorize};
pub use config::{ConfigError, PolicyConfig, SettingDescriptor, StocktakeScope};
pub use selector::{
    Candidate, Selector, candidates, expand, is_candidate, quota_exhausted, rank, select,
};
pub use service::{
    DashboardItem, NextStocktake, RollingStocktake, StockItemSummary, StocktakeError,
};
