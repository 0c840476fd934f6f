//! Inventory read model (parts, locations, stock items, tracking history).
//!
//! The records here are owned and persisted by the surrounding inventory
//! system. This crate only describes their shape and the read interface the
//! stocktake selector needs; it never decides which item to count.

pub mod in_memory;
pub mod item;
pub mod location;
pub mod part;
pub mod query;

pub use in_memory::InMemoryInventory;
pub use item::{StockItem, StockStatus, TrackingEntry};
pub use location::Location;
pub use part::Part;
pub use query::{InventoryQuery, StoreError, StoreResult};
