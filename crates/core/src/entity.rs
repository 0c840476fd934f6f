//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every record read from the inventory store is an entity: two snapshots with
/// the same id describe the same physical thing, even if their fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
