use serde::{Deserialize, Serialize};

use stocktake_core::{Entity, LocationId};

/// A node in the storage location tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub parent: Option<LocationId>,
    /// External locations (e.g. stock held at a supplier or a customer site).
    pub external: bool,
}

impl Location {
    pub fn root(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            external: false,
        }
    }

    pub fn child_of(id: LocationId, name: impl Into<String>, parent: LocationId) -> Self {
        Self {
            id,
            name: name.into(),
            parent: Some(parent),
            external: false,
        }
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
