use serde::{Deserialize, Serialize};

use stocktake_core::{Entity, PartId};

/// A product definition. Stock items are physical instances of a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub active: bool,
    /// Virtual parts have no physical stock (services, labour, etc).
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
}

impl Part {
    pub fn new(id: PartId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            is_virtual: false,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn virtual_part(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Only active, physical parts take part in a stocktake.
    pub fn is_countable(&self) -> bool {
        self.active && !self.is_virtual
    }
}

impl Entity for Part {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
