//! Country entity, its creation input, reduced projection, and patch model.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stored country record.
///
/// `technical_id` is assigned by the storage layer and never leaves the
/// service; `entity_id` is the caller-assigned business key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct Country {
    pub technical_id: i64,
    #[validate(length(min = 1, message = "entityId is required"))]
    pub entity_id: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "isoCode is required"))]
    pub iso_code: String,
}

impl Country {
    pub fn new(technical_id: i64, entity_id: String, name: String, iso_code: String) -> Self {
        Self {
            technical_id,
            entity_id,
            name,
            iso_code,
        }
    }
}

/// Input data for creating or fully replacing a country.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewCountry {
    #[validate(length(min = 1, message = "entityId is required"))]
    pub entity_id: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "isoCode is required"))]
    pub iso_code: String,
}

impl NewCountry {
    /// Attaches an existing storage identity, producing a full record.
    pub fn with_technical_id(self, technical_id: i64) -> Country {
        Country::new(technical_id, self.entity_id, self.name, self.iso_code)
    }
}

/// Reduced view of a country holding only the externally visible fields.
///
/// This is the form kept in the listing cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryReference {
    pub entity_id: String,
    pub name: String,
    pub iso_code: String,
}

impl From<&Country> for CountryReference {
    fn from(country: &Country) -> Self {
        Self {
            entity_id: country.entity_id.clone(),
            name: country.name.clone(),
            iso_code: country.iso_code.clone(),
        }
    }
}

impl From<CountryReference> for Country {
    fn from(reference: CountryReference) -> Self {
        Country {
            entity_id: reference.entity_id,
            name: reference.name,
            iso_code: reference.iso_code,
            ..Country::default()
        }
    }
}

/// A single field-level change carried by a [`CountryPatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryChange {
    SetName(String),
    SetIsoCode(String),
}

/// An ordered set of field changes applied to a stored snapshot.
///
/// The business key is not patchable; changing it is modelled as delete + create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryPatch {
    changes: Vec<CountryChange>,
}

impl CountryPatch {
    pub fn new(changes: Vec<CountryChange>) -> Self {
        Self { changes }
    }

    pub fn changes(&self) -> &[CountryChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns a copy of `country` with every change applied in order.
    ///
    /// The identity fields (`technical_id`, `entity_id`) are carried over untouched.
    pub fn apply_to(&self, country: &Country) -> Country {
        let mut patched = country.clone();
        for change in &self.changes {
            match change {
                CountryChange::SetName(name) => patched.name = name.clone(),
                CountryChange::SetIsoCode(iso_code) => patched.iso_code = iso_code.clone(),
            }
        }
        patched
    }
}
