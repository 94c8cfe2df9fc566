//! DTOs for the country resource.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::entities::{Country, CountryChange, CountryPatch, CountryReference, NewCountry};
use crate::error::AppError;

/// External representation of a country. The storage identity is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryResponse {
    pub entity_id: String,
    pub name: String,
    pub iso_code: String,
}

impl From<Country> for CountryResponse {
    fn from(country: Country) -> Self {
        Self {
            entity_id: country.entity_id,
            name: country.name,
            iso_code: country.iso_code,
        }
    }
}

impl From<CountryReference> for CountryResponse {
    fn from(reference: CountryReference) -> Self {
        Self {
            entity_id: reference.entity_id,
            name: reference.name,
            iso_code: reference.iso_code,
        }
    }
}

/// Request body for `POST /Countries` and `PUT /Countries/{entityId}`.
///
/// Missing fields deserialize as empty strings so that they surface as
/// validation failures naming the field instead of a generic parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountryRequest {
    pub entity_id: String,
    pub name: String,
    pub iso_code: String,
}

impl From<CountryRequest> for NewCountry {
    fn from(request: CountryRequest) -> Self {
        NewCountry {
            entity_id: request.entity_id,
            name: request.name,
            iso_code: request.iso_code,
        }
    }
}

/// Request body for `PATCH /Countries/{entityId}`.
///
/// - **Absent** field: left unchanged
/// - **`null`**: cleared, which then fails the required-field check
/// - **Value**: set
///
/// `entityId` may be sent but must equal the route key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatchCountryRequest {
    pub entity_id: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub iso_code: Option<Option<String>>,
}

impl PatchCountryRequest {
    /// Converts the body into field changes for the country at `route_key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the body names a different `entityId`.
    pub fn into_patch(self, route_key: &str) -> Result<CountryPatch, AppError> {
        if let Some(entity_id) = &self.entity_id
            && entity_id != route_key
        {
            return Err(AppError::bad_request(
                "entityId cannot be changed",
                json!({ "route": route_key, "body": entity_id }),
            ));
        }

        let mut changes = Vec::new();
        if let Some(name) = self.name {
            changes.push(CountryChange::SetName(name.unwrap_or_default()));
        }
        if let Some(iso_code) = self.iso_code {
            changes.push(CountryChange::SetIsoCode(iso_code.unwrap_or_default()));
        }

        Ok(CountryPatch::new(changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_missing_fields_default_to_empty() {
        let request: CountryRequest = serde_json::from_str(r#"{"entityId":"fr"}"#).unwrap();

        assert_eq!(request.entity_id, "fr");
        assert!(request.name.is_empty());
        assert!(request.iso_code.is_empty());
    }

    #[test]
    fn test_patch_absent_null_and_value() {
        let request: PatchCountryRequest =
            serde_json::from_str(r#"{"name":null,"isoCode":"FRA"}"#).unwrap();

        let patch = request.into_patch("fr").unwrap();

        assert_eq!(
            patch.changes(),
            &[
                CountryChange::SetName(String::new()),
                CountryChange::SetIsoCode("FRA".to_string()),
            ]
        );
    }

    #[test]
    fn test_patch_empty_body_has_no_changes() {
        let request: PatchCountryRequest = serde_json::from_str("{}").unwrap();
        assert!(request.into_patch("fr").unwrap().is_empty());
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result = serde_json::from_str::<PatchCountryRequest>(r#"{"capital":"Paris"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_entity_id_must_match_route() {
        let same: PatchCountryRequest = serde_json::from_str(r#"{"entityId":"fr"}"#).unwrap();
        assert!(same.into_patch("fr").is_ok());

        let other: PatchCountryRequest = serde_json::from_str(r#"{"entityId":"de"}"#).unwrap();
        assert!(matches!(
            other.into_patch("fr"),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_response_is_camel_case() {
        let response = CountryResponse::from(Country::new(
            4,
            "fr".to_string(),
            "France".to_string(),
            "FR".to_string(),
        ));

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"entityId": "fr", "name": "France", "isoCode": "FR"})
        );
    }
}
