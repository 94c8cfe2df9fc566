//! Handlers for the country resource.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header::LOCATION},
};
use serde_json::json;
use url::Url;

use crate::api::dto::country::{CountryRequest, CountryResponse, PatchCountryRequest};
use crate::api::dto::odata::ODataParams;
use crate::api::middleware::{Caller, RequireEditor};
use crate::error::AppError;
use crate::state::AppState;

/// Lists countries, either the cached full listing or an editor query.
///
/// # Endpoint
///
/// `GET /Countries`
/// `GET /Countries?$filter=name eq 'France'&$orderby=isoCode desc&$skip=0&$top=10`
///
/// # Modes
///
/// - **Listing** (no query options): every country ascending by name, served
///   from the listing cache. Anonymous access.
/// - **Query** (any of `$filter`, `$orderby`, `$skip`, `$top`): filtered,
///   sorted, paginated read straight from storage. Editor only.
///
/// # Errors
///
/// Returns 400 for malformed query options, 401/403 for query mode without
/// the editor capability.
pub async fn list_countries_handler(
    State(state): State<AppState>,
    caller: Caller,
    params: Result<Query<ODataParams>, QueryRejection>,
) -> Result<Json<Vec<CountryResponse>>, AppError> {
    let Query(params) = params.map_err(|e| {
        AppError::bad_request("Invalid query options", json!({ "reason": e.body_text() }))
    })?;

    if !params.is_query() {
        let listing = state.country_service.list_countries().await?;
        return Ok(Json(listing.into_iter().map(CountryResponse::from).collect()));
    }

    caller.require_editor()?;

    let countries = state
        .country_service
        .query_countries(&params.into())
        .await?;

    Ok(Json(countries.into_iter().map(CountryResponse::from).collect()))
}

/// Returns a single country.
///
/// # Endpoint
///
/// `GET /Countries/{entityId}`
///
/// # Errors
///
/// Returns 404 Not Found if no country has this key.
pub async fn get_country_handler(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Result<Json<CountryResponse>, AppError> {
    let country = state.country_service.get_country(&entity_id).await?;
    Ok(Json(country.into()))
}

/// Returns the number of stored countries as a bare JSON integer.
///
/// # Endpoint
///
/// `GET /Countries/$count`
pub async fn count_countries_handler(
    State(state): State<AppState>,
    _editor: RequireEditor,
) -> Result<Json<i64>, AppError> {
    Ok(Json(state.country_service.count_countries().await?))
}

/// Creates a country.
///
/// # Endpoint
///
/// `POST /Countries`
///
/// # Request Body
///
/// ```json
/// { "entityId": "fr", "name": "France", "isoCode": "FR" }
/// ```
///
/// # Response
///
/// `201 Created` with the stored country and `Location: /Countries/{entityId}`.
///
/// # Errors
///
/// Returns 400 for a missing or invalid body, 409 if the key already exists.
pub async fn create_country_handler(
    State(state): State<AppState>,
    _editor: RequireEditor,
    payload: Result<Json<Option<CountryRequest>>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<CountryResponse>), AppError> {
    let request = require_body(payload)?;

    let created = state.country_service.create_country(request.into()).await?;

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location_of(&created.entity_id)?);

    Ok((StatusCode::CREATED, headers, Json(created.into())))
}

/// Fully replaces a country.
///
/// # Endpoint
///
/// `PUT /Countries/{entityId}`
///
/// # Errors
///
/// Returns 400 if the body is invalid or its `entityId` differs from the
/// route key, 404 if no country has this key.
pub async fn replace_country_handler(
    State(state): State<AppState>,
    _editor: RequireEditor,
    Path(entity_id): Path<String>,
    payload: Result<Json<Option<CountryRequest>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let request = require_body(payload)?;

    state
        .country_service
        .replace_country(&entity_id, request.into())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Partially updates a country.
///
/// # Endpoint
///
/// `PATCH /Countries/{entityId}`
///
/// # Request Body
///
/// Any subset of `name` and `isoCode`; `entityId` may be repeated but not changed.
///
/// ```json
/// { "isoCode": "FRA" }
/// ```
///
/// # Errors
///
/// Returns 400 for unknown fields or a differing `entityId`, 404 if no country
/// has this key, 422 if the patched country would have an empty field.
pub async fn patch_country_handler(
    State(state): State<AppState>,
    _editor: RequireEditor,
    Path(entity_id): Path<String>,
    payload: Result<Json<Option<PatchCountryRequest>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let patch = require_body(payload)?.into_patch(&entity_id)?;

    state
        .country_service
        .patch_country(&entity_id, &patch)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a country.
///
/// # Endpoint
///
/// `DELETE /Countries/{entityId}`
///
/// # Errors
///
/// Returns 404 Not Found if no country has this key.
pub async fn delete_country_handler(
    State(state): State<AppState>,
    _editor: RequireEditor,
    Path(entity_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.country_service.delete_country(&entity_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unwraps a JSON body, treating a parse failure or a literal `null` as bad input.
fn require_body<T>(payload: Result<Json<Option<T>>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(Some(body))) => Ok(body),
        Ok(Json(None)) => Err(AppError::bad_request(
            "Request body is required",
            json!({}),
        )),
        Err(rejection) => Err(AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )),
    }
}

/// Relative URL of a country, with the key percent-encoded as one path segment.
fn location_of(entity_id: &str) -> Result<HeaderValue, AppError> {
    let mut url = Url::parse("http://localhost/Countries")
        .map_err(|e| AppError::internal("Failed to build Location", json!({ "reason": e.to_string() })))?;
    url.path_segments_mut()
        .map_err(|_| AppError::internal("Failed to build Location", json!({})))?
        .push(entity_id);

    HeaderValue::from_str(url.path())
        .map_err(|e| AppError::internal("Failed to build Location", json!({ "reason": e.to_string() })))
}
