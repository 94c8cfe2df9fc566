//! API route configuration.
//!
//! Every country route runs behind [`crate::api::middleware::auth::layer`],
//! which resolves the caller; editor-only handlers enforce the capability
//! through [`crate::api::middleware::RequireEditor`].

use crate::api::handlers::{
    count_countries_handler, create_country_handler, delete_country_handler,
    get_country_handler, list_countries_handler, patch_country_handler, replace_country_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{Router, middleware, routing::get};

/// Country routes.
///
/// # Endpoints
///
/// - `GET    /Countries`             - Cached listing, or editor query with `$filter` etc.
/// - `POST   /Countries`             - Create a country
/// - `GET    /Countries/$count`      - Number of countries
/// - `GET    /Countries/{entityId}`  - Fetch one country
/// - `PUT    /Countries/{entityId}`  - Replace a country
/// - `PATCH  /Countries/{entityId}`  - Partially update a country
/// - `DELETE /Countries/{entityId}`  - Delete a country
pub fn country_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/Countries",
            get(list_countries_handler).post(create_country_handler),
        )
        .route("/Countries/$count", get(count_countries_handler))
        .route(
            "/Countries/{entity_id}",
            get(get_country_handler)
                .put(replace_country_handler)
                .patch(patch_country_handler)
                .delete(delete_country_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}
