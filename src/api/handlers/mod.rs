//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod countries;
pub mod health;

pub use countries::{
    count_countries_handler, create_country_handler, delete_country_handler,
    get_country_handler, list_countries_handler, patch_country_handler, replace_country_handler,
};
pub use health::health_handler;
