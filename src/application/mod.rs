//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the cache abstraction, enforce the
//! resource rules, and give HTTP handlers a storage-neutral API.
//!
//! # Available Services
//!
//! - [`services::country_service::CountryService`] - Country CRUD, queries, and the listing cache
//! - [`services::auth_service::AuthService`] - API token authentication
//! - [`services::query_translator::QueryTranslator`] - `$filter`/`$orderby`/`$skip`/`$top` translation

pub mod services;
