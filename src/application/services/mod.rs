//! Business logic services for the application layer.

pub mod auth_service;
pub mod country_service;
pub mod query_translator;

pub use auth_service::AuthService;
pub use country_service::CountryService;
pub use query_translator::{MarkerQueryTranslator, QueryTranslator};
