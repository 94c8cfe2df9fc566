//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! with `mockall` for service unit tests.
//!
//! - [`CountryRepository`] - Country collection access
//! - [`TokenRepository`] - API token authentication

pub mod country_repository;
pub mod token_repository;

pub use country_repository::CountryRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use country_repository::MockCountryRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
