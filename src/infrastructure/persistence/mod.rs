//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgCountryRepository`] / [`MemoryCountryRepository`] - Country collection
//! - [`PgTokenRepository`] / [`MemoryTokenRepository`] - API token storage and validation

pub mod memory_country_repository;
pub mod memory_token_repository;
pub mod pg_country_repository;
pub mod pg_token_repository;

pub use memory_country_repository::MemoryCountryRepository;
pub use memory_token_repository::MemoryTokenRepository;
pub use pg_country_repository::PgCountryRepository;
pub use pg_token_repository::PgTokenRepository;
