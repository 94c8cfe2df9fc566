//! Core domain entities.
//!
//! - [`Country`] - A stored country record
//! - [`NewCountry`] - Input for create and full replace
//! - [`CountryReference`] - Externally visible projection, used by the listing cache
//! - [`CountryPatch`] - Typed field-level changes for partial updates

pub mod country;

pub use country::{Country, CountryChange, CountryPatch, CountryReference, NewCountry};
