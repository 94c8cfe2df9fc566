//! Domain layer containing business entities and storage contracts.
//!
//! - [`entities`] - Core business data structures
//! - [`query`] - Storage-neutral filter/sort/paginate model
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers; services in [`crate::application::services`] orchestrate it.

pub mod entities;
pub mod query;
pub mod repositories;
