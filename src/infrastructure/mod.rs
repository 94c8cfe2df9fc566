//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the domain's storage and caching contracts.
//!
//! # Modules
//!
//! - [`cache`] - Listing cache backends (in-process, Redis, no-op)
//! - [`persistence`] - PostgreSQL and in-memory repository implementations

pub mod cache;
pub mod persistence;
