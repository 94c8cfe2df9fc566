//! Helper functions used across the application.
//!
//! - [`odata`] - `$filter` / `$orderby` string parsing
pub mod odata;
