//! Inventory snapshot ingestion.
//!
//! The engine does not talk to Azure; collectors hand it a fully-populated
//! snapshot. This module handles that hand-off:
//! - [`snapshot`] - the snapshot record shape
//! - [`cache`] - reading a snapshot from a JSON cache file

mod cache;
mod snapshot;

// Re-export public types and functions
pub use cache::read_inventory_cache;
pub use snapshot::Inventory;
