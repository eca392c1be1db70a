//! Course catalog: remote data gateway and the refreshable snapshot cache.
//!
//! The cache is the only component request handlers read from. It never
//! blocks readers on network I/O; refreshes happen on a background tick and
//! are coalesced so one invalidated instant costs one gateway round trip.

pub mod cache;
pub mod error;
pub mod gateway;
pub mod google;

pub use cache::{RefreshableCache, RefreshOutcome};
pub use error::{FetchError, Result};
pub use gateway::CatalogGateway;
pub use google::GoogleCatalogGateway;
