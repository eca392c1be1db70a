use async_trait::async_trait;

use concierge_core::types::{CourseRow, Locale};

use crate::error::Result;

/// Read access to the remote store backing the catalog.
///
/// Implementations fetch or fail; they never cache and never return partial
/// data as success.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// All course rows in store order.
    async fn fetch_courses(&self) -> Result<Vec<CourseRow>>;

    /// The whole knowledge text for `locale`.
    async fn fetch_knowledge(&self, locale: Locale) -> Result<String>;
}
