mod client;
mod error;
mod wire;

use async_trait::async_trait;
use storage_core::{CatalogSnapshot, Organization};

pub use client::{CatalogClient, CatalogSettings};
pub use error::{CatalogError, Result};

/// Datastore registry pseudo-resource; never a resource table itself.
pub const TABLE_METADATA: &str = "_table_metadata";

/// Read-only access to the content catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Current datasets with their resources and owning organization.
    async fn current_datasets(&self) -> Result<CatalogSnapshot>;

    /// Every organization, with the `name` used to match graph principals.
    async fn organizations(&self) -> Result<Vec<Organization>>;

    /// Names of the tables registered as datastore resources.
    async fn datastore_tables(&self) -> Result<Vec<String>>;
}
