use std::time::Duration;

use futures::{StreamExt, TryStreamExt, stream};
use storage_core::{CatalogSnapshot, Component, UsageRecord};
use tracing::debug;

use super::PROBE_CONCURRENCY;
use crate::bounded::bounded;
use crate::error::Result;
use crate::locality::LocalUrlPolicy;
use crate::store::ResourceStore;

/// Byte sizes of the files the catalog keeps in its own upload store.
pub struct FilesystemProbe {
    policy: LocalUrlPolicy,
    store: ResourceStore,
    call_timeout: Duration,
}

impl FilesystemProbe {
    pub fn new(policy: LocalUrlPolicy, store: ResourceStore, call_timeout: Duration) -> Self {
        Self {
            policy,
            store,
            call_timeout,
        }
    }

    /// Stats the backing file of every locally stored resource in `snapshot`.
    ///
    /// A local resource without its file fails the whole scan.
    pub async fn scan(&self, snapshot: &CatalogSnapshot) -> Result<Vec<UsageRecord>> {
        let local: Vec<String> = snapshot
            .resources()
            .filter(|(_, resource)| self.policy.holds(resource))
            .map(|(_, resource)| resource.id.clone())
            .collect();
        debug!(
            resources = snapshot.resource_count(),
            local = local.len(),
            "scanning upload store"
        );

        stream::iter(local)
            .map(|resource_id| self.stat(resource_id))
            .buffered(PROBE_CONCURRENCY)
            .try_collect()
            .await
    }

    async fn stat(&self, resource_id: String) -> Result<UsageRecord> {
        let bytes = bounded(
            self.call_timeout,
            "file stat",
            self.store.file_size(&resource_id),
        )
        .await?;
        Ok(UsageRecord::new(resource_id, Component::Filesystem, bytes))
    }
}
