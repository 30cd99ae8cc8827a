use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use storage_catalog::CatalogSource;
use storage_core::{
    CatalogSnapshot, OrganizationTotals, UnattributedUsage, UsageRecord, UsageReport, UsageTotals,
};
use tracing::{debug, info, warn};

use crate::bounded::bounded;
use crate::error::Result;
use crate::owners::{GraphOwnerMatcher, OwnershipIndex};
use crate::probes::{FilesystemProbe, GraphProbe, GraphScan, RelationalProbe};
use crate::totals::{fold_global, fold_per_organization, fold_unattributed};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// Upper bound for every single catalog, database, graph or file call.
    pub call_timeout: Duration,
    /// Graph principal name to organization id, consulted before name matching.
    pub principal_map: BTreeMap<String, String>,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            principal_map: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Needs {
    graph_scan: bool,
    triple_total: bool,
}

struct Collected {
    index: OwnershipIndex,
    filesystem: Vec<UsageRecord>,
    database: Vec<UsageRecord>,
    graphs: GraphScan,
    triple_total: u64,
}

impl Collected {
    fn records(&self) -> impl Iterator<Item = &UsageRecord> {
        self.filesystem.iter().chain(self.database.iter())
    }
}

/// Runs the probes against one catalog snapshot and folds their output into
/// global, per-organization and unattributed totals. Nothing is cached between
/// calls.
pub struct UsageAggregator {
    catalog: Arc<dyn CatalogSource>,
    filesystem: FilesystemProbe,
    relational: RelationalProbe,
    graph: GraphProbe,
    settings: AggregatorSettings,
}

impl UsageAggregator {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        filesystem: FilesystemProbe,
        relational: RelationalProbe,
        graph: GraphProbe,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            catalog,
            filesystem,
            relational,
            graph,
            settings,
        }
    }

    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let snapshot = bounded(
            self.settings.call_timeout,
            "catalog dataset listing",
            self.catalog.current_datasets(),
        )
        .await?;
        debug!(
            datasets = snapshot.datasets.len(),
            resources = snapshot.resource_count(),
            "catalog snapshot loaded"
        );
        Ok(snapshot)
    }

    pub async fn used_space(&self) -> Result<UsageTotals> {
        let snapshot = self.snapshot().await?;
        self.aggregate_global(&snapshot).await
    }

    pub async fn used_space_per_org(&self) -> Result<OrganizationTotals> {
        let snapshot = self.snapshot().await?;
        self.aggregate_per_organization(&snapshot).await
    }

    pub async fn unattributed_space(&self) -> Result<UnattributedUsage> {
        let snapshot = self.snapshot().await?;
        self.aggregate_unattributed(&snapshot).await
    }

    pub async fn usage_report(&self) -> Result<UsageReport> {
        let snapshot = self.snapshot().await?;
        self.aggregate_report(&snapshot).await
    }

    /// Everything stored, whether or not an organization owns it.
    pub async fn aggregate_global(&self, snapshot: &CatalogSnapshot) -> Result<UsageTotals> {
        let started = Instant::now();
        info!("computing global usage");
        let collected = self
            .collect(snapshot, Needs {
                graph_scan: false,
                triple_total: true,
            })
            .await?;
        let totals = fold_global(collected.records(), collected.triple_total);
        info!(
            filesystem = totals.filesystem,
            database = totals.database,
            triplestore = totals.triplestore,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "global usage computed"
        );
        Ok(totals)
    }

    pub async fn aggregate_per_organization(
        &self,
        snapshot: &CatalogSnapshot,
    ) -> Result<OrganizationTotals> {
        let started = Instant::now();
        info!("computing usage per organization");
        let collected = self
            .collect(snapshot, Needs {
                graph_scan: true,
                triple_total: false,
            })
            .await?;
        let totals = fold_per_organization(
            &collected.index,
            collected.records(),
            &collected.graphs.records,
        );
        info!(
            organizations = totals.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "usage per organization computed"
        );
        Ok(totals)
    }

    pub async fn aggregate_unattributed(
        &self,
        snapshot: &CatalogSnapshot,
    ) -> Result<UnattributedUsage> {
        let started = Instant::now();
        info!("computing unattributed usage");
        let collected = self.collect(snapshot, Self::everything()).await?;
        let usage = unattributed(&collected);
        info!(
            resources = usage.resources.len(),
            graphs = usage.graphs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "unattributed usage computed"
        );
        Ok(usage)
    }

    /// Global, per-organization and unattributed usage from one pass over the
    /// backends, so the three views describe the same state.
    pub async fn aggregate_report(&self, snapshot: &CatalogSnapshot) -> Result<UsageReport> {
        let started = Instant::now();
        info!("computing usage report");
        let collected = self.collect(snapshot, Self::everything()).await?;
        let report = UsageReport {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            global: fold_global(collected.records(), collected.triple_total),
            per_organization: fold_per_organization(
                &collected.index,
                collected.records(),
                &collected.graphs.records,
            ),
            unattributed: unattributed(&collected),
        };
        info!(
            organizations = report.per_organization.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "usage report computed"
        );
        Ok(report)
    }

    fn everything() -> Needs {
        Needs {
            graph_scan: true,
            triple_total: true,
        }
    }

    async fn collect(&self, snapshot: &CatalogSnapshot, needs: Needs) -> Result<Collected> {
        let limit = self.settings.call_timeout;
        let index = OwnershipIndex::build(snapshot);

        let (tables, organizations) = tokio::try_join!(
            bounded(limit, "datastore registry", self.catalog.datastore_tables()),
            async {
                if needs.graph_scan {
                    bounded(limit, "organization listing", self.catalog.organizations())
                        .await
                        .map(Some)
                } else {
                    Ok(None)
                }
            },
        )?;
        let matcher = organizations
            .map(|organizations| GraphOwnerMatcher::new(&organizations, &self.settings.principal_map));

        let (filesystem, database, graphs, triple_total) = tokio::try_join!(
            self.filesystem.scan(snapshot),
            self.relational.scan(&tables),
            async {
                match &matcher {
                    Some(matcher) => self.graph.scan(matcher).await,
                    None => Ok(GraphScan::default()),
                }
            },
            async {
                if needs.triple_total {
                    self.graph.scan_total().await
                } else {
                    Ok(0)
                }
            },
        )?;

        let collected = Collected {
            index,
            filesystem,
            database,
            graphs,
            triple_total,
        };
        log_orphans(&collected);
        Ok(collected)
    }
}

fn unattributed(collected: &Collected) -> UnattributedUsage {
    fold_unattributed(
        &collected.index,
        collected.records(),
        &collected.graphs.records,
        &collected.graphs.unattributed,
        collected.triple_total,
    )
}

fn log_orphans(collected: &Collected) {
    let mut orphans = 0usize;
    for record in collected.records() {
        if collected.index.owner_of(&record.resource_id).is_none() {
            orphans += 1;
            debug!(
                resource_id = %record.resource_id,
                component = %record.component,
                magnitude = record.magnitude,
                "record has no owning organization"
            );
        }
    }
    if orphans > 0 {
        warn!(orphans, "records without an owning organization left out of per-organization totals");
    }
}
