use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt, stream};
use storage_core::{Component, GraphOmission, UnattributedGraph, UsageRecord};
use storage_graph::{GraphError, GraphStore, PermissionCatalog};
use tracing::{debug, warn};

use super::PROBE_CONCURRENCY;
use crate::bounded::bounded;
use crate::error::{Backend, Result, UsageError};
use crate::owners::{GraphAttribution, GraphOwnerMatcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedGraph {
    pub organization_id: String,
    pub record: UsageRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphScan {
    pub records: Vec<AttributedGraph>,
    pub unattributed: Vec<UnattributedGraph>,
}

enum GraphOutcome {
    Attributed(AttributedGraph),
    Unattributed(UnattributedGraph),
}

/// Triple counts from the graph engine.
///
/// `scan_total` and `scan` answer different questions and are not expected to
/// agree: the total covers every graph, `scan` only the ones with a single
/// resolvable owner.
pub struct GraphProbe {
    store: Arc<dyn GraphStore>,
    permissions: Arc<dyn PermissionCatalog>,
    call_timeout: Duration,
}

fn triplestore_error(err: GraphError) -> UsageError {
    UsageError::backend(Backend::Triplestore, err)
}

fn permission_error(err: GraphError) -> UsageError {
    UsageError::backend(Backend::Permissions, err)
}

impl GraphProbe {
    pub fn new(
        store: Arc<dyn GraphStore>,
        permissions: Arc<dyn PermissionCatalog>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            permissions,
            call_timeout,
        }
    }

    /// Triples across all named graphs, from a single aggregate query.
    pub async fn scan_total(&self) -> Result<u64> {
        let total = bounded(self.call_timeout, "triple total", async {
            self.store.total_triples().await.map_err(triplestore_error)
        })
        .await?;
        debug!(total, "triplestore total counted");
        Ok(total)
    }

    /// Per-graph counts for the graphs `matcher` can attribute. Graphs it
    /// cannot are never counted and come back in `unattributed`.
    pub async fn scan(&self, matcher: &GraphOwnerMatcher) -> Result<GraphScan> {
        let graphs = bounded(self.call_timeout, "named graph listing", async {
            self.store.named_graphs().await.map_err(triplestore_error)
        })
        .await?;

        let outcomes: Vec<GraphOutcome> = stream::iter(graphs)
            .map(|graph| self.inspect(matcher, graph))
            .buffered(PROBE_CONCURRENCY)
            .try_collect()
            .await?;

        let mut scan = GraphScan::default();
        for outcome in outcomes {
            match outcome {
                GraphOutcome::Attributed(graph) => scan.records.push(graph),
                GraphOutcome::Unattributed(graph) => scan.unattributed.push(graph),
            }
        }
        debug!(
            attributed = scan.records.len(),
            unattributed = scan.unattributed.len(),
            "named graphs scanned"
        );
        Ok(scan)
    }

    async fn inspect(&self, matcher: &GraphOwnerMatcher, graph: String) -> Result<GraphOutcome> {
        let principals = bounded(self.call_timeout, "graph permission lookup", async {
            self.permissions
                .graph_principals(&graph)
                .await
                .map_err(permission_error)
        })
        .await?;

        match matcher.resolve(&principals) {
            GraphAttribution::Owned(organization_id) => {
                let triples = bounded(self.call_timeout, "graph triple count", async {
                    self.store.graph_triples(&graph).await.map_err(triplestore_error)
                })
                .await?;
                Ok(GraphOutcome::Attributed(AttributedGraph {
                    organization_id,
                    record: UsageRecord::new(graph, Component::Triplestore, triples),
                }))
            }
            GraphAttribution::Omitted(reason) => {
                match &reason {
                    GraphOmission::NoOwner => debug!(%graph, "graph has no owner"),
                    other => warn!(%graph, reason = ?other, "graph owner does not match one organization"),
                }
                Ok(GraphOutcome::Unattributed(UnattributedGraph { graph, reason }))
            }
        }
    }
}
