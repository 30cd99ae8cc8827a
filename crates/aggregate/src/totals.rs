//! Pure folds from probe output to totals. Nothing here touches a backend.

use storage_core::{
    Component, OrganizationTotals, OrphanRecord, UnattributedGraph, UnattributedUsage,
    UsageRecord, UsageTotals,
};

use crate::owners::OwnershipIndex;
use crate::probes::AttributedGraph;

/// Attributed usage per organization. Records without an owner are skipped and
/// organizations left at zero are dropped.
pub fn fold_per_organization<'a>(
    index: &OwnershipIndex,
    records: impl IntoIterator<Item = &'a UsageRecord>,
    graphs: &[AttributedGraph],
) -> OrganizationTotals {
    let mut totals = OrganizationTotals::new();
    for record in records {
        if let Some(owner) = index.owner_of(&record.resource_id) {
            totals
                .entry(owner.to_string())
                .or_default()
                .add(record.component, record.magnitude);
        }
    }
    for graph in graphs {
        totals
            .entry(graph.organization_id.clone())
            .or_default()
            .add(Component::Triplestore, graph.record.magnitude);
    }
    totals.retain(|_, usage| !usage.is_zero());
    totals
}

/// Filesystem and database come straight from the records, orphans included.
/// The triplestore figure is the engine-wide total, not a sum of graphs.
pub fn fold_global<'a>(
    records: impl IntoIterator<Item = &'a UsageRecord>,
    triplestore_total: u64,
) -> UsageTotals {
    let mut totals = UsageTotals::default();
    for record in records {
        if record.component != Component::Triplestore {
            totals.add(record.component, record.magnitude);
        }
    }
    totals.triplestore = triplestore_total;
    totals
}

/// Usage counted globally but missing from every organization.
pub fn fold_unattributed<'a>(
    index: &OwnershipIndex,
    records: impl IntoIterator<Item = &'a UsageRecord>,
    graphs: &[AttributedGraph],
    omitted_graphs: &[UnattributedGraph],
    triplestore_total: u64,
) -> UnattributedUsage {
    let mut usage = UnattributedUsage::default();
    for record in records {
        if index.owner_of(&record.resource_id).is_none() {
            usage.totals.add(record.component, record.magnitude);
            usage.resources.push(OrphanRecord::from(record));
        }
    }
    let attributed = graphs
        .iter()
        .fold(0u64, |acc, graph| acc.saturating_add(graph.record.magnitude));
    usage.totals.triplestore = triplestore_total.saturating_sub(attributed);
    usage.graphs = omitted_graphs.to_vec();
    usage
}
