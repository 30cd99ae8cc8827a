use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage backend a usage figure was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Filesystem,
    Database,
    Triplestore,
}

impl Component {
    pub const ALL: [Component; 3] = [
        Component::Filesystem,
        Component::Database,
        Component::Triplestore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Database => "database",
            Self::Triplestore => "triplestore",
        }
    }

    /// Bytes for filesystem and database, triple count for the triplestore.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Filesystem | Self::Database => "bytes",
            Self::Triplestore => "triples",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub filesystem: u64,
    pub database: u64,
    pub triplestore: u64,
}

impl UsageTotals {
    pub fn get(&self, component: Component) -> u64 {
        match component {
            Component::Filesystem => self.filesystem,
            Component::Database => self.database,
            Component::Triplestore => self.triplestore,
        }
    }

    pub fn add(&mut self, component: Component, amount: u64) {
        let slot = match component {
            Component::Filesystem => &mut self.filesystem,
            Component::Database => &mut self.database,
            Component::Triplestore => &mut self.triplestore,
        };
        *slot = slot.saturating_add(amount);
    }

    pub fn merge(self, other: UsageTotals) -> UsageTotals {
        UsageTotals {
            filesystem: self.filesystem.saturating_add(other.filesystem),
            database: self.database.saturating_add(other.database),
            triplestore: self.triplestore.saturating_add(other.triplestore),
        }
    }

    pub fn is_zero(&self) -> bool {
        Component::ALL.iter().all(|component| self.get(*component) == 0)
    }
}

pub fn sum_totals<'a, I>(totals: I) -> UsageTotals
where
    I: IntoIterator<Item = &'a UsageTotals>,
{
    totals
        .into_iter()
        .fold(UsageTotals::default(), |acc, item| acc.merge(*item))
}

/// Usage totals keyed by organization id.
pub type OrganizationTotals = BTreeMap<String, UsageTotals>;

/// One measured unit of consumption: a file, a table or a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub resource_id: String,
    pub component: Component,
    pub magnitude: u64,
}

impl UsageRecord {
    pub fn new(resource_id: impl Into<String>, component: Component, magnitude: u64) -> Self {
        Self {
            resource_id: resource_id.into(),
            component,
            magnitude,
        }
    }
}

pub fn sum_magnitudes<'a, I>(records: I) -> u64
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    records
        .into_iter()
        .fold(0u64, |acc, record| acc.saturating_add(record.magnitude))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub organization: Option<OrganizationRef>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Current datasets with their resources, as listed by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub datasets: Vec<Dataset>,
}

impl CatalogSnapshot {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        Self { datasets }
    }

    pub fn resources(&self) -> impl Iterator<Item = (&Dataset, &Resource)> {
        self.datasets.iter().flat_map(|dataset| {
            dataset
                .resources
                .iter()
                .map(move |resource| (dataset, resource))
        })
    }

    pub fn resource_count(&self) -> usize {
        self.datasets
            .iter()
            .map(|dataset| dataset.resources.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanRecord {
    pub resource_id: String,
    pub component: Component,
    pub magnitude: u64,
}

impl From<&UsageRecord> for OrphanRecord {
    fn from(record: &UsageRecord) -> Self {
        Self {
            resource_id: record.resource_id.clone(),
            component: record.component,
            magnitude: record.magnitude,
        }
    }
}

/// Why a graph was left out of the per-organization triplestore view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GraphOmission {
    NoOwner,
    AmbiguousOwner {
        principals: Vec<String>,
        organizations: Vec<String>,
    },
    UnknownPrincipal {
        principals: Vec<String>,
    },
    UnknownOrganization {
        principal: String,
        organization_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnattributedGraph {
    pub graph: String,
    #[serde(flatten)]
    pub reason: GraphOmission,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnattributedUsage {
    pub totals: UsageTotals,
    pub resources: Vec<OrphanRecord>,
    pub graphs: Vec<UnattributedGraph>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    pub generated_at: String,
    pub global: UsageTotals,
    pub per_organization: OrganizationTotals,
    pub unattributed: UnattributedUsage,
}
