#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aggregate::{
    AggregatorSettings, FilesystemProbe, GraphProbe, LocalUrlPolicy, RelationalProbe,
    ResourceStore, UsageAggregator,
};
use async_trait::async_trait;
use storage_catalog::CatalogSource;
use storage_core::{CatalogSnapshot, Dataset, Organization, OrganizationRef, Resource};
use storage_db::{RelationalEngine, TableSize};
use storage_graph::{GraphError, GraphStore, PermissionCatalog};
use tempfile::TempDir;

pub const SITE_URL: &str = "http://catalog.test";

#[derive(Default)]
pub struct FakeCatalog {
    pub datasets: Vec<Dataset>,
    pub organizations: Vec<Organization>,
    pub tables: Vec<String>,
    pub dataset_calls: AtomicUsize,
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn current_datasets(&self) -> storage_catalog::Result<CatalogSnapshot> {
        self.dataset_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CatalogSnapshot::new(self.datasets.clone()))
    }

    async fn organizations(&self) -> storage_catalog::Result<Vec<Organization>> {
        Ok(self.organizations.clone())
    }

    async fn datastore_tables(&self) -> storage_catalog::Result<Vec<String>> {
        Ok(self.tables.clone())
    }
}

#[derive(Default)]
pub struct FakeEngine {
    pub sizes: Vec<(String, u64)>,
}

#[async_trait]
impl RelationalEngine for FakeEngine {
    fn default_schema(&self) -> &'static str {
        "public"
    }

    async fn table_sizes(&self, _schema: &str) -> storage_db::Result<Vec<TableSize>> {
        Ok(self
            .sizes
            .iter()
            .map(|(name, bytes)| TableSize {
                name: name.clone(),
                bytes: *bytes,
            })
            .collect())
    }
}

/// Named graphs with their triple counts. `total` is what the engine-wide
/// aggregate query answers, independent of the listed graphs.
#[derive(Default)]
pub struct FakeGraphs {
    pub graphs: Vec<(String, u64)>,
    pub total: u64,
    pub unavailable: bool,
    pub counted: Arc<Mutex<Vec<String>>>,
}

impl FakeGraphs {
    fn check(&self) -> storage_graph::Result<()> {
        if self.unavailable {
            return Err(GraphError::Endpoint {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GraphStore for FakeGraphs {
    async fn total_triples(&self) -> storage_graph::Result<u64> {
        self.check()?;
        Ok(self.total)
    }

    async fn named_graphs(&self) -> storage_graph::Result<Vec<String>> {
        self.check()?;
        Ok(self.graphs.iter().map(|(iri, _)| iri.clone()).collect())
    }

    async fn graph_triples(&self, graph: &str) -> storage_graph::Result<u64> {
        self.check()?;
        if let Ok(mut counted) = self.counted.lock() {
            counted.push(graph.to_string());
        }
        Ok(self
            .graphs
            .iter()
            .find(|(iri, _)| iri == graph)
            .map(|(_, triples)| *triples)
            .unwrap_or(0))
    }
}

#[derive(Default)]
pub struct FakePermissions {
    pub principals: HashMap<String, Vec<String>>,
}

#[async_trait]
impl PermissionCatalog for FakePermissions {
    async fn graph_principals(&self, graph: &str) -> storage_graph::Result<Vec<String>> {
        Ok(self.principals.get(graph).cloned().unwrap_or_default())
    }
}

/// Backends for one aggregation scenario, with a temporary upload store.
pub struct Fixture {
    pub dir: TempDir,
    pub store: ResourceStore,
    pub catalog: FakeCatalog,
    pub engine: FakeEngine,
    pub graphs: FakeGraphs,
    pub permissions: FakePermissions,
    pub principal_map: BTreeMap<String, String>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ResourceStore::new(dir.path()).expect("store");
        Self {
            dir,
            store,
            catalog: FakeCatalog::default(),
            engine: FakeEngine::default(),
            graphs: FakeGraphs::default(),
            permissions: FakePermissions::default(),
            principal_map: BTreeMap::new(),
        }
    }

    pub fn organization(&mut self, id: &str, name: &str) {
        self.catalog.organizations.push(Organization {
            id: id.to_string(),
            name: name.to_string(),
            title: None,
        });
    }

    /// Adds a dataset owned by `owner` (an organization id) or by nobody.
    pub fn dataset(&mut self, id: &str, owner: Option<&str>, resources: Vec<Resource>) {
        let organization = owner.map(|owner| {
            let name = self
                .catalog
                .organizations
                .iter()
                .find(|org| org.id == owner)
                .map(|org| org.name.clone())
                .unwrap_or_else(|| owner.to_string());
            OrganizationRef {
                id: owner.to_string(),
                name,
            }
        });
        self.catalog.datasets.push(Dataset {
            id: id.to_string(),
            name: id.to_string(),
            organization,
            resources,
        });
    }

    /// A resource uploaded to the catalog, with a backing file of `len` bytes.
    pub fn uploaded(&self, id: &str, len: usize) -> Resource {
        let path = self.store.backing_path(id).expect("path");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("dirs");
        std::fs::write(&path, vec![b'x'; len]).expect("write");
        Self::linked(id, &format!("{SITE_URL}/dataset/resource/{id}/download/data.csv"))
    }

    pub fn linked(id: &str, url: &str) -> Resource {
        Resource {
            id: id.to_string(),
            url: url.to_string(),
            url_type: None,
        }
    }

    pub fn table(&mut self, name: &str, bytes: u64) {
        self.catalog.tables.push(name.to_string());
        self.engine.sizes.push((name.to_string(), bytes));
    }

    pub fn graph(&mut self, iri: &str, triples: u64, principals: &[&str]) {
        self.graphs.graphs.push((iri.to_string(), triples));
        self.permissions.principals.insert(
            iri.to_string(),
            principals.iter().map(|p| p.to_string()).collect(),
        );
    }

    pub fn aggregator(self) -> (UsageAggregator, TempDir) {
        let timeout = Duration::from_secs(5);
        let filesystem = FilesystemProbe::new(
            LocalUrlPolicy::new(SITE_URL).expect("policy"),
            self.store,
            timeout,
        );
        let relational =
            RelationalProbe::new(Arc::new(self.engine), None, timeout).expect("relational probe");
        let graph = GraphProbe::new(Arc::new(self.graphs), Arc::new(self.permissions), timeout);
        let aggregator = UsageAggregator::new(
            Arc::new(self.catalog),
            filesystem,
            relational,
            graph,
            AggregatorSettings {
                call_timeout: timeout,
                principal_map: self.principal_map,
            },
        );
        (aggregator, self.dir)
    }
}
