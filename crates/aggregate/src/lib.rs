//! Storage usage across the catalog's file store, datastore database and
//! graph engine, globally and per owning organization.

mod aggregator;
mod bounded;
mod error;
mod locality;
mod owners;
mod probes;
mod store;
mod totals;

pub use aggregator::{AggregatorSettings, DEFAULT_CALL_TIMEOUT, UsageAggregator};
pub use error::{Backend, Result, UsageError};
pub use locality::LocalUrlPolicy;
pub use owners::{GraphAttribution, GraphOwnerMatcher, OwnershipIndex};
pub use probes::{AttributedGraph, FilesystemProbe, GraphProbe, GraphScan, RelationalProbe};
pub use store::ResourceStore;
pub use totals::{fold_global, fold_per_organization, fold_unattributed};
