//! One probe per storage backend. Each returns raw per-item usage and knows
//! nothing about organizations, except the graph probe, whose ownership data
//! lives in the graph engine itself.

mod filesystem;
mod graph;
mod relational;

pub use filesystem::FilesystemProbe;
pub use graph::{AttributedGraph, GraphProbe, GraphScan};
pub use relational::RelationalProbe;

/// In-flight calls per probe when one backend request is needed per item.
const PROBE_CONCURRENCY: usize = 8;
