use serde::Serialize;
use storage_core::{Component, OrganizationTotals, UsageTotals};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Unit of each component, so clients do not mix bytes with triples.
#[derive(Debug, Serialize)]
pub struct UnitsResponse {
    pub filesystem: &'static str,
    pub database: &'static str,
    pub triplestore: &'static str,
}

impl Default for UnitsResponse {
    fn default() -> Self {
        Self {
            filesystem: Component::Filesystem.unit(),
            database: Component::Database.unit(),
            triplestore: Component::Triplestore.unit(),
        }
    }
}

/// Plain-text table of usage rows for terminal output.
pub fn render_totals_table(rows: &[(String, UsageTotals)]) -> String {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.len())
        .chain(std::iter::once("owner".len()))
        .max()
        .unwrap_or(0);
    let mut out = format!(
        "{:<label_width$}  {:>16}  {:>16}  {:>16}\n",
        "owner", "filesystem (B)", "database (B)", "triplestore (t)"
    );
    for (label, totals) in rows {
        out.push_str(&format!(
            "{:<label_width$}  {:>16}  {:>16}  {:>16}\n",
            label, totals.filesystem, totals.database, totals.triplestore
        ));
    }
    out
}

pub fn organization_rows(totals: &OrganizationTotals) -> Vec<(String, UsageTotals)> {
    totals
        .iter()
        .map(|(organization, usage)| (organization.clone(), *usage))
        .collect()
}
