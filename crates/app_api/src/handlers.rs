use storage_app::Result;
use storage_core::{OrganizationTotals, UnattributedUsage, UsageReport, UsageTotals};

use crate::{AppContext, EmptyRequest, HealthResponse, UnitsResponse};

pub async fn used_space(ctx: &AppContext, _req: EmptyRequest) -> Result<UsageTotals> {
    ctx.app_state.services.usage.used_space().await
}

pub async fn used_space_per_org(
    ctx: &AppContext,
    _req: EmptyRequest,
) -> Result<OrganizationTotals> {
    ctx.app_state.services.usage.used_space_per_org().await
}

pub async fn unattributed_space(
    ctx: &AppContext,
    _req: EmptyRequest,
) -> Result<UnattributedUsage> {
    ctx.app_state.services.usage.unattributed_space().await
}

pub async fn usage_report(ctx: &AppContext, _req: EmptyRequest) -> Result<UsageReport> {
    ctx.app_state.services.usage.usage_report().await
}

pub fn units() -> UnitsResponse {
    UnitsResponse::default()
}

pub fn health() -> HealthResponse {
    HealthResponse::default()
}
