use std::sync::Arc;

use aggregate::UsageAggregator;
use storage_core::{OrganizationTotals, UnattributedUsage, UsageReport, UsageTotals};

use crate::error::Result;

/// Storage usage reports. Each call takes a fresh catalog snapshot and queries
/// every backend again.
#[derive(Clone)]
pub struct UsageService {
    aggregator: Arc<UsageAggregator>,
}

impl UsageService {
    pub(super) fn new(aggregator: Arc<UsageAggregator>) -> Self {
        Self { aggregator }
    }

    pub async fn used_space(&self) -> Result<UsageTotals> {
        Ok(self.aggregator.used_space().await?)
    }

    pub async fn used_space_per_org(&self) -> Result<OrganizationTotals> {
        Ok(self.aggregator.used_space_per_org().await?)
    }

    pub async fn unattributed_space(&self) -> Result<UnattributedUsage> {
        Ok(self.aggregator.unattributed_space().await?)
    }

    pub async fn usage_report(&self) -> Result<UsageReport> {
        Ok(self.aggregator.usage_report().await?)
    }
}
