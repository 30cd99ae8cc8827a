mod usage;

use std::sync::Arc;

use aggregate::UsageAggregator;

pub use usage::UsageService;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub usage: UsageService,
}

impl AppServices {
    pub fn new(aggregator: Arc<UsageAggregator>) -> Self {
        Self {
            usage: UsageService::new(aggregator),
        }
    }
}
