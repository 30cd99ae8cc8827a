use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use storage_core::{CatalogSnapshot, Dataset, Organization};
use tracing::debug;
use url::Url;

use crate::error::{CatalogError, Result};
use crate::wire::{
    ActionEnvelope, DatastoreSearchResult, OrganizationRecord, PackageRecord, error_message,
};
use crate::{CatalogSource, TABLE_METADATA};

const DEFAULT_PAGE_SIZE: u32 = 100;

/// Where and how to reach the catalog action API.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub page_size: u32,
    pub request_timeout: Duration,
}

impl CatalogSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the catalog's `/api/3/action/<name>` endpoints.
pub struct CatalogClient {
    client: Client,
    action_base: Url,
    api_token: Option<String>,
    page_size: u32,
}

impl CatalogClient {
    pub fn new(settings: CatalogSettings) -> Result<Self> {
        if settings.page_size == 0 {
            return Err(CatalogError::InvalidSettings(
                "page_size must be greater than zero".to_string(),
            ));
        }
        let action_base = action_base(&settings.base_url)?;
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            action_base,
            api_token: settings
                .api_token
                .filter(|token| !token.trim().is_empty()),
            page_size: settings.page_size,
        })
    }

    async fn action<T: DeserializeOwned>(&self, action: &str, body: Value) -> Result<T> {
        let url = self
            .action_base
            .join(action)
            .map_err(|err| CatalogError::InvalidUrl {
                url: self.action_base.to_string(),
                message: err.to_string(),
            })?;
        let mut request = self.client.post(url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.header(AUTHORIZATION, token);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: ActionEnvelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(err) if status.is_success() => {
                return Err(CatalogError::Decode {
                    action: action.to_string(),
                    message: err.to_string(),
                });
            }
            Err(_) => {
                return Err(CatalogError::Action {
                    action: action.to_string(),
                    status: status.as_u16(),
                    message: truncate(&text, 200),
                });
            }
        };
        if !status.is_success() || !envelope.success {
            return Err(CatalogError::Action {
                action: action.to_string(),
                status: status.as_u16(),
                message: error_message(envelope.error.as_ref()),
            });
        }
        envelope.result.ok_or_else(|| CatalogError::Decode {
            action: action.to_string(),
            message: "missing result".to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn current_datasets(&self) -> Result<CatalogSnapshot> {
        let mut datasets: Vec<Dataset> = Vec::new();
        let mut seen = HashSet::new();
        let mut offset = 0u64;
        loop {
            let page: Vec<PackageRecord> = self
                .action(
                    "current_package_list_with_resources",
                    json!({ "limit": self.page_size, "offset": offset }),
                )
                .await?;
            let fetched = page.len();
            let mut added = 0usize;
            for package in page {
                if seen.insert(package.id.clone()) {
                    datasets.push(package.into());
                    added += 1;
                }
            }
            debug!(offset, fetched, added, "catalog dataset page");
            if is_last_page(fetched, added) {
                break;
            }
            offset += fetched as u64;
        }
        Ok(CatalogSnapshot::new(datasets))
    }

    async fn organizations(&self) -> Result<Vec<Organization>> {
        let mut organizations: Vec<Organization> = Vec::new();
        let mut seen = HashSet::new();
        let mut offset = 0u64;
        loop {
            let page: Vec<OrganizationRecord> = self
                .action(
                    "organization_list",
                    json!({ "all_fields": true, "limit": self.page_size, "offset": offset }),
                )
                .await?;
            let fetched = page.len();
            let mut added = 0usize;
            for org in page {
                if seen.insert(org.id.clone()) {
                    organizations.push(org.into());
                    added += 1;
                }
            }
            debug!(offset, fetched, added, "catalog organization page");
            if is_last_page(fetched, added) {
                break;
            }
            offset += fetched as u64;
        }
        Ok(organizations)
    }

    async fn datastore_tables(&self) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();
        let mut offset = 0u64;
        loop {
            let page: DatastoreSearchResult = self
                .action(
                    "datastore_search",
                    json!({
                        "resource_id": TABLE_METADATA,
                        "limit": self.page_size,
                        "offset": offset,
                    }),
                )
                .await?;
            let fetched = page.records.len();
            let known = names.len();
            names.extend(page.records.into_iter().map(|record| record.name));
            let added = names.len() - known;
            offset += fetched as u64;
            let exhausted = page.total.is_some_and(|total| offset >= total);
            debug!(offset, fetched, added, "datastore registry page");
            if exhausted || is_last_page(fetched, added) {
                break;
            }
        }
        names.remove(TABLE_METADATA);
        Ok(names.into_iter().collect())
    }
}

// Servers may cap a page below the requested `limit`, so a short page is not
// the end. An empty page, or one that only repeats ids already seen, is.
fn is_last_page(fetched: usize, added: usize) -> bool {
    fetched == 0 || added == 0
}

fn action_base(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let mut url = Url::parse(trimmed).map_err(|err| CatalogError::InvalidUrl {
        url: base_url.to_string(),
        message: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidUrl {
            url: base_url.to_string(),
            message: "expected an http or https url".to_string(),
        });
    }
    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{path}/api/3/action/"));
    Ok(url)
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
