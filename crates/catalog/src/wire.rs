//! Payloads of the catalog action API.

use serde::Deserialize;
use storage_core::{Dataset, Organization, OrganizationRef, Resource};

#[derive(Debug, Deserialize)]
pub(crate) struct ActionEnvelope<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PackageRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization: Option<OrganizationRecord>,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRecord {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatastoreSearchResult {
    #[serde(default)]
    pub records: Vec<TableRecord>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableRecord {
    pub name: String,
}

impl From<PackageRecord> for Dataset {
    fn from(package: PackageRecord) -> Self {
        Dataset {
            id: package.id,
            name: package.name,
            organization: package.organization.map(|org| OrganizationRef {
                id: org.id,
                name: org.name,
            }),
            resources: package
                .resources
                .into_iter()
                .map(|resource| Resource {
                    id: resource.id,
                    url: resource.url.unwrap_or_default(),
                    url_type: resource.url_type.filter(|value| !value.is_empty()),
                })
                .collect(),
        }
    }
}

impl From<OrganizationRecord> for Organization {
    fn from(org: OrganizationRecord) -> Self {
        Organization {
            id: org.id,
            name: org.name,
            title: org.title,
        }
    }
}

/// Best-effort message out of an action `error` object.
pub(crate) fn error_message(error: Option<&serde_json::Value>) -> String {
    let Some(error) = error else {
        return "no error details".to_string();
    };
    if let Some(message) = error.get("message").and_then(|value| value.as_str()) {
        return message.to_string();
    }
    error.to_string()
}
