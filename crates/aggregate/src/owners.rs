use std::collections::{BTreeMap, BTreeSet, HashMap};

use storage_core::{CatalogSnapshot, GraphOmission, Organization};

/// Resource id to owning organization id, built once per run.
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    owners: HashMap<String, String>,
}

impl OwnershipIndex {
    pub fn build(snapshot: &CatalogSnapshot) -> Self {
        let mut owners = HashMap::with_capacity(snapshot.resource_count());
        for (dataset, resource) in snapshot.resources() {
            if let Some(organization) = &dataset.organization {
                owners.insert(resource.id.clone(), organization.id.clone());
            }
        }
        Self { owners }
    }

    pub fn owner_of(&self, resource_id: &str) -> Option<&str> {
        self.owners.get(resource_id).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphAttribution {
    Owned(String),
    Omitted(GraphOmission),
}

/// Joins graph principals to organizations.
///
/// A principal resolves through the explicit map first and falls back to an
/// exact, case-sensitive match on the organization `name`.
#[derive(Debug, Clone, Default)]
pub struct GraphOwnerMatcher {
    known_ids: BTreeSet<String>,
    by_name: HashMap<String, String>,
    explicit: BTreeMap<String, String>,
}

enum PrincipalMatch {
    Organization(String),
    UnknownOrganization(String),
    Unmatched,
}

impl GraphOwnerMatcher {
    pub fn new(organizations: &[Organization], explicit: &BTreeMap<String, String>) -> Self {
        let known_ids = organizations.iter().map(|org| org.id.clone()).collect();
        let by_name = organizations
            .iter()
            .map(|org| (org.name.clone(), org.id.clone()))
            .collect();
        Self {
            known_ids,
            by_name,
            explicit: explicit.clone(),
        }
    }

    fn match_principal(&self, principal: &str) -> PrincipalMatch {
        if let Some(organization_id) = self.explicit.get(principal) {
            return if self.known_ids.contains(organization_id) {
                PrincipalMatch::Organization(organization_id.clone())
            } else {
                PrincipalMatch::UnknownOrganization(organization_id.clone())
            };
        }
        match self.by_name.get(principal) {
            Some(organization_id) => PrincipalMatch::Organization(organization_id.clone()),
            None => PrincipalMatch::Unmatched,
        }
    }

    /// A graph belongs to an organization only when it has principals and every
    /// one of them resolves to that same organization.
    pub fn resolve(&self, principals: &[String]) -> GraphAttribution {
        if principals.is_empty() {
            return GraphAttribution::Omitted(GraphOmission::NoOwner);
        }

        let mut organizations = BTreeSet::new();
        let mut unmatched = Vec::new();
        for principal in principals {
            match self.match_principal(principal) {
                PrincipalMatch::Organization(id) => {
                    organizations.insert(id);
                }
                PrincipalMatch::UnknownOrganization(organization_id) => {
                    return GraphAttribution::Omitted(GraphOmission::UnknownOrganization {
                        principal: principal.clone(),
                        organization_id,
                    });
                }
                PrincipalMatch::Unmatched => unmatched.push(principal.clone()),
            }
        }

        if !unmatched.is_empty() {
            return GraphAttribution::Omitted(GraphOmission::UnknownPrincipal {
                principals: unmatched,
            });
        }
        if organizations.len() > 1 {
            return GraphAttribution::Omitted(GraphOmission::AmbiguousOwner {
                principals: principals.to_vec(),
                organizations: organizations.into_iter().collect(),
            });
        }
        match organizations.pop_first() {
            Some(organization_id) => GraphAttribution::Owned(organization_id),
            None => GraphAttribution::Omitted(GraphOmission::NoOwner),
        }
    }
}
