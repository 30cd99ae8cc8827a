use storage_core::Resource;
use url::{ParseError, Url};

use crate::error::{Result, UsageError};

/// Decides from a resource URL alone whether the catalog stores the file itself.
///
/// Relative URLs are local. Absolute URLs are local when their host and port
/// match the catalog site. Empty and protocol-relative (`//host/...`) URLs are
/// not local.
#[derive(Debug, Clone)]
pub struct LocalUrlPolicy {
    site: Url,
}

impl LocalUrlPolicy {
    pub fn new(site_url: &str) -> Result<Self> {
        let site = Url::parse(site_url.trim())
            .map_err(|err| UsageError::InvalidConfig(format!("site url {site_url:?}: {err}")))?;
        if site.host_str().is_none() {
            return Err(UsageError::InvalidConfig(format!(
                "site url {site_url:?} has no host"
            )));
        }
        Ok(Self { site })
    }

    pub fn is_local(&self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || url.starts_with("//") {
            return false;
        }
        match Url::parse(url) {
            Ok(parsed) => {
                parsed.host_str() == self.site.host_str() && parsed.port() == self.site.port()
            }
            Err(ParseError::RelativeUrlWithoutBase) => true,
            Err(_) => false,
        }
    }

    /// Whether the upload store holds `resource`: an upload, or a local URL.
    pub fn holds(&self, resource: &Resource) -> bool {
        resource.url_type.as_deref() == Some("upload") || self.is_local(&resource.url)
    }
}
