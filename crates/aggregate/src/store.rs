use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Backend, Result, UsageError};

/// Upload directory of the catalog: `<storage_path>/resources/<id[0..3]>/<id[3..6]>/<id[6..]>`.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    root: PathBuf,
}

impl ResourceStore {
    pub fn new(storage_path: impl AsRef<Path>) -> Result<Self> {
        let storage_path = storage_path.as_ref();
        if storage_path.as_os_str().is_empty() {
            return Err(UsageError::InvalidConfig(
                "storage path must not be empty".to_string(),
            ));
        }
        Ok(Self {
            root: storage_path.join("resources"),
        })
    }

    pub fn backing_path(&self, resource_id: &str) -> Result<PathBuf> {
        let valid = resource_id.len() > 6
            && resource_id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(UsageError::InvalidResourceId(resource_id.to_string()));
        }
        Ok(self
            .root
            .join(&resource_id[0..3])
            .join(&resource_id[3..6])
            .join(&resource_id[6..]))
    }

    /// Size in bytes of the file behind `resource_id`.
    pub async fn file_size(&self, resource_id: &str) -> Result<u64> {
        let path = self.backing_path(resource_id)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
            Ok(_) => Err(UsageError::MissingBackingObject {
                resource_id: resource_id.to_string(),
                path,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(UsageError::MissingBackingObject {
                    resource_id: resource_id.to_string(),
                    path,
                })
            }
            Err(err) => Err(UsageError::backend(
                Backend::Filesystem,
                format!("{}: {err}", path.display()),
            )),
        }
    }
}
