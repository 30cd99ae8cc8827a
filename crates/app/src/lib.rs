pub mod app;
pub mod config;
pub mod error;
pub mod services;

pub use app::AppState;
pub use config::{
    AppConfig, CONFIG_ENV, CatalogConfig, DEFAULT_CONFIG_FILE, DatastoreConfig, FilesystemConfig,
    GraphConfig, LimitsConfig, OwnershipConfig, PermissionsConfig, ServerConfig,
    resolve_config_path,
};
pub use error::{ApiError, AppError, Result};
pub use services::{AppServices, UsageService};
