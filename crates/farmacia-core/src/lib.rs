pub mod app_config;
pub mod config;
pub mod dataset;
pub mod derived;
pub mod error;
pub mod pagination;
pub mod pharmacy;
pub mod update_info;

pub use app_config::{AppConfig, ClientConfig, Environment};
pub use config::{load_app_config, load_client_config};
pub use dataset::{PharmacyDataset, Region};
pub use error::{ConfigError, DatasetError};
pub use pagination::{paginate, Page, PageRequest, Pagination, DEFAULT_LIMIT, MAX_LIMIT};
pub use pharmacy::{FilterSelection, Pharmacy};
pub use update_info::DataUpdateInfo;
