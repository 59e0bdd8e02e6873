use std::net::SocketAddr;
use std::path::PathBuf;

use crate::dataset::Region;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Server-side configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub dataset_path: PathBuf,
    pub region: Region,
    pub data_update_date: Option<String>,
}

/// Configuration for the command line client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub favorites_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub data_update_date: Option<String>,
}
