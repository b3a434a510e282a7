//! Server configuration loaded from `PCBOOK_*` environment variables.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const BIND_ADDR_ENV: &str = "PCBOOK_BIND_ADDR";
pub const IMAGE_DIR_ENV: &str = "PCBOOK_IMAGE_DIR";
pub const CATALOG_DIR_ENV: &str = "PCBOOK_CATALOG_DIR";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_IMAGE_DIR: &str = "img";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Folder uploaded images are written to.
    pub image_dir: PathBuf,
    /// Folder of the disk-backed catalog; `None` keeps the catalog in memory.
    pub catalog_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            catalog_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let kv: HashMap<String, String> = std::env::vars().collect();
        Self::from_kv(&kv)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match non_empty(kv, BIND_ADDR_ENV) {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| ConfigError {
                key: BIND_ADDR_ENV,
                message: format!("invalid socket address {:?}: {}", raw, e),
            })?,
            None => defaults.bind_addr,
        };

        let image_dir = non_empty(kv, IMAGE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.image_dir);

        let catalog_dir = non_empty(kv, CATALOG_DIR_ENV).map(PathBuf::from);

        Ok(Self {
            bind_addr,
            image_dir,
            catalog_dir,
        })
    }
}

fn non_empty<'a>(kv: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    kv.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}
