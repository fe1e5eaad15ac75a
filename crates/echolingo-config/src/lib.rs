use serde::{Deserialize, Serialize};

use self::provider::ProviderConfig;
use self::server::ServerConfig;
use self::storage::StorageConfig;

pub mod provider;
pub mod server;
pub mod storage;

pub use storage::StorageBackend;

#[derive(Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Read the whole configuration from the environment once, at startup.
    /// Nothing else in the process consults environment variables.
    pub fn new() -> Self {
        Config {
            provider: ProviderConfig::new(),
            storage: StorageConfig::new(),
            server: ServerConfig::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
