use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::CommonResult;

pub const CONFIG_FILE_NAME: &str = "moor.toml";
pub const CONFIG_ENV_PREFIX: &str = "MOOR_";

/// Static configuration for the cluster resource manager.
/// Values are layered from defaults, an optional TOML file,
/// and `MOOR_`-prefixed environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// The endpoint of the external cluster scheduler.
    pub master: String,
    /// The framework name presented to the external scheduler on registration.
    pub framework_name: String,
    /// The directory where the worker store persists its records,
    /// or an empty string to keep records in memory only.
    pub store_path: String,
    /// Default CPU cores for a worker whose resource profile leaves it unspecified.
    pub worker_cpu_cores: f64,
    /// Default total memory (MB) for a worker whose resource profile leaves it unspecified.
    pub worker_memory_mb: u64,
    /// Default heap memory (MB) for a worker whose resource profile leaves it unspecified.
    pub worker_heap_mb: u64,
    /// Default direct memory (MB) for a worker whose resource profile leaves it unspecified.
    pub worker_direct_mb: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            master: "127.0.0.1:5050".to_string(),
            framework_name: "moor".to_string(),
            store_path: String::new(),
            worker_cpu_cores: 1.0,
            worker_memory_mb: 1024,
            worker_heap_mb: 768,
            worker_direct_mb: 256,
        }
    }
}

impl ClusterConfig {
    pub fn load() -> CommonResult<Self> {
        let config = Figment::from(Serialized::defaults(ClusterConfig::default()))
            .merge(Toml::file(CONFIG_FILE_NAME))
            .merge(Env::prefixed(CONFIG_ENV_PREFIX))
            .extract()?;
        Ok(config)
    }
}
