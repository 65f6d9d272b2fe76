use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Protocol constants shared by the server and its tests.
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5640;
pub const MAX_FRAME_BYTES: usize = 64 * 1024; // hard cap per request frame

/// Top-level config (jobfs.toml + JOBFS_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobfsConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub definitions: DefinitionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Where the append-only definitions log lives on the host filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionsConfig {
    #[serde(default = "default_definitions_path")]
    pub path: String,
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        Self {
            path: default_definitions_path(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_definitions_path() -> String {
    format!("{}/.jobfs/definitions", home_dir())
}

fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| ".".to_string())
}

impl JobfsConfig {
    /// Load config from a TOML file with JOBFS_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.jobfs/jobfs.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("JOBFS_").split("_"))
            .extract()
            .map_err(|e| crate::error::JobfsError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    format!("{}/.jobfs/jobfs.toml", home_dir())
}
