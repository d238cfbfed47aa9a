use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Holds `bantay.db` and the `uploads/` tree
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// CORS origins; empty allows any origin (development)
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_limit")]
    pub default_limit: u64,
    #[serde(default = "default_max_page_limit")]
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_page_limit(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            cors_allowed_origins: Vec::new(),
            pagination: PaginationConfig::default(),
        }
    }
}

// ---- Seed file types (used by `init-locations` CLI subcommand) ----

/// Locations are kept as raw records so they pass through the same
/// validation as API submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsSeedFile {
    #[serde(default)]
    pub locations: Vec<serde_json::Map<String, serde_json::Value>>,
}

fn default_http_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_page_limit() -> u64 {
    20
}

fn default_max_page_limit() -> u64 {
    1000
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config '{path}': {e}"))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
