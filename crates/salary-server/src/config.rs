//! Server configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name reported in structured logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding the six prediction artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Load artifacts at startup rather than on the first request
    #[serde(default = "default_preload")]
    pub preload_artifacts: bool,
}

fn default_service_name() -> String {
    "salary-predictor".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

fn default_preload() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            bind_address: default_bind_address(),
            api_port: default_api_port(),
            artifact_dir: default_artifact_dir(),
            preload_artifacts: default_preload(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional config file and the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("salary-server").required(false))
            .add_source(config::Environment::with_prefix("SALARY").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }
}
