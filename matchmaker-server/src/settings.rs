//! Process-level settings: HTTP bind address plus the engine's tuning
//! parameters, loadable from environment variables or a JSON file.
//! Mirrors the `*Settings` / `*Config` split the teacher uses for every
//! service (`GatewaySettings` -> `GatewayConfig`, etc): `Settings` is the
//! serde-friendly wire shape, `Config` is what `run` actually consumes.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use matchmaker_core::{EngineConfig, EngineError};

pub type BoxError = matchmaker_core::BoxError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub engine: EngineConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, BoxError> {
        let mut settings = Self::default();
        if let Ok(addr) = std::env::var("MATCHMAKER_BIND_ADDR") {
            settings.bind_addr = addr;
        }
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, BoxError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| Box::new(EngineError::ConfigLoad(Box::new(err))) as BoxError)?;
        let settings = serde_json::from_str(&raw)
            .map_err(|err| Box::new(EngineError::ConfigLoad(Box::new(err))) as BoxError)?;
        Ok(settings)
    }

    pub fn into_config(self) -> Result<ServerConfig, BoxError> {
        ServerConfig::from_settings(self)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub engine: EngineConfig,
}

impl ServerConfig {
    pub fn from_settings(settings: ServerSettings) -> Result<Self, BoxError> {
        Ok(Self {
            bind_addr: settings
                .bind_addr
                .parse()
                .map_err(|err| Box::new(err) as BoxError)?,
            engine: settings.engine,
        })
    }

    pub fn from_env() -> Result<Self, BoxError> {
        ServerSettings::from_env().and_then(Self::from_settings)
    }
}
