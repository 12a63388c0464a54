use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "shub-server", about = "Multi-room WebSocket relay")]
pub struct ServerArgs {
    /// Address to listen on.
    #[arg(long, env = "SHUB_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Environment whose referer list is used.
    #[arg(long = "env", env = "SHUB_ENV", default_value = "development")]
    pub environment: String,

    /// JSON file mapping environment names to their settings.
    #[arg(long, env = "SHUB_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub referer: Vec<String>,
}

/// `{ "<environment>": { "referer": [...] }, ... }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Environments(pub HashMap<String, EnvironmentConfig>);

impl Environments {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn builtin() -> Self {
        let mut environments = HashMap::new();
        environments.insert(
            "development".to_owned(),
            EnvironmentConfig {
                referer: vec!["http://localhost".to_owned()],
            },
        );
        Self(environments)
    }

    pub fn select(&self, name: &str) -> Result<&EnvironmentConfig> {
        self.0
            .get(name)
            .ok_or_else(|| anyhow!("Unknown environment '{}'", name))
    }
}

impl ServerArgs {
    pub fn environment_config(&self) -> Result<EnvironmentConfig> {
        let environments = match &self.config {
            Some(path) => Environments::load(path)?,
            None => Environments::builtin(),
        };
        environments.select(&self.environment).cloned()
    }
}
