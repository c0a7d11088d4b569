//! Server configuration from the environment.

use anyhow::Context;
use hexhaven_core::RulesConfig;
use std::net::SocketAddr;
use std::path::Path;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Rules for every session this server hosts
    pub rules: RulesConfig,
}

impl ServerConfig {
    /// Read `SERVER_ADDR` and the optional `RULES_FILE`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_values(
            std::env::var("SERVER_ADDR").ok(),
            std::env::var("RULES_FILE").ok(),
        )
    }

    fn from_values(addr: Option<String>, rules_file: Option<String>) -> anyhow::Result<Self> {
        let addr = addr.unwrap_or_else(|| DEFAULT_ADDR.into());
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("invalid SERVER_ADDR `{addr}`"))?;

        let rules = match rules_file {
            Some(path) => load_rules(Path::new(&path))?,
            None => RulesConfig::default(),
        };

        Ok(Self { addr, rules })
    }
}

fn load_rules(path: &Path) -> anyhow::Result<RulesConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    RulesConfig::from_json_str(&text)
        .with_context(|| format!("failed to load rules from {}", path.display()))
}
