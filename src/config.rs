use anyhow::{anyhow, bail};
use serde::Deserialize;
use std::env;

use crate::models::Address;

/// Upper bound on the confirmation delay: ten years
pub const MAX_CONFIRMATION_DELAY_SECS: i64 = 10 * 365 * 86_400;

/// Log filter used when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "governance_core=info,actix_web=info";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub governance: GovernanceConfig,
    pub keeper: KeeperConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GovernanceConfig {
    pub confirmation_delay_secs: i64,
    pub signer_role: String,
    pub proposer_role: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeeperConfig {
    pub enabled: bool,
    pub poll_interval_secs: u64,
}

/// Initial role membership and chain support applied at startup
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    pub foundation_managers: Vec<Address>,
    pub proposers: Vec<Address>,
    pub enabled_chains: Vec<u32>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, applying defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port: u16 = var("PORT", "8080").parse()?;
        let host = var("HOST", "127.0.0.1");
        let rust_log = var("RUST_LOG", DEFAULT_LOG_FILTER);

        let confirmation_delay_secs: i64 = var("CONFIRMATION_DELAY_SECS", "86400").parse()?;
        let signer_role = var("GOVERNANCE_SIGNER_ROLE", "FOUNDATION_MANAGER");
        let proposer_role = var("GOVERNANCE_PROPOSER_ROLE", "PROPOSER");

        let keeper_enabled: bool = var("KEEPER_ENABLED", "true").parse()?;
        let poll_interval_secs: u64 = var("KEEPER_POLL_INTERVAL_SECS", "30").parse()?;

        let foundation_managers = parse_list(&var("FOUNDATION_MANAGERS", ""))
            .into_iter()
            .map(Address::new)
            .collect();
        let proposers = parse_list(&var("PROPOSERS", ""))
            .into_iter()
            .map(Address::new)
            .collect();
        let enabled_chains = parse_list(&var("ENABLED_CHAINS", ""))
            .into_iter()
            .map(|chain| {
                chain
                    .parse::<u32>()
                    .map_err(|e| anyhow!("invalid chain id {chain:?}: {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = Config {
            server: ServerConfig {
                port,
                host,
                rust_log,
            },
            governance: GovernanceConfig {
                confirmation_delay_secs,
                signer_role,
                proposer_role,
            },
            keeper: KeeperConfig {
                enabled: keeper_enabled,
                poll_interval_secs,
            },
            bootstrap: BootstrapConfig {
                foundation_managers,
                proposers,
                enabled_chains,
            },
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.governance.confirmation_delay_secs <= 0 {
            bail!("CONFIRMATION_DELAY_SECS must be positive");
        }
        if self.governance.confirmation_delay_secs > MAX_CONFIRMATION_DELAY_SECS {
            bail!("CONFIRMATION_DELAY_SECS must not exceed {MAX_CONFIRMATION_DELAY_SECS}");
        }
        if self.keeper.poll_interval_secs == 0 {
            bail!("KEEPER_POLL_INTERVAL_SECS must be positive");
        }
        if self.bootstrap.foundation_managers.is_empty() {
            bail!("FOUNDATION_MANAGERS must name at least one account");
        }
        if let Some(bad) = self
            .bootstrap
            .foundation_managers
            .iter()
            .chain(&self.bootstrap.proposers)
            .find(|a| !a.is_well_formed())
        {
            bail!("malformed account address: {bad}");
        }
        self.governance.signer_role.parse::<crate::models::Role>()?;
        self.governance.proposer_role.parse::<crate::models::Role>()?;
        Ok(())
    }
}

/// Split a comma separated value, dropping blanks
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
