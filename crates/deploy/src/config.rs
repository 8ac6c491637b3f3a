//! Deployment configuration.
//!
//! Values are layered, lowest priority first: compiled-in defaults, an optional TOML
//! file, `PERPKIT_*` environment variables, explicit overrides (CLI flags).

use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_core::primitives::{Address, I256};
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    ArtifactStore, ConfirmationPolicy, DeploymentParameters, RpcNetwork,
    network::{DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_POLL_INTERVAL},
    params::serde_int,
};

/// The contract deployed when none is configured.
pub const DEFAULT_CONTRACT_NAME: &str = "PerpetualFutures";
/// The artifacts directory used when none is configured (Hardhat's default).
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
/// The RPC endpoint used when none is configured (a local Hardhat or Anvil node).
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// Prefix of the environment variables read into the configuration.
pub const ENV_PREFIX: &str = "PERPKIT_";

/// Complete configuration of a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Name of the contract to deploy.
    pub contract: String,
    /// Directory holding the compiled artifacts.
    pub artifacts: PathBuf,
    /// Constructor argument 0.
    #[serde(with = "serde_int")]
    pub initial_price: I256,
    /// Constructor argument 1, in basis points.
    #[serde(with = "serde_int")]
    pub funding_rate_bps: I256,
    /// JSON-RPC endpoint of the target node.
    pub rpc_url: Url,
    /// Sending account. Defaults to the node's first managed account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Fixed gas limit. Estimated by the node if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Blocks, counting the inclusion block, before the deployment is final.
    pub confirmations: u64,
    /// Maximum time to wait for confirmation, in seconds.
    pub timeout_secs: u64,
    /// Interval between receipt polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        let params = DeploymentParameters::default();
        Self {
            contract: DEFAULT_CONTRACT_NAME.to_string(),
            artifacts: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            initial_price: params.initial_price,
            funding_rate_bps: params.funding_rate_bps,
            rpc_url: Url::parse(DEFAULT_RPC_URL).expect("default RPC URL is valid"),
            from: None,
            gas_limit: None,
            confirmations: DEFAULT_CONFIRMATIONS,
            timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT.as_secs(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

/// Explicitly provided values, taking precedence over every other layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<PathBuf>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serde_int::serialize_some"
    )]
    pub initial_price: Option<I256>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serde_int::serialize_some"
    )]
    pub funding_rate_bps: Option<I256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl DeployConfig {
    /// Load the configuration from every layer.
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_with_env(config_file, Env::prefixed(ENV_PREFIX), overrides)
    }

    fn load_with_env(
        config_file: Option<&Path>,
        env: Env,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            if !path.is_file() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: Self = figment
            .merge(env)
            .merge(Serialized::defaults(overrides))
            .extract()
            .context("Failed to load deployment configuration")?;

        config.validate()?;

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "Configuration loaded");
        }

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.contract.trim().is_empty() {
            anyhow::bail!("Contract name must not be empty");
        }
        if self.confirmations == 0 {
            anyhow::bail!("confirmations must be at least 1");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be at least 1");
        }
        Ok(())
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize deployment config to TOML")
    }

    pub fn params(&self) -> DeploymentParameters {
        DeploymentParameters::new(self.initial_price, self.funding_rate_bps)
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirmations: self.confirmations,
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.artifacts)
    }

    /// Build the JSON-RPC network client described by this configuration.
    pub fn rpc_network(&self) -> Result<RpcNetwork> {
        Ok(RpcNetwork::new(self.rpc_url.clone(), self.confirmation_policy())?
            .with_from(self.from)
            .with_gas_limit(self.gas_limit))
    }
}
