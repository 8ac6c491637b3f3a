use std::path::PathBuf;

use alloy_core::primitives::{Address, I256};
use clap::Parser;
use perpkit_deploy::{ConfigOverrides, parse_parameter};
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "perpkit")]
#[command(
    author,
    version,
    about = "Deploy a perpetual-futures contract and report its address"
)]
pub struct Cli {
    /// The verbosity level. Logs are written to stderr.
    #[arg(short, long, env = "PERPKIT_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a TOML configuration file.
    ///
    /// Values from the file are overridden by `PERPKIT_*` environment variables,
    /// which are overridden by the flags below.
    #[arg(long, alias = "conf", env = "PERPKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit without deploying.
    #[arg(long)]
    pub dump_config: bool,

    /// Deployment settings.
    #[clap(flatten)]
    pub deploy: DeployArgs,
}

/// Deployment settings. Unset flags fall back to the configuration file,
/// the environment, then the built-in defaults.
#[derive(Debug, Clone, Default, Parser)]
pub struct DeployArgs {
    /// Name of the contract to deploy.
    ///
    /// Defaults to PerpetualFutures.
    #[arg(long)]
    pub contract: Option<String>,

    /// Directory containing the compiled artifacts (Hardhat `artifacts/` or Foundry `out/`).
    ///
    /// Defaults to ./artifacts.
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Initial reference price (constructor argument 0).
    ///
    /// Any signed integer up to 256 bits. Defaults to 1000.
    #[arg(long, value_parser = parse_parameter, allow_negative_numbers = true)]
    pub initial_price: Option<I256>,

    /// Funding rate in basis points (constructor argument 1).
    ///
    /// Any signed integer up to 256 bits. Defaults to 50.
    #[arg(
        long,
        alias = "funding-rate",
        value_parser = parse_parameter,
        allow_negative_numbers = true
    )]
    pub funding_rate_bps: Option<I256>,

    /// The URL of the JSON-RPC endpoint to deploy to.
    ///
    /// Defaults to a local node at http://127.0.0.1:8545.
    #[arg(long, alias = "rpc")]
    pub rpc_url: Option<Url>,

    /// The deploying account. Must be unlocked on the node.
    ///
    /// Defaults to the node's first account.
    #[arg(long)]
    pub from: Option<Address>,

    /// Gas limit of the deployment transaction. Estimated by the node if not set.
    #[arg(long)]
    pub gas_limit: Option<u64>,

    /// Number of blocks, counting the inclusion block, before the deployment is final.
    ///
    /// Defaults to 1.
    #[arg(long)]
    pub confirmations: Option<u64>,

    /// Maximum time to wait for confirmation, in seconds.
    ///
    /// Defaults to 300.
    #[arg(long, alias = "timeout")]
    pub timeout_secs: Option<u64>,

    /// Interval between receipt polls, in milliseconds.
    ///
    /// Defaults to 1000.
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}

impl DeployArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            contract: self.contract.clone(),
            artifacts: self.artifacts.clone(),
            initial_price: self.initial_price,
            funding_rate_bps: self.funding_rate_bps,
            rpc_url: self.rpc_url.clone(),
            from: self.from,
            gas_limit: self.gas_limit,
            confirmations: self.confirmations,
            timeout_secs: self.timeout_secs,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}
