//! perpkit deploys a perpetual-futures contract and prints the address it was deployed to.

mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use perpkit_deploy::{DeployConfig, deploy_contract};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize the logger. Stdout is reserved for the deployment record.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = DeployConfig::load(cli.config.as_deref(), &cli.deploy.to_overrides())?;

    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    tracing::info!(
        contract = %config.contract,
        artifacts = %config.artifacts.display(),
        rpc_url = %config.rpc_url,
        initial_price = %config.initial_price,
        funding_rate_bps = %config.funding_rate_bps,
        confirmations = config.confirmations,
        "Loaded deployment configuration"
    );

    let artifacts = config.artifact_store();
    let network = config.rpc_network()?;

    deploy_contract(
        &config.contract,
        config.params(),
        &artifacts,
        &network,
        &mut std::io::stdout(),
    )
    .await?;

    Ok(())
}
