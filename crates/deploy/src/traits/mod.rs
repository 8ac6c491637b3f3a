//! Trait-based deployment pipeline.
//!
//! A deployment follows a fixed stage order: resolve the contract factory, submit the
//! creation transaction, wait for confirmation, report the address. The order is
//! encoded in the types: each stage can only be entered from the one before it.
//!
//! # Example
//!
//! ```no_run
//! use perpkit_deploy::{ArtifactStore, ConfirmationPolicy, DeploymentParameters, RpcNetwork, deploy_contract};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let artifacts = ArtifactStore::new("artifacts");
//! let network = RpcNetwork::new("http://127.0.0.1:8545".parse()?, ConfirmationPolicy::default())?;
//!
//! let result = deploy_contract(
//!     "PerpetualFutures",
//!     DeploymentParameters::default(),
//!     &artifacts,
//!     &network,
//!     &mut std::io::stdout(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

mod collaborators;
mod deployer;
mod runner;
mod stages;

pub use collaborators::{ArtifactSource, DeploymentNetwork};
pub use deployer::Deployment;
pub use runner::deploy_contract;
pub use stages::{
    Confirmed, DeploymentStage, DeploymentState, FactoryResolved, NextStage, NotStarted, Reported,
    Submitted,
};
