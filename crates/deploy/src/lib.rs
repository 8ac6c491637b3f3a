//! perpkit-deploy - Contract deployment library.
//!
//! This crate deploys a single compiled contract instance to an EVM network and
//! reports the address it was created at. A run resolves the contract factory from
//! the build artifacts, submits the creation transaction, waits for it to be
//! confirmed and emits a `<Contract> deployed to: <address>` record.

mod artifacts;
pub use artifacts::ArtifactStore;

mod config;
pub use config::{
    ConfigOverrides, DEFAULT_ARTIFACTS_DIR, DEFAULT_CONTRACT_NAME, DEFAULT_RPC_URL, DeployConfig,
    ENV_PREFIX,
};

mod error;
pub use error::DeploymentError;

mod factory;
pub use factory::{ContractFactory, DeploymentTransaction};

pub mod network;
pub use network::{ConfirmationPolicy, DeploymentHandle, DeploymentResult, RpcNetwork};

mod params;
pub use params::{
    DEFAULT_FUNDING_RATE_BPS, DEFAULT_INITIAL_PRICE, DeploymentParameters, parse_parameter,
};

mod report;
pub use report::DeploymentReport;

pub mod traits;
pub use traits::{
    ArtifactSource, Deployment, DeploymentNetwork, DeploymentStage, DeploymentState,
    deploy_contract,
};
