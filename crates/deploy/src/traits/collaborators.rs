//! Seams to the external collaborators of a deployment.

use std::future::Future;

use crate::{
    ContractFactory, DeploymentError, DeploymentHandle, DeploymentResult, DeploymentTransaction,
};

/// Resolves a contract name to a deployable factory.
///
/// Implementations fail with [`DeploymentError::Resolution`] when the artifact is
/// missing or cannot be loaded.
pub trait ArtifactSource {
    fn resolve(&self, contract_name: &str) -> Result<ContractFactory, DeploymentError>;
}

/// The network (and the signer behind it) a deployment is sent to.
///
/// `confirm` consumes the handle returned by `submit`: a transaction can only be
/// waited on once it has been accepted.
pub trait DeploymentNetwork: Send + Sync {
    /// Send the transaction and return as soon as it is in the pending pool.
    ///
    /// Consumes one nonce of the sending account, even if later stages fail.
    fn submit(
        &self,
        tx: DeploymentTransaction,
    ) -> impl Future<Output = Result<DeploymentHandle, DeploymentError>> + Send;

    /// Wait until the transaction is final according to the network's confirmation policy.
    fn confirm(
        &self,
        handle: DeploymentHandle,
    ) -> impl Future<Output = Result<DeploymentResult, DeploymentError>> + Send;
}
