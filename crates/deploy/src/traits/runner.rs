//! Deployment execution: runs the stages of one deployment in order.

use std::io::Write;

use super::collaborators::{ArtifactSource, DeploymentNetwork};
use super::deployer::Deployment;
use super::stages::DeploymentState;
use crate::{DeploymentError, DeploymentParameters, DeploymentResult};

/// Deploy `contract_name` once and report its address to `out`.
///
/// Resolve, submit, confirm and report run strictly in sequence; the first failure
/// ends the run and is returned unchanged. A failure after submission leaves the
/// transaction outstanding on the network: it is not retried or replaced here.
pub async fn deploy_contract<A, N, W>(
    contract_name: &str,
    params: DeploymentParameters,
    artifacts: &A,
    network: &N,
    out: &mut W,
) -> Result<DeploymentResult, DeploymentError>
where
    A: ArtifactSource + ?Sized,
    N: DeploymentNetwork + ?Sized,
    W: Write + ?Sized,
{
    tracing::info!(
        state = %DeploymentState::NotStarted,
        contract = %contract_name,
        "Starting deployment..."
    );

    let deployment = Deployment::new(contract_name, params);

    // Stage 1: resolve the contract factory
    let deployment = deployment
        .resolve(artifacts)
        .inspect_err(|e| log_failure(DeploymentState::NotStarted, e))?;

    // Stage 2: submit the deployment transaction
    let deployment = deployment
        .submit(network)
        .await
        .inspect_err(|e| log_failure(DeploymentState::FactoryResolved, e))?;

    // Stage 3: wait for confirmation
    let tx_hash = deployment.handle().tx_hash;
    let deployment = deployment.confirm(network).await.inspect_err(|e| {
        tracing::warn!(
            tx_hash = %tx_hash,
            "Deployment transaction was submitted but not confirmed; it may still be pending"
        );
        log_failure(DeploymentState::Submitted, e)
    })?;

    // Stage 4: report the address
    let deployment = deployment
        .report(out)
        .inspect_err(|e| log_failure(DeploymentState::Confirmed, e))?;

    Ok(deployment.into_result())
}

fn log_failure(from: DeploymentState, error: &DeploymentError) {
    tracing::error!(
        state = %DeploymentState::Failed,
        failed_from = %from,
        kind = error.kind(),
        "Deployment failed"
    );
}
