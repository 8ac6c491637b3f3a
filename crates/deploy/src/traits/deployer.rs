//! Type-state deployment: one value per run, advanced stage by stage.

use std::io::Write;

use super::collaborators::{ArtifactSource, DeploymentNetwork};
use super::stages::{
    Confirmed, DeploymentStage, DeploymentState, FactoryResolved, NextStage, NotStarted, Reported,
    Submitted,
};
use crate::{DeploymentError, DeploymentHandle, DeploymentParameters, DeploymentResult, report};

/// A single deployment run in stage `S`.
///
/// Each transition consumes the deployment and returns it in the next stage, so the
/// stages can only run in order and only once.
#[derive(Debug)]
pub struct Deployment<S: DeploymentStage> {
    contract_name: String,
    params: DeploymentParameters,
    stage: S,
}

impl<S: DeploymentStage> Deployment<S> {
    /// The run state of this deployment.
    pub fn state(&self) -> DeploymentState {
        S::STATE
    }
}

/// Enter the stage following `S`.
fn advance<S: NextStage>(
    contract_name: String,
    params: DeploymentParameters,
    next: S::Next,
) -> Deployment<S::Next> {
    tracing::debug!(
        contract = %contract_name,
        from = %S::STATE,
        to = %<S::Next as DeploymentStage>::STATE,
        "Deployment stage transition"
    );

    Deployment {
        contract_name,
        params,
        stage: next,
    }
}

impl Deployment<NotStarted> {
    pub fn new(contract_name: impl Into<String>, params: DeploymentParameters) -> Self {
        Self {
            contract_name: contract_name.into(),
            params,
            stage: NotStarted,
        }
    }

    /// Resolve the contract factory from the compiled artifacts.
    pub fn resolve<A: ArtifactSource + ?Sized>(
        self,
        artifacts: &A,
    ) -> Result<Deployment<FactoryResolved>, DeploymentError> {
        let factory = artifacts.resolve(&self.contract_name)?;

        tracing::info!(
            state = %DeploymentState::FactoryResolved,
            contract = %self.contract_name,
            bytecode_len = factory.bytecode().len(),
            constructor_inputs = factory.constructor_inputs().len(),
            "Contract factory resolved"
        );

        Ok(advance::<NotStarted>(
            self.contract_name,
            self.params,
            FactoryResolved { factory },
        ))
    }
}

impl Deployment<FactoryResolved> {
    /// Submit the deployment transaction with the run's constructor parameters.
    ///
    /// Returns once the network has accepted the transaction, before it is mined.
    pub async fn submit<N: DeploymentNetwork + ?Sized>(
        self,
        network: &N,
    ) -> Result<Deployment<Submitted>, DeploymentError> {
        let tx = self.stage.factory.deploy_transaction(&self.params)?;
        let handle = network.submit(tx).await?;

        tracing::info!(
            state = %DeploymentState::Submitted,
            contract = %self.contract_name,
            tx_hash = %handle.tx_hash,
            from = %handle.from,
            initial_price = %self.params.initial_price,
            funding_rate_bps = %self.params.funding_rate_bps,
            "Deployment transaction submitted"
        );

        Ok(advance::<FactoryResolved>(
            self.contract_name,
            self.params,
            Submitted { handle },
        ))
    }
}

impl Deployment<Submitted> {
    pub fn handle(&self) -> &DeploymentHandle {
        &self.stage.handle
    }

    /// Wait for the submitted transaction to be confirmed.
    pub async fn confirm<N: DeploymentNetwork + ?Sized>(
        self,
        network: &N,
    ) -> Result<Deployment<Confirmed>, DeploymentError> {
        let Deployment {
            contract_name,
            params,
            stage: Submitted { handle },
        } = self;

        tracing::info!(tx_hash = %handle.tx_hash, "Waiting for deployment confirmation...");

        let result = network.confirm(handle).await?;

        tracing::info!(
            state = %DeploymentState::Confirmed,
            contract = %contract_name,
            address = %result.address,
            tx_hash = %result.tx_hash,
            block_number = result.block_number,
            "Deployment confirmed"
        );

        Ok(advance::<Submitted>(
            contract_name,
            params,
            Confirmed { result },
        ))
    }
}

impl Deployment<Confirmed> {
    pub fn result(&self) -> &DeploymentResult {
        &self.stage.result
    }

    /// Emit the success record for the confirmed deployment.
    pub fn report<W: Write + ?Sized>(
        self,
        out: &mut W,
    ) -> Result<Deployment<Reported>, DeploymentError> {
        report::report(&self.stage.result, out)?;

        tracing::debug!(
            state = %DeploymentState::Reported,
            contract = %self.contract_name,
            "Deployment reported"
        );

        Ok(advance::<Confirmed>(
            self.contract_name,
            self.params,
            Reported {
                result: self.stage.result,
            },
        ))
    }
}

impl Deployment<Reported> {
    pub fn into_result(self) -> DeploymentResult {
        self.stage.result
    }
}
