//! Network-side types of a deployment and the JSON-RPC network client.

use std::time::Duration;

use alloy_core::primitives::{Address, B256};

mod receipt;
mod rpc;

pub use receipt::{ConfirmationFailure, ReceiptProgress, TransactionReceipt};
pub use rpc::RpcNetwork;

/// Default number of blocks (including the inclusion block) before a deployment is final.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;
/// Default bound on the confirmation wait.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);
/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Reference to a submitted, not yet confirmed, deployment transaction.
///
/// Owned by a single run and consumed by the confirmation step.
#[derive(Debug, PartialEq, Eq)]
pub struct DeploymentHandle {
    /// Name of the contract being created.
    pub contract_name: String,
    /// Hash of the pending transaction.
    pub tx_hash: B256,
    /// The account that sent the transaction.
    pub from: Address,
}

/// A confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    /// Name of the deployed contract.
    pub contract_name: String,
    /// Address of the new contract instance.
    pub address: Address,
    /// Hash of the creation transaction.
    pub tx_hash: B256,
    /// Block the creation transaction was included in.
    pub block_number: u64,
}

/// When a deployment transaction counts as final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Number of blocks, counting the inclusion block, required on top of the receipt.
    pub confirmations: u64,
    /// Maximum time to wait for the confirmations.
    pub timeout: Duration,
    /// Interval between receipt polls.
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
