//! JSON-RPC network client used to submit and confirm deployments.

use std::time::{Duration, Instant};

use alloy_core::primitives::{Address, B256, U64};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{
    ConfirmationPolicy, DeploymentHandle, DeploymentResult,
    receipt::{self, ConfirmationFailure, ReceiptProgress, TransactionReceipt},
};
use crate::{DeploymentError, DeploymentNetwork, DeploymentTransaction};

/// Default timeout for RPC requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Consecutive polls on which the node does not know the transaction before it is
/// considered dropped. Load-balanced endpoints may lag behind the replica that
/// accepted it.
const DROPPED_AFTER_UNSEEN_POLLS: u32 = 3;

/// Create an HTTP client configured for JSON-RPC requests.
fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Make a JSON-RPC call and deserialize the result.
///
/// # Arguments
/// * `client` - The HTTP client to use
/// * `url` - The RPC endpoint URL
/// * `method` - The RPC method name
/// * `params` - The method parameters
///
/// # Returns
/// The deserialized result, or an error if the request failed or returned an error response.
async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &Url,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let response = client
        .post(url.clone())
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .with_context(|| format!("Failed to send {} request to {}", method, url))?;

    let result: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", method))?;

    if let Some(error) = result.get("error") {
        anyhow::bail!(
            "RPC error on {}: {}",
            method,
            error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
        );
    }

    let result_value = result
        .get("result")
        .context("No result in response")?
        .clone();

    serde_json::from_value(result_value)
        .with_context(|| format!("Failed to deserialize {} result", method))
}

/// Network client talking to an Ethereum JSON-RPC endpoint.
///
/// Transactions are signed by the node (`eth_sendTransaction`), so the sending account
/// must be unlocked there: a Hardhat or Anvil dev node, or a node fronted by a signer.
#[derive(Debug, Clone)]
pub struct RpcNetwork {
    client: reqwest::Client,
    url: Url,
    from: Option<Address>,
    gas_limit: Option<u64>,
    policy: ConfirmationPolicy,
}

impl RpcNetwork {
    pub fn new(url: Url, policy: ConfirmationPolicy) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: create_client()?,
            url,
            from: None,
            gas_limit: None,
            policy,
        })
    }

    /// Send from this account instead of the node's first managed account.
    pub fn with_from(mut self, from: Option<Address>) -> Self {
        self.from = from;
        self
    }

    /// Use a fixed gas limit instead of letting the node estimate it.
    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, anyhow::Error> {
        json_rpc_call(&self.client, &self.url, method, params).await
    }

    /// The deploying account: the configured one, or the node's first account.
    async fn sender(&self) -> Result<Address, anyhow::Error> {
        if let Some(from) = self.from {
            return Ok(from);
        }

        let accounts: Vec<Address> = self
            .call("eth_accounts", vec![])
            .await
            .context("Failed to list node accounts")?;

        accounts.first().copied().with_context(|| {
            format!(
                "Node at {} manages no accounts; configure a sending address",
                self.url
            )
        })
    }

    async fn latest_block(&self) -> Result<u64, anyhow::Error> {
        let block: U64 = self.call("eth_blockNumber", vec![]).await?;
        Ok(block.to::<u64>())
    }

    /// One poll of the confirmation loop.
    ///
    /// The outer error is transient (RPC transport); the inner one is final.
    async fn poll(
        &self,
        tx_hash: B256,
        last_included: Option<u64>,
    ) -> Result<Result<ReceiptProgress, ConfirmationFailure>, anyhow::Error> {
        let receipt: Option<TransactionReceipt> = self
            .call("eth_getTransactionReceipt", vec![serde_json::json!(tx_hash)])
            .await?;

        if receipt.is_none() && last_included.is_none() {
            let tx: Option<Value> = self
                .call("eth_getTransactionByHash", vec![serde_json::json!(tx_hash)])
                .await?;
            if tx.is_none() {
                return Ok(Err(ConfirmationFailure::Dropped));
            }
            return Ok(Ok(ReceiptProgress::Pending));
        }

        let latest_block = self.latest_block().await?;

        Ok(receipt::evaluate(
            receipt.as_ref(),
            last_included,
            latest_block,
            self.policy.confirmations,
        ))
    }
}

impl DeploymentNetwork for RpcNetwork {
    async fn submit(&self, tx: DeploymentTransaction) -> Result<DeploymentHandle, DeploymentError> {
        let from = self.sender().await.map_err(DeploymentError::Submission)?;

        let mut request = serde_json::json!({
            "from": from,
            "data": tx.data,
        });
        if let Some(gas_limit) = self.gas_limit {
            request["gas"] = Value::String(format!("0x{:x}", gas_limit));
        }

        let tx_hash: B256 = self
            .call("eth_sendTransaction", vec![request])
            .await
            .with_context(|| format!("Network rejected {} deployment", tx.contract_name))
            .map_err(DeploymentError::Submission)?;

        tracing::debug!(
            tx_hash = %tx_hash,
            from = %from,
            data_len = tx.data.len(),
            "Deployment transaction accepted"
        );

        Ok(DeploymentHandle {
            contract_name: tx.contract_name,
            tx_hash,
            from,
        })
    }

    async fn confirm(&self, handle: DeploymentHandle) -> Result<DeploymentResult, DeploymentError> {
        let start = Instant::now();
        let mut last_included = None;
        let mut last_error = None;
        let mut unseen_polls = 0;

        loop {
            if start.elapsed() > self.policy.timeout {
                return Err(DeploymentError::Timeout {
                    tx_hash: handle.tx_hash,
                    waited: start.elapsed(),
                    last_error,
                });
            }

            let outcome = self.poll(handle.tx_hash, last_included).await;
            if outcome.is_ok() {
                last_error = None;
            }

            match outcome {
                Ok(Ok(ReceiptProgress::Final {
                    address,
                    block_number,
                })) => {
                    return Ok(DeploymentResult {
                        contract_name: handle.contract_name,
                        address,
                        tx_hash: handle.tx_hash,
                        block_number,
                    });
                }
                Ok(Ok(ReceiptProgress::Included {
                    block_number,
                    confirmations,
                })) => {
                    tracing::debug!(
                        tx_hash = %handle.tx_hash,
                        block_number,
                        confirmations,
                        required = self.policy.confirmations,
                        "Waiting for confirmations..."
                    );
                    last_included = Some(block_number);
                }
                Ok(Ok(ReceiptProgress::Pending)) => {
                    tracing::trace!(tx_hash = %handle.tx_hash, "Transaction still pending");
                    unseen_polls = 0;
                }
                Ok(Err(ConfirmationFailure::Dropped))
                    if unseen_polls + 1 < DROPPED_AFTER_UNSEEN_POLLS =>
                {
                    unseen_polls += 1;
                    tracing::debug!(
                        tx_hash = %handle.tx_hash,
                        unseen_polls,
                        "Transaction unknown to the node, checking again..."
                    );
                }
                Ok(Err(failure)) => {
                    return Err(DeploymentError::Confirmation {
                        tx_hash: handle.tx_hash,
                        source: failure.into(),
                    });
                }
                Err(e) => {
                    tracing::debug!(error = %e, tx_hash = %handle.tx_hash, "Receipt poll failed, retrying...");
                    last_error = Some(e);
                }
            }

            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }
}
