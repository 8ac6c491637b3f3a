//! Interpretation of transaction receipts while waiting for a deployment.

use alloy_core::primitives::{Address, B256, U64};
use serde::Deserialize;

/// The subset of an `eth_getTransactionReceipt` result needed to confirm a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

/// Progress of a deployment transaction towards finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptProgress {
    /// No receipt yet.
    Pending,
    /// Included, but not enough blocks on top yet.
    Included {
        block_number: u64,
        confirmations: u64,
    },
    /// Included with enough confirmations.
    Final {
        address: Address,
        block_number: u64,
    },
}

/// Reasons a deployment transaction can never be confirmed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmationFailure {
    #[error("transaction reverted in block {block_number}")]
    Reverted { block_number: u64 },
    #[error("receipt in block {block_number} has no contract address")]
    NoContractAddress { block_number: u64 },
    #[error("transaction was reorganized out of block {block_number}")]
    ReorganizedOut { block_number: u64 },
    #[error("transaction was dropped from the pending pool")]
    Dropped,
}

impl TransactionReceipt {
    /// Evaluate the receipt against the latest block.
    ///
    /// `required` counts the inclusion block, so `1` means "mined".
    pub fn progress(
        &self,
        latest_block: u64,
        required: u64,
    ) -> Result<ReceiptProgress, ConfirmationFailure> {
        let Some(block_number) = self.block_number.map(|n| n.to::<u64>()) else {
            return Ok(ReceiptProgress::Pending);
        };

        if self.status.is_some_and(|status| status.is_zero()) {
            return Err(ConfirmationFailure::Reverted { block_number });
        }

        let Some(address) = self.contract_address else {
            return Err(ConfirmationFailure::NoContractAddress { block_number });
        };

        let confirmations = (latest_block + 1).saturating_sub(block_number);
        if confirmations >= required {
            Ok(ReceiptProgress::Final {
                address,
                block_number,
            })
        } else {
            Ok(ReceiptProgress::Included {
                block_number,
                confirmations,
            })
        }
    }
}

/// Combine a (possibly missing) receipt with what was seen on earlier polls.
///
/// `last_included` is the block of the last receipt observed for this transaction.
pub fn evaluate(
    receipt: Option<&TransactionReceipt>,
    last_included: Option<u64>,
    latest_block: u64,
    required: u64,
) -> Result<ReceiptProgress, ConfirmationFailure> {
    match (receipt, last_included) {
        (Some(receipt), _) => receipt.progress(latest_block, required),
        (None, Some(block_number)) => Err(ConfirmationFailure::ReorganizedOut { block_number }),
        (None, None) => Ok(ReceiptProgress::Pending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(json: &str) -> TransactionReceipt {
        serde_json::from_str(json).unwrap()
    }

    const MINED: &str = r#"{
        "transactionHash": "0x2222222222222222222222222222222222222222222222222222222222222222",
        "blockNumber": "0xa",
        "status": "0x1",
        "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
        "gasUsed": "0x5208",
        "logs": []
    }"#;

    #[test]
    fn test_mined_receipt_is_final_with_one_confirmation() {
        let progress = receipt(MINED).progress(10, 1).unwrap();
        assert_eq!(
            progress,
            ReceiptProgress::Final {
                address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap(),
                block_number: 10,
            }
        );
    }

    #[test]
    fn test_waits_for_more_confirmations() {
        let receipt = receipt(MINED);
        assert_eq!(
            receipt.progress(11, 3).unwrap(),
            ReceiptProgress::Included {
                block_number: 10,
                confirmations: 2
            }
        );
        assert!(matches!(
            receipt.progress(12, 3).unwrap(),
            ReceiptProgress::Final { .. }
        ));
    }

    #[test]
    fn test_reverted_receipt() {
        let reverted = receipt(&MINED.replace(r#""status": "0x1""#, r#""status": "0x0""#));
        assert_eq!(
            reverted.progress(10, 1),
            Err(ConfirmationFailure::Reverted { block_number: 10 })
        );
    }

    #[test]
    fn test_receipt_without_contract_address() {
        let not_a_creation = receipt(&MINED.replace(
            r#""contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3""#,
            r#""contractAddress": null"#,
        ));
        assert_eq!(
            not_a_creation.progress(10, 1),
            Err(ConfirmationFailure::NoContractAddress { block_number: 10 })
        );
    }

    #[test]
    fn test_pending_receipt_without_block() {
        let pending = receipt(&MINED.replace(r#""blockNumber": "0xa""#, r#""blockNumber": null"#));
        assert_eq!(pending.progress(10, 1), Ok(ReceiptProgress::Pending));
    }

    #[test]
    fn test_missing_status_is_treated_as_success() {
        let legacy = receipt(&MINED.replace(r#""status": "0x1","#, ""));
        assert!(matches!(legacy.progress(10, 1), Ok(ReceiptProgress::Final { .. })));
    }

    #[test]
    fn test_receipt_disappearing_is_a_reorg() {
        assert_eq!(
            evaluate(None, Some(10), 11, 2),
            Err(ConfirmationFailure::ReorganizedOut { block_number: 10 })
        );
        assert_eq!(evaluate(None, None, 11, 2), Ok(ReceiptProgress::Pending));
    }
}
