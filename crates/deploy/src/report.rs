//! Success record of a deployment.

use std::io::Write;

use anyhow::Context;
use derive_more::Display;

use crate::{DeploymentError, DeploymentResult};

/// The human-readable line emitted for a confirmed deployment:
/// `<ContractName> deployed to: <address>`.
#[derive(Debug, Clone, Copy, Display)]
#[display("{} deployed to: {}", _0.contract_name, _0.address)]
pub struct DeploymentReport<'a>(pub &'a DeploymentResult);

/// Write the success record of `result` as a single line.
pub fn report<W: Write + ?Sized>(
    result: &DeploymentResult,
    out: &mut W,
) -> Result<(), DeploymentError> {
    writeln!(out, "{}", DeploymentReport(result))
        .and_then(|()| out.flush())
        .context("Failed to write deployment record")
        .map_err(DeploymentError::Report)
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::{B256, address};

    use super::*;

    fn result() -> DeploymentResult {
        DeploymentResult {
            contract_name: "PerpetualFutures".to_string(),
            address: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            tx_hash: B256::repeat_byte(0x22),
            block_number: 1,
        }
    }

    #[test]
    fn test_report_line_format() {
        let mut out = Vec::new();
        report(&result(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "PerpetualFutures deployed to: 0x5FbDB2315678afecb367f032d93F642f64180aa3\n"
        );
    }

    #[test]
    fn test_write_failure_is_a_report_error() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = report(&result(), &mut Broken).unwrap_err();
        assert!(matches!(err, DeploymentError::Report(_)));
    }
}
