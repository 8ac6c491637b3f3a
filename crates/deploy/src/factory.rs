//! Contract factory: turns a compiled artifact and constructor parameters into a
//! deployment transaction.

use alloy_core::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::{Constructor, Param},
    primitives::{Bytes, I256},
};
use anyhow::{Context, Result};

use crate::{DeploymentError, DeploymentParameters};

/// A handle able to produce deployment transactions for one compiled contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFactory {
    contract_name: String,
    bytecode: Bytes,
    constructor: Option<Constructor>,
}

/// A contract-creation transaction ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTransaction {
    /// Name of the contract being created.
    pub contract_name: String,
    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub data: Bytes,
}

impl ContractFactory {
    pub fn new(
        contract_name: impl Into<String>,
        bytecode: Bytes,
        constructor: Option<Constructor>,
    ) -> Self {
        Self {
            contract_name: contract_name.into(),
            bytecode,
            constructor,
        }
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Constructor inputs declared by the artifact ABI (empty if there is no constructor).
    pub fn constructor_inputs(&self) -> &[Param] {
        self.constructor
            .as_ref()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default()
    }

    /// Build the creation transaction for the given constructor parameters.
    ///
    /// Fails if the arguments cannot be encoded against the constructor ABI.
    pub fn deploy_transaction(
        &self,
        params: &DeploymentParameters,
    ) -> Result<DeploymentTransaction, DeploymentError> {
        let encoded = self
            .encode_constructor_args(&params.to_args())
            .map_err(DeploymentError::Submission)?;

        let mut data = Vec::with_capacity(self.bytecode.len() + encoded.len());
        data.extend_from_slice(&self.bytecode);
        data.extend_from_slice(&encoded);

        Ok(DeploymentTransaction {
            contract_name: self.contract_name.clone(),
            data: data.into(),
        })
    }

    fn encode_constructor_args(&self, args: &[I256]) -> Result<Vec<u8>> {
        let inputs = self.constructor_inputs();

        if inputs.len() != args.len() {
            anyhow::bail!(
                "Incorrect number of arguments to {} constructor: expected {}, got {}",
                self.contract_name,
                inputs.len(),
                args.len()
            );
        }

        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let values = inputs
            .iter()
            .zip(args)
            .map(|(param, value)| encode_arg(param, *value))
            .collect::<Result<Vec<_>>>()?;

        Ok(DynSolValue::Tuple(values).abi_encode_params())
    }
}

/// Coerce an integer argument into the ABI type declared for a constructor input.
fn encode_arg(param: &Param, value: I256) -> Result<DynSolValue> {
    let ty: DynSolType = param
        .resolve()
        .with_context(|| format!("Invalid constructor input type `{}`", param.ty))?;

    let (fits, encoded) = match ty {
        DynSolType::Uint(bits) => (
            !value.is_negative() && value.into_raw().bit_len() <= bits,
            DynSolValue::Uint(value.into_raw(), bits),
        ),
        DynSolType::Int(bits) => {
            // Bits needed besides the sign bit: those of `x` if positive, of `-x - 1` otherwise.
            let magnitude = if value.is_negative() {
                !value.into_raw()
            } else {
                value.into_raw()
            };
            (magnitude.bit_len() < bits, DynSolValue::Int(value, bits))
        }
        _ => anyhow::bail!(
            "Unsupported constructor input `{}` of type {}: only integer inputs are supported",
            param.name,
            param.ty
        ),
    };

    if !fits {
        anyhow::bail!(
            "Value {} does not fit constructor input `{}` of type {}",
            value,
            param.name,
            param.ty
        );
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use alloy_core::{json_abi::JsonAbi, primitives::U256};

    use super::*;

    fn int(value: i64) -> I256 {
        I256::try_from(value).unwrap()
    }

    fn params(initial_price: i64, funding_rate_bps: i64) -> DeploymentParameters {
        DeploymentParameters::new(int(initial_price), int(funding_rate_bps))
    }

    fn constructor(abi: &str) -> Option<Constructor> {
        let abi: JsonAbi = serde_json::from_str(abi).unwrap();
        abi.constructor
    }

    fn perpetual_futures_factory() -> ContractFactory {
        ContractFactory::new(
            "PerpetualFutures",
            Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
            constructor(
                r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[
                    {"name":"_initialPrice","type":"uint256","internalType":"uint256"},
                    {"name":"_fundingRate","type":"uint256","internalType":"uint256"}
                ]}]"#,
            ),
        )
    }

    #[test]
    fn test_deploy_transaction_appends_encoded_args() {
        let factory = perpetual_futures_factory();
        let tx = factory
            .deploy_transaction(&params(1000, 50))
            .unwrap();

        assert_eq!(tx.contract_name, "PerpetualFutures");
        // 4 bytes of code + 2 words of arguments
        assert_eq!(tx.data.len(), 4 + 64);
        assert_eq!(&tx.data[..4], &[0x60, 0x80, 0x60, 0x40]);
        assert_eq!(U256::from_be_slice(&tx.data[4..36]), U256::from(1000));
        assert_eq!(U256::from_be_slice(&tx.data[36..68]), U256::from(50));
    }

    #[test]
    fn test_argument_count_mismatch() {
        let factory = ContractFactory::new(
            "NoArgs",
            Bytes::from_static(&[0x60, 0x80]),
            None,
        );

        let err = factory
            .deploy_transaction(&DeploymentParameters::default())
            .unwrap_err();
        assert!(matches!(err, DeploymentError::Submission(_)));
        assert!(format!("{:#}", anyhow::Error::from(err)).contains("expected 0, got 2"));
    }

    #[test]
    fn test_value_out_of_range() {
        let factory = ContractFactory::new(
            "Small",
            Bytes::from_static(&[0x60, 0x80]),
            constructor(
                r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[
                    {"name":"price","type":"uint8"},
                    {"name":"rate","type":"int16"}
                ]}]"#,
            ),
        );

        assert!(factory.deploy_transaction(&params(1000, 50)).is_err());
        assert!(factory.deploy_transaction(&params(200, 50)).is_ok());
        assert!(factory.deploy_transaction(&params(200, 40_000)).is_err());
        // int16 spans [-32768, 32767]
        assert!(factory.deploy_transaction(&params(255, -32_768)).is_ok());
        assert!(factory.deploy_transaction(&params(255, 32_767)).is_ok());
        assert!(factory.deploy_transaction(&params(255, -32_769)).is_err());
        assert!(factory.deploy_transaction(&params(255, 32_768)).is_err());
        // uint8 takes no negative values
        assert!(factory.deploy_transaction(&params(-1, 50)).is_err());
    }

    #[test]
    fn test_negative_signed_argument() {
        let factory = ContractFactory::new(
            "SignedRate",
            Bytes::from_static(&[0x60, 0x80]),
            constructor(
                r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[
                    {"name":"_initialPrice","type":"uint256"},
                    {"name":"_fundingRate","type":"int256"}
                ]}]"#,
            ),
        );

        let tx = factory.deploy_transaction(&params(1000, -50)).unwrap();

        // Two's complement, sign-extended to the full word.
        let rate = &tx.data[2 + 32..];
        assert_eq!(rate.len(), 32);
        assert_eq!(I256::from_raw(U256::from_be_slice(rate)), int(-50));
        assert!(rate[..31].iter().all(|byte| *byte == 0xff));
    }

    #[test]
    fn test_argument_wider_than_u64() {
        let wide = crate::parse_parameter("1000000000000000000000").unwrap();
        let tx = perpetual_futures_factory()
            .deploy_transaction(&DeploymentParameters::new(wide, int(50)))
            .unwrap();

        assert_eq!(
            U256::from_be_slice(&tx.data[4..36]).to_string(),
            "1000000000000000000000"
        );
    }

    #[test]
    fn test_non_integer_input_rejected() {
        let factory = ContractFactory::new(
            "Named",
            Bytes::from_static(&[0x60, 0x80]),
            constructor(
                r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[
                    {"name":"name","type":"string"},
                    {"name":"rate","type":"uint256"}
                ]}]"#,
            ),
        );

        let err = factory
            .deploy_transaction(&DeploymentParameters::default())
            .unwrap_err();
        assert!(format!("{:#}", anyhow::Error::from(err)).contains("only integer inputs"));
    }
}
