//! Constructor parameters for the deployed contract.

use alloy_core::primitives::{I256, U256};
use serde::{Deserialize, Serialize};

/// Default reference price passed to the constructor.
pub const DEFAULT_INITIAL_PRICE: u64 = 1000;
/// Default funding rate, in basis points.
pub const DEFAULT_FUNDING_RATE_BPS: u64 = 50;

/// Ordered constructor arguments of the contract.
///
/// The values are passed positionally. No domain validation happens here: whether a
/// funding rate is sane is for the contract to decide. The only range check is the
/// one against the constructor's ABI types, done when the transaction is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentParameters {
    /// Reference price unit (constructor argument 0).
    #[serde(with = "serde_int")]
    pub initial_price: I256,
    /// Periodic funding rate in basis points (constructor argument 1).
    #[serde(with = "serde_int")]
    pub funding_rate_bps: I256,
}

impl Default for DeploymentParameters {
    fn default() -> Self {
        Self {
            initial_price: I256::from_raw(U256::from(DEFAULT_INITIAL_PRICE)),
            funding_rate_bps: I256::from_raw(U256::from(DEFAULT_FUNDING_RATE_BPS)),
        }
    }
}

impl DeploymentParameters {
    pub fn new(initial_price: I256, funding_rate_bps: I256) -> Self {
        Self {
            initial_price,
            funding_rate_bps,
        }
    }

    /// The arguments in constructor order.
    pub fn to_args(&self) -> Vec<I256> {
        vec![self.initial_price, self.funding_rate_bps]
    }
}

/// Parse a decimal (or `0x` hex) integer argument, with an optional sign.
pub fn parse_parameter(value: &str) -> Result<I256, String> {
    value
        .trim()
        .parse()
        .map_err(|e| format!("invalid integer `{value}`: {e}"))
}

/// Serde representation of integer parameters.
///
/// Values that fit an `i64` are written as native integers; wider ones as decimal
/// strings, since TOML integers are 64-bit. Both forms are accepted when reading.
pub(crate) mod serde_int {
    use std::fmt;

    use alloy_core::primitives::I256;
    use serde::{Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &I256, serializer: S) -> Result<S::Ok, S::Error> {
        let text = value.to_string();
        match text.parse::<i64>() {
            Ok(small) => serializer.serialize_i64(small),
            Err(_) => serializer.serialize_str(&text),
        }
    }

    pub fn serialize_some<S: Serializer>(
        value: &Option<I256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<I256, D::Error> {
        deserializer.deserialize_any(IntVisitor)
    }

    struct IntVisitor;

    impl IntVisitor {
        fn parse<E: de::Error>(value: &str) -> Result<I256, E> {
            super::parse_parameter(value).map_err(E::custom)
        }
    }

    impl de::Visitor<'_> for IntVisitor {
        type Value = I256;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a string holding an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<I256, E> {
            Self::parse(&v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<I256, E> {
            Self::parse(&v.to_string())
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<I256, E> {
            Self::parse(&v.to_string())
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<I256, E> {
            Self::parse(&v.to_string())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<I256, E> {
            Self::parse(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> I256 {
        I256::try_from(value).unwrap()
    }

    #[test]
    fn test_args_are_positional() {
        let params = DeploymentParameters::new(int(1000), int(50));
        assert_eq!(params.to_args(), vec![int(1000), int(50)]);

        let swapped = DeploymentParameters::new(int(50), int(1000));
        assert_ne!(params.to_args(), swapped.to_args());
    }

    #[test]
    fn test_default_parameters() {
        assert_eq!(
            DeploymentParameters::default(),
            DeploymentParameters::new(int(1000), int(50))
        );
    }

    #[test]
    fn test_parse_parameter() {
        assert_eq!(parse_parameter("-50").unwrap(), int(-50));
        assert_eq!(parse_parameter(" 1000 ").unwrap(), int(1000));
        assert_eq!(
            parse_parameter("1000000000000000000000").unwrap().to_string(),
            "1000000000000000000000"
        );
        assert!(parse_parameter("fifty").is_err());
    }

    #[test]
    fn test_serde_native_and_wide_values() {
        let params = DeploymentParameters::new(
            parse_parameter("1000000000000000000000").unwrap(),
            int(-50),
        );

        let json = serde_json::to_value(params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "initial_price": "1000000000000000000000",
                "funding_rate_bps": -50
            })
        );
        assert_eq!(
            serde_json::from_value::<DeploymentParameters>(json).unwrap(),
            params
        );
    }
}
