//! Positional or named RPC parameter parsing for the operator methods.
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing required parameter: {0}")]
    Missing(&'static str),
    #[error("too many parameters: got {actual}, expected {expected}")]
    TooMany { actual: usize, expected: usize },
    #[error("Invalid argument: '{0}'")]
    InvalidArgument(String),
    #[error("Invalid input: '{0}'")]
    InvalidInput(String),
    #[error("{name}: should be a 32 byte hex value: invalid token '{token}'")]
    InvalidHex { name: &'static str, token: String },
}

/// Extracts the single parameter `name` from `args`, accepting both
/// `["value"]` and `{"name": "value"}`.
fn single_param(args: Value, name: &'static str) -> Result<Value, ParamError> {
    match args {
        Value::Array(mut a) => match a.len() {
            0 => Err(ParamError::Missing(name)),
            1 => Ok(a.remove(0)),
            n => Err(ParamError::TooMany {
                actual: n,
                expected: 1,
            }),
        },
        Value::Object(mut o) => {
            if let Some(k) = o.keys().find(|k| k.as_str() != name) {
                return Err(ParamError::InvalidArgument(k.clone()));
            }
            o.remove(name).ok_or(ParamError::Missing(name))
        }
        other => Err(ParamError::InvalidInput(other.to_string())),
    }
}

/// Parses a 32 byte hex identifier (payment hash or preimage).
pub fn hex_param<T: FromStr>(args: Value, name: &'static str) -> Result<T, ParamError> {
    match single_param(args, name)? {
        Value::String(s) => T::from_str(&s).map_err(|_| ParamError::InvalidHex { name, token: s }),
        other => Err(ParamError::InvalidHex {
            name,
            token: other.to_string(),
        }),
    }
}

/// Accepts `[]`, `{}` or `null` for methods that take no parameters.
pub fn no_params(args: Value) -> Result<(), ParamError> {
    match args {
        Value::Null => Ok(()),
        Value::Array(a) if a.is_empty() => Ok(()),
        Value::Array(a) => Err(ParamError::TooMany {
            actual: a.len(),
            expected: 0,
        }),
        Value::Object(o) => match o.keys().next() {
            Some(k) => Err(ParamError::InvalidArgument(k.clone())),
            None => Ok(()),
        },
        other => Err(ParamError::InvalidInput(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::primitives::{PaymentHash, Preimage};
    use serde_json::json;

    #[test]
    fn accepts_positional_and_named() {
        let hex = "ab".repeat(32);
        let a: PaymentHash = hex_param(json!([hex]), "payment_hash").unwrap();
        let b: PaymentHash = hex_param(json!({ "payment_hash": hex }), "payment_hash").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), hex);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            hex_param::<Preimage>(json!([]), "payment_preimage"),
            Err(ParamError::Missing("payment_preimage"))
        );
        assert_eq!(
            hex_param::<Preimage>(json!(["00", "11"]), "payment_preimage"),
            Err(ParamError::TooMany {
                actual: 2,
                expected: 1
            })
        );
        assert_eq!(
            hex_param::<Preimage>(json!({"preimage": "00"}), "payment_preimage"),
            Err(ParamError::InvalidArgument("preimage".to_string()))
        );
        assert_eq!(
            hex_param::<Preimage>(json!({}), "payment_preimage"),
            Err(ParamError::Missing("payment_preimage"))
        );
        assert_eq!(
            hex_param::<Preimage>(json!("00"), "payment_preimage"),
            Err(ParamError::InvalidInput("\"00\"".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_hex() {
        let err = hex_param::<Preimage>(json!(["ab12"]), "payment_preimage").unwrap_err();
        assert_eq!(
            err.to_string(),
            "payment_preimage: should be a 32 byte hex value: invalid token 'ab12'"
        );
        assert!(hex_param::<Preimage>(json!(["zz".repeat(32)]), "payment_preimage").is_err());
        assert!(hex_param::<Preimage>(json!([42]), "payment_preimage").is_err());
    }

    #[test]
    fn no_params_accepts_empty_only() {
        assert!(no_params(json!([])).is_ok());
        assert!(no_params(json!({})).is_ok());
        assert!(no_params(Value::Null).is_ok());
        assert!(no_params(json!(["x"])).is_err());
        assert!(no_params(json!({"x": 1})).is_err());
    }
}
