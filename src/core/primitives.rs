use bitcoin::hashes::{sha256, Hash};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// BOLT4 failure message used when a held HTLC runs out of time
/// (`temporary_node_failure`).
pub const EXPIRED_FAILURE_MESSAGE: &str = "2002";

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("expected 64 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

fn parse_32_bytes(s: &str) -> Result<[u8; 32], ParseError> {
    if s.len() != 64 {
        return Err(ParseError::InvalidLength(s.len()));
    }
    let mut buf = [0u8; 32];
    hex::decode_to_slice(s, &mut buf)?;
    Ok(buf)
}

/// The identifier of a payment: `SHA-256` of its preimage.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentHash([u8; 32]);

impl PaymentHash {
    pub fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// The secret whose hash is a [`PaymentHash`]. Revealing it settles the
/// payment.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Preimage([u8; 32]);

impl Preimage {
    pub fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn payment_hash(&self) -> PaymentHash {
        PaymentHash(sha256::Hash::hash(&self.0).to_byte_array())
    }
}

macro_rules! impl_hex_newtype {
    ($t:ident) => {
        impl FromStr for $t {
            type Err = ParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_32_bytes(s).map(Self)
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($t), self)
            }
        }

        impl Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                use serde::de::Error;
                let s = String::deserialize(deserializer)?;
                Self::from_str(&s).map_err(|e| Error::custom(e.to_string()))
            }
        }
    };
}

impl_hex_newtype!(PaymentHash);
impl_hex_newtype!(Preimage);
