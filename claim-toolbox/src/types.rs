use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Voting-power arithmetic is done in decimals, never in floats, so the
/// mean computed for a claim is exact and reproducible.
pub type Points = rust_decimal::Decimal;

#[derive(Error, Debug, PartialEq)]
pub enum HexParseError {
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),

    #[error("expected {expected} hex chars, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// A 20-byte account address, displayed as lower-case `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 40 {
            return Err(HexParseError::Length {
                expected: 40,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A 32-byte hash value, displayed as lower-case `0x`-prefixed hex.
/// Ordering is unsigned byte-wise lexicographic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Bytes32 {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 64 {
            return Err(HexParseError::Length {
                expected: 64,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

pub fn keccak256(bytes: impl AsRef<[u8]>) -> Bytes32 {
    let hash = Keccak256::new().chain_update(bytes).finalize();
    Bytes32(hash.into())
}

macro_rules! hex_serde {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_serde!(Address);
hex_serde!(Bytes32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_roundtrips_through_hex() {
        let addr: Address = "0x8F9DA6d38939411340b19401E8c54Ea1f51B8f95"
            .parse()
            .unwrap();
        assert_eq!(addr.to_string(), "0x8f9da6d38939411340b19401e8c54ea1f51b8f95");
        assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert_eq!(
            "0x1234".parse::<Address>(),
            Err(HexParseError::Length {
                expected: 40,
                actual: 4
            })
        );
    }

    #[test]
    fn address_rejects_non_hex() {
        assert!("0xzz9DA6d38939411340b19401E8c54Ea1f51B8f95"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn keccak256_matches_known_vector() {
        // keccak256("") from the reference implementation.
        assert_eq!(
            keccak256([]).to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn bytes32_serializes_as_prefixed_hex() {
        let value = Bytes32([0xab; 32]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
        assert_eq!(serde_json::from_str::<Bytes32>(&json).unwrap(), value);
    }
}
