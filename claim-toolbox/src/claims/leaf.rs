use std::fmt::{self, Display};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;

use super::{ClaimError, ClaimRecord};
use crate::types::{keccak256, Bytes32, Points};

/// Claim points carry four decimals of precision under the scaled policy.
const SCALING_FACTOR: u32 = 10_000;

/// How the rational claim points are turned into the integer hashed into
/// a leaf. The policy is part of the on-chain contract: changing it for
/// an epoch that already issued proofs invalidates every one of them,
/// so it is chosen explicitly per run and never defaulted silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsEncoding {
    /// Scale by 10,000 and floor toward zero, keeping four decimals of
    /// voting power in the committed integer.
    ScaledFloor,
    /// Floor the unscaled mean to a whole number of points.
    Truncate,
}

impl PointsEncoding {
    /// Converts the rational mean into the committed integer, or fails
    /// with [`ClaimError::EncodingOverflow`] when the value is negative
    /// or not representable.
    pub fn claim_units(self, points: Points) -> Result<u128, ClaimError> {
        let overflow = || ClaimError::EncodingOverflow {
            points,
            encoding: self,
        };

        let scaled = match self {
            PointsEncoding::ScaledFloor => points
                .checked_mul(Points::from(SCALING_FACTOR))
                .ok_or_else(overflow)?,
            PointsEncoding::Truncate => points,
        };

        scaled.floor().to_u128().ok_or_else(overflow)
    }
}

impl Display for PointsEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointsEncoding::ScaledFloor => write!(f, "scaled-floor"),
            PointsEncoding::Truncate => write!(f, "truncate"),
        }
    }
}

impl FromStr for PointsEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scaled-floor" => Ok(PointsEncoding::ScaledFloor),
            "truncate" => Ok(PointsEncoding::Truncate),
            other => Err(format!("unknown points encoding '{other}'")),
        }
    }
}

/// Hashes one claim into its leaf: Keccak-256 over the packed 20-byte
/// address followed by the claim units as a big-endian unsigned 256-bit
/// integer, the layout the on-chain verifier reconstructs.
pub fn encode_leaf(claim: &ClaimRecord, encoding: PointsEncoding) -> Result<Bytes32, ClaimError> {
    let units = encoding.claim_units(claim.points)?;

    let mut packed = [0u8; 52];
    packed[..20].copy_from_slice(claim.address.as_bytes());
    packed[36..].copy_from_slice(&units.to_be_bytes());
    Ok(keccak256(packed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;
    use rust_decimal_macros::dec;

    fn claim(points: Points) -> ClaimRecord {
        ClaimRecord {
            address: Address([0x11; 20]),
            points,
        }
    }

    #[test]
    fn scaled_floor_keeps_four_decimals() {
        assert_eq!(
            PointsEncoding::ScaledFloor.claim_units(dec!(12.34567)).unwrap(),
            123_456
        );
        assert_eq!(PointsEncoding::ScaledFloor.claim_units(dec!(15)).unwrap(), 150_000);
    }

    #[test]
    fn truncate_drops_the_fraction() {
        assert_eq!(PointsEncoding::Truncate.claim_units(dec!(15.9999)).unwrap(), 15);
    }

    #[test]
    fn overflowing_scale_is_an_error_not_a_panic() {
        // A mean near Decimal's upper bound is still valid input; scaling
        // it must surface as EncodingOverflow.
        assert!(matches!(
            PointsEncoding::ScaledFloor.claim_units(Points::MAX),
            Err(ClaimError::EncodingOverflow { .. })
        ));
        assert!(matches!(
            PointsEncoding::ScaledFloor.claim_units(dec!(10000000000000000000000000000)),
            Err(ClaimError::EncodingOverflow { .. })
        ));
    }

    #[test]
    fn max_points_truncate_without_scaling_still_encodes() {
        assert!(PointsEncoding::Truncate.claim_units(Points::MAX).is_ok());
    }

    #[test]
    fn negative_points_overflow_the_encoding() {
        assert!(matches!(
            PointsEncoding::ScaledFloor.claim_units(dec!(-0.5)),
            Err(ClaimError::EncodingOverflow { .. })
        ));
    }

    #[test]
    fn leaf_is_a_pure_function_of_address_and_points() {
        let a = encode_leaf(&claim(dec!(15)), PointsEncoding::ScaledFloor).unwrap();
        let b = encode_leaf(&claim(dec!(15)), PointsEncoding::ScaledFloor).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn differing_points_produce_differing_leaves() {
        let a = encode_leaf(&claim(dec!(15)), PointsEncoding::ScaledFloor).unwrap();
        let b = encode_leaf(&claim(dec!(15.0001)), PointsEncoding::ScaledFloor).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn policies_commit_to_different_integers() {
        let scaled = encode_leaf(&claim(dec!(15)), PointsEncoding::ScaledFloor).unwrap();
        let raw = encode_leaf(&claim(dec!(15)), PointsEncoding::Truncate).unwrap();
        assert_ne!(scaled, raw);
    }

    #[test]
    fn sub_scaling_dust_floors_to_zero() {
        assert_eq!(
            PointsEncoding::ScaledFloor.claim_units(dec!(0.00009)).unwrap(),
            0
        );
    }
}
