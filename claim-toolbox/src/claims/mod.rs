//! The claim pipeline: proposals grouped by voting window, votes
//! aggregated into per-voter claim points, points committed to a
//! sorted-pair Merkle root for later on-chain verification.

mod aggregate;
mod builder;
mod group;
mod leaf;
mod merkle;

pub use aggregate::aggregate_votes;
pub use builder::{CancelToken, ClaimBuilder, ClaimSet, GroupClaims, Strictness, VoteSource};
pub use group::ProposalGroup;
pub use leaf::{encode_leaf, PointsEncoding};
pub use merkle::{MerkleError, MerkleTree};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Address, Points};

/// Opaque failure from the upstream data source. Never retried here;
/// retry policy belongs to the caller.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// A governance proposal reduced to what the pipeline needs: its
/// venue-assigned id and the voting window used for grouping.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub id: String,
    /// Unix timestamp (seconds) at which voting opens.
    pub start: i64,
    /// Unix timestamp (seconds) at which voting closes.
    pub end: i64,
}

/// One cast vote, parsed into domain types at the source boundary.
#[derive(Debug, Clone)]
pub struct Vote {
    pub voter: Address,
    pub vp: Points,
}

impl Vote {
    pub fn new(voter: Address, vp: Points) -> Self {
        Self { voter, vp }
    }
}

/// A qualifying voter's claim. `points` is the mean voting power across
/// every proposal of the group, kept rational here; the integer form
/// hashed into the leaf is derived from it by the active
/// [`PointsEncoding`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub address: Address,
    pub points: Points,
}

#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("proposal id {id:?} is not a valid 32-byte hex id")]
    InvalidIdFormat { id: String },

    #[error("claim points {points} cannot be encoded as {encoding} claim units")]
    EncodingOverflow {
        points: Points,
        encoding: PointsEncoding,
    },

    #[error("upstream fetch failed")]
    Fetch(#[source] SourceError),

    #[error("claim build cancelled")]
    Cancelled,

    #[error(transparent)]
    Merkle(#[from] MerkleError),
}
