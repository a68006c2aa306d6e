//! Builds the Merkle commitment for a governance-participation airdrop.
//!
//! Proposals sharing a voting window form one eligibility unit; voters
//! who voted on every proposal of a unit earn claim points equal to
//! their mean voting power across it. Each unit's `(address, points)`
//! pairs are hashed into leaves of a sorted-pair Merkle tree whose root
//! is what claimants later prove against on chain.
//!
//! Everything in the pipeline is deterministic by construction: ids are
//! normalized and sorted before the group id is hashed, aggregation is
//! commutative, leaves are sorted before the tree is built, and sibling
//! hashes are sorted at every pairing.

pub mod claims;
mod snapshot;
mod types;

pub use snapshot::SnapshotSource;
pub use types::{keccak256, Address, Bytes32, HexParseError, Points};
