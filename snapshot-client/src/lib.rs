//! Read-only client for a Snapshot-hub style GraphQL voting API.
//!
//! Exposes the two query shapes the claim pipeline consumes: proposals
//! for a space and votes for a list of proposal ids. No retry logic
//! lives here; failures surface as [`ClientError`] and the caller
//! decides what to do with them.

mod client;
mod config;

pub use client::{ClientError, Proposal, SnapshotClient, Vote};
pub use config::{Config, DEFAULT_ENDPOINT};
