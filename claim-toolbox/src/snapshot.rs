use rust_decimal::prelude::FromPrimitive;
use snapshot_client::SnapshotClient;

use crate::claims::{Proposal, SourceError, Vote, VoteSource};
use crate::types::Points;

/// Bridges the GraphQL hub client into the pipeline's data-source seam,
/// parsing wire strings and floats into domain types at the boundary.
pub struct SnapshotSource {
    client: SnapshotClient,
}

impl SnapshotSource {
    pub fn new(client: SnapshotClient) -> Self {
        Self { client }
    }
}

impl VoteSource for SnapshotSource {
    fn fetch_proposals(&self) -> Result<Vec<Proposal>, SourceError> {
        Ok(self
            .client
            .proposals()?
            .into_iter()
            .map(|p| Proposal {
                id: p.id,
                start: p.start,
                end: p.end,
            })
            .collect())
    }

    fn fetch_votes(&self, proposal_ids: &[String]) -> Result<Vec<Vote>, SourceError> {
        self.client
            .votes(proposal_ids)?
            .into_iter()
            .map(|v| {
                let voter = v.voter.parse()?;
                let vp = Points::from_f64(v.vp)
                    .ok_or_else(|| format!("voting power {} is not representable", v.vp))?;
                Ok(Vote::new(voter, vp))
            })
            .collect()
    }
}
