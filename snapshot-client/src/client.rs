use graphql_client::{GraphQLQuery, Response};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Config;

/// Proposals are fetched in pages of this size.
const PROPOSALS_PAGE_SIZE: i64 = 100;
/// Votes are fetched in pages of this size, matching the hub's maximum.
const VOTES_PAGE_SIZE: i64 = 1000;

#[derive(GraphQLQuery)]
#[graphql(
    query_path = "queries/proposals.graphql",
    schema_path = "schema/snapshot.graphql",
    response_derives = "Debug, Clone"
)]
struct ProposalsQuery;

#[derive(GraphQLQuery)]
#[graphql(
    query_path = "queries/votes.graphql",
    schema_path = "schema/snapshot.graphql",
    response_derives = "Debug, Clone"
)]
struct VotesQuery;

/// A governance proposal as returned by the hub. Immutable once fetched.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    /// Unix timestamp (seconds) at which voting opens.
    pub start: i64,
    /// Unix timestamp (seconds) at which voting closes.
    pub end: i64,
    /// Block number the voting power snapshot was taken at.
    pub snapshot: Option<String>,
    pub state: Option<String>,
}

/// One cast vote. `vp` is a float on the wire and can carry more than
/// four decimals; it is not rounded here.
#[derive(Debug, Clone)]
pub struct Vote {
    pub proposal_id: String,
    pub voter: String,
    pub vp: f64,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("graphql query failed: {0:?}")]
    GraphQl(Vec<graphql_client::Error>),

    #[error("response carried neither data nor errors")]
    EmptyResponse,
}

/// Blocking client over the hub's GraphQL endpoint.
pub struct SnapshotClient {
    http: reqwest::blocking::Client,
    config: Config,
}

impl SnapshotClient {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches every proposal of the configured space created at or
    /// after the configured cutoff.
    pub fn proposals(&self) -> Result<Vec<Proposal>, ClientError> {
        let mut proposals = vec![];
        let mut skip = 0;

        loop {
            let data = self.post::<ProposalsQuery>(proposals_query::Variables {
                space: self.config.space.clone(),
                created_gte: self.config.created_gte,
                first: PROPOSALS_PAGE_SIZE,
                skip,
            })?;

            let page: Vec<_> = data.proposals.unwrap_or_default().into_iter().flatten().collect();
            let page_len = page.len() as i64;
            debug!(page_len, skip, "fetched proposals page");

            proposals.extend(page.into_iter().map(|p| Proposal {
                id: p.id,
                title: p.title,
                start: p.start,
                end: p.end,
                snapshot: p.snapshot,
                state: p.state,
            }));

            if page_len < PROPOSALS_PAGE_SIZE {
                return Ok(proposals);
            }
            skip += PROPOSALS_PAGE_SIZE;
        }
    }

    /// Fetches every vote cast on any of the given proposals.
    pub fn votes(&self, proposal_ids: &[String]) -> Result<Vec<Vote>, ClientError> {
        let mut votes = vec![];
        let mut skip = 0;

        loop {
            let data = self.post::<VotesQuery>(votes_query::Variables {
                proposal_in: Some(proposal_ids.iter().cloned().map(Some).collect()),
                first: VOTES_PAGE_SIZE,
                skip,
            })?;

            let page: Vec<_> = data.votes.unwrap_or_default().into_iter().flatten().collect();
            let page_len = page.len() as i64;
            debug!(page_len, skip, "fetched votes page");

            votes.extend(page.into_iter().filter_map(vote_from_wire));

            if page_len < VOTES_PAGE_SIZE {
                return Ok(votes);
            }
            skip += VOTES_PAGE_SIZE;
        }
    }

    fn post<Q: GraphQLQuery>(&self, variables: Q::Variables) -> Result<Q::ResponseData, ClientError> {
        let body = Q::build_query(variables);
        let response: Response<Q::ResponseData> = self
            .http
            .post(self.config.endpoint.as_str())
            .json(&body)
            .send()?
            .json()?;

        if let Some(errors) = response.errors {
            if !errors.is_empty() {
                return Err(ClientError::GraphQl(errors));
            }
        }

        response.data.ok_or(ClientError::EmptyResponse)
    }
}

/// Converts one wire vote, dropping it when it carries no proposal
/// reference and zeroing a null voting power. Both cases are logged so
/// discarded data stays visible.
fn vote_from_wire(vote: votes_query::VotesQueryVotes) -> Option<Vote> {
    let proposal = match vote.proposal {
        Some(proposal) => proposal,
        None => {
            warn!(voter = %vote.voter, "vote without a proposal reference, skipping");
            return None;
        }
    };

    let vp = vote.vp.unwrap_or_else(|| {
        warn!(voter = %vote.voter, "vote without voting power, counting as zero");
        0.0
    });

    Some(Vote {
        proposal_id: proposal.id,
        voter: vote.voter,
        vp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposals_query_body_carries_variables() {
        let body = ProposalsQuery::build_query(proposals_query::Variables {
            space: "vote.example.eth".into(),
            created_gte: 1_700_000_000,
            first: PROPOSALS_PAGE_SIZE,
            skip: 0,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["space"], "vote.example.eth");
        assert_eq!(json["variables"]["first"], 100);
    }

    fn wire_vote(vp: Option<f64>, with_proposal: bool) -> votes_query::VotesQueryVotes {
        votes_query::VotesQueryVotes {
            voter: "0xvoter".into(),
            vp,
            proposal: with_proposal.then(|| votes_query::VotesQueryVotesProposal {
                id: "0xproposal".into(),
            }),
        }
    }

    #[test]
    fn null_voting_power_counts_as_zero() {
        let vote = vote_from_wire(wire_vote(None, true)).unwrap();
        assert_eq!(vote.vp, 0.0);
        assert_eq!(vote.proposal_id, "0xproposal");
    }

    #[test]
    fn vote_without_proposal_is_dropped() {
        assert!(vote_from_wire(wire_vote(Some(1.5), false)).is_none());
    }

    #[test]
    fn votes_query_body_carries_proposal_ids() {
        let body = VotesQuery::build_query(votes_query::Variables {
            proposal_in: Some(vec![Some("0xabc".into())]),
            first: VOTES_PAGE_SIZE,
            skip: 0,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["proposalIn"][0], "0xabc");
    }
}
