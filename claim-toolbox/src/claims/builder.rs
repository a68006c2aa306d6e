use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    aggregate_votes, encode_leaf, ClaimError, ClaimRecord, MerkleTree, PointsEncoding, Proposal,
    ProposalGroup, SourceError, Vote,
};
use crate::types::Bytes32;

/// The data-source seam: two read-only, idempotent queries. The
/// pipeline assumes eventual success or an explicit failure and never
/// retries on its own.
pub trait VoteSource: Sync {
    fn fetch_proposals(&self) -> Result<Vec<Proposal>, SourceError>;

    fn fetch_votes(&self, proposal_ids: &[String]) -> Result<Vec<Vote>, SourceError>;
}

/// What a single group's failure does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Any group failure aborts the whole run.
    Strict,
    /// A failing group is logged and skipped; the rest still build.
    #[default]
    Lenient,
}

/// Cooperative cancellation flag, cheap to clone across threads. A
/// cancelled build finishes with [`ClaimError::Cancelled`] and emits no
/// partial claim set.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One group's slice of the output artifact: the Merkle root plus the
/// claims it commits to. `points` here stays the rational mean; the
/// integer that was hashed is derivable from it via the run's
/// [`PointsEncoding`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupClaims {
    pub root: Bytes32,
    pub votes: Vec<ClaimRecord>,
}

/// The finished artifact, keyed by group id.
pub type ClaimSet = BTreeMap<Bytes32, GroupClaims>;

/// Drives one full build: fetch proposals, group them by voting window,
/// then fan the independent groups out in parallel and collect their
/// roots. Groups share no mutable state, so the only synchronization is
/// the final collection.
pub struct ClaimBuilder<S> {
    source: S,
    encoding: PointsEncoding,
    strictness: Strictness,
    cancel: CancelToken,
}

impl<S: VoteSource> ClaimBuilder<S> {
    pub fn new(source: S, encoding: PointsEncoding) -> Self {
        Self {
            source,
            encoding,
            strictness: Strictness::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// A handle the caller can use to abort the build from another
    /// thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn build(&self) -> Result<ClaimSet, ClaimError> {
        let proposals = self.source.fetch_proposals().map_err(ClaimError::Fetch)?;
        info!(proposals = proposals.len(), "fetched proposals");

        let groups = self.group_by_window(proposals)?;

        let results: Vec<Result<Option<(Bytes32, GroupClaims)>, ClaimError>> = groups
            .par_iter()
            .map(|group| self.build_group(group))
            .collect();

        let mut claim_set = ClaimSet::new();
        for result in results {
            match result {
                Ok(Some((group_id, claims))) => {
                    claim_set.insert(group_id, claims);
                }
                Ok(None) => {}
                Err(ClaimError::Cancelled) => return Err(ClaimError::Cancelled),
                Err(err) => match self.strictness {
                    Strictness::Strict => return Err(err),
                    Strictness::Lenient => warn!(%err, "group failed, skipping"),
                },
            }
        }

        if self.cancel.is_cancelled() {
            return Err(ClaimError::Cancelled);
        }

        Ok(claim_set)
    }

    fn group_by_window(&self, proposals: Vec<Proposal>) -> Result<Vec<ProposalGroup>, ClaimError> {
        let mut groups = vec![];
        for (_, members) in proposals.into_iter().into_group_map_by(|p| (p.start, p.end)) {
            match ProposalGroup::try_new(&members) {
                Ok(group) => groups.push(group),
                Err(err) => match self.strictness {
                    Strictness::Strict => return Err(err),
                    Strictness::Lenient => warn!(%err, "malformed group, skipping"),
                },
            }
        }
        Ok(groups)
    }

    fn build_group(
        &self,
        group: &ProposalGroup,
    ) -> Result<Option<(Bytes32, GroupClaims)>, ClaimError> {
        if self.cancel.is_cancelled() {
            return Err(ClaimError::Cancelled);
        }

        let group_id = group.group_id();
        let votes = self
            .source
            .fetch_votes(group.raw_ids())
            .map_err(ClaimError::Fetch)?;
        let claims = aggregate_votes(group.size(), votes);

        // A group every voter got disqualified from is a legitimate
        // outcome: it is omitted from the artifact rather than committed
        // to some made-up root.
        if claims.is_empty() {
            warn!(group = %group_id, "no qualifying voters, omitting group");
            return Ok(None);
        }

        let mut leaves = claims
            .iter()
            .map(|claim| encode_leaf(claim, self.encoding))
            .collect::<Result<Vec<_>, _>>()?;
        // Canonical leaf order, so the root is independent of how the
        // claims were produced.
        leaves.sort();

        let tree = MerkleTree::from_leaves(leaves)?;
        let root = tree.root();
        info!(group = %group_id, claims = claims.len(), root = %root, "built claim group");

        Ok(Some((group_id, GroupClaims { root, votes: claims })))
    }
}
