use std::collections::HashMap;

use itertools::Itertools;

use super::{ClaimRecord, Vote};
use crate::types::{Address, Points};

/// Running per-voter totals while consuming a group's votes.
#[derive(Debug, Clone, Default)]
struct AggregatedVoter {
    total_points: Points,
    votes_cast: usize,
}

/// Folds a group's votes into one [`ClaimRecord`] per qualifying voter.
///
/// A voter qualifies only with exactly `group_size` votes cast; anyone
/// short of that is dropped silently. Claim points are the mean voting
/// power over the group. Summation is commutative, so vote order does
/// not affect the values; the result is sorted by address so the output
/// artifact is reproducible as well.
pub fn aggregate_votes(group_size: usize, votes: impl IntoIterator<Item = Vote>) -> Vec<ClaimRecord> {
    let mut by_voter: HashMap<Address, AggregatedVoter> = HashMap::new();

    for vote in votes {
        let entry = by_voter.entry(vote.voter).or_default();
        // Decimal addition panics past Decimal::MAX (~7.9e28); per-group
        // voting power sums sit many orders of magnitude below that, and
        // a mean anywhere near it is rejected at leaf encoding.
        entry.total_points += vote.vp;
        entry.votes_cast += 1;
    }

    by_voter
        .into_iter()
        .filter(|(_, totals)| totals.votes_cast == group_size)
        .map(|(address, totals)| ClaimRecord {
            address,
            points: totals.total_points / Points::from(group_size as u64),
        })
        .sorted_by_key(|record| record.address)
        .collect()
}
