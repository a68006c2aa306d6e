use itertools::Itertools;

use super::{ClaimError, Proposal};
use crate::types::{keccak256, Bytes32};

/// Proposals sharing one voting window, treated as a single eligibility
/// unit: a voter qualifies only by voting on every member.
///
/// The normalized ids are kept sorted, so the group identifier does not
/// depend on the order proposals were supplied in, nor on whether an id
/// arrived zero-padded or in its short form.
#[derive(Debug, Clone)]
pub struct ProposalGroup {
    /// Ids exactly as the venue assigned them, for vote queries.
    raw_ids: Vec<String>,
    /// Normalized 32-byte ids, sorted ascending byte-wise.
    ids: Vec<Bytes32>,
}

impl ProposalGroup {
    pub fn try_new(proposals: &[Proposal]) -> Result<Self, ClaimError> {
        let ids = proposals
            .iter()
            .map(|p| normalize_id(&p.id))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .sorted()
            .collect();

        Ok(Self {
            raw_ids: proposals.iter().map(|p| p.id.clone()).collect(),
            ids,
        })
    }

    /// Number of proposals in the group, i.e. the number of votes a
    /// voter must have cast to qualify.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn raw_ids(&self) -> &[String] {
        &self.raw_ids
    }

    /// The group's stable identifier: Keccak-256 over the sorted,
    /// zero-padded 32-byte ids packed end-to-end.
    pub fn group_id(&self) -> Bytes32 {
        let mut packed = Vec::with_capacity(self.ids.len() * 32);
        for id in &self.ids {
            packed.extend_from_slice(id.as_bytes());
        }
        keccak256(packed)
    }
}

/// Normalizes a venue-assigned proposal id to its 32-byte form,
/// left-padding short hex ids with zeroes.
fn normalize_id(id: &str) -> Result<Bytes32, ClaimError> {
    let invalid = || ClaimError::InvalidIdFormat { id: id.to_string() };

    let stripped = id.strip_prefix("0x").unwrap_or(id);
    if stripped.len() > 64 {
        return Err(invalid());
    }

    let padded = format!("{stripped:0>64}");
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(&padded, &mut bytes).map_err(|_| invalid())?;
    Ok(Bytes32(bytes))
}
