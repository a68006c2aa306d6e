use thiserror::Error;

use crate::types::{keccak256, Bytes32};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MerkleError {
    #[error("cannot build a tree without leaves")]
    EmptyTree,

    #[error("leaf is not part of the tree")]
    LeafNotFound,
}

/// Binary hash tree with sibling hashes sorted byte-wise before being
/// paired, so a proof verifies regardless of branch position. An odd
/// trailing node is promoted unchanged to the next layer; proofs follow
/// the same convention.
///
/// Leaves are hashed in the order given. Callers that need an
/// order-independent root sort the leaf set before building.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    layers: Vec<Vec<Bytes32>>,
}

impl MerkleTree {
    pub fn from_leaves(leaves: Vec<Bytes32>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut layers = vec![leaves];
        while layers.last().map_or(0, Vec::len) > 1 {
            let next = layers
                .last()
                .map_or(&[][..], Vec::as_slice)
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [odd] => *odd,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }

        Ok(Self { layers })
    }

    /// The 32-byte commitment over the whole leaf set.
    pub fn root(&self) -> Bytes32 {
        // from_leaves rejects the empty case, so the top layer holds
        // exactly one node.
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .expect("a built tree has a top layer")
    }

    /// Sibling path from the given leaf up to the root. Promoted odd
    /// nodes contribute no sibling, mirroring construction.
    pub fn proof(&self, leaf: &Bytes32) -> Result<Vec<Bytes32>, MerkleError> {
        let mut index = self
            .layers
            .first()
            .and_then(|leaves| leaves.iter().position(|l| l == leaf))
            .ok_or(MerkleError::LeafNotFound)?;

        let mut path = vec![];
        for layer in &self.layers {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
            if sibling < layer.len() {
                path.push(layer[sibling]);
            }
            index /= 2;
        }

        Ok(path)
    }
}

fn hash_pair(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let mut packed = [0u8; 64];
    packed[..32].copy_from_slice(low.as_bytes());
    packed[32..].copy_from_slice(high.as_bytes());
    keccak256(packed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Bytes32 {
        Bytes32([byte; 32])
    }

    fn verify(root: Bytes32, leaf: Bytes32, proof: &[Bytes32]) -> bool {
        proof.iter().fold(leaf, |acc, sibling| hash_pair(&acc, sibling)) == root
    }

    #[test]
    fn empty_leaf_set_is_rejected() {
        assert_eq!(MerkleTree::from_leaves(vec![]).unwrap_err(), MerkleError::EmptyTree);
    }

    #[test]
    fn single_leaf_root_is_the_leaf() {
        let tree = MerkleTree::from_leaves(vec![leaf(7)]).unwrap();
        assert_eq!(tree.root(), leaf(7));
        assert!(tree.proof(&leaf(7)).unwrap().is_empty());
    }

    #[test]
    fn sibling_order_does_not_change_the_root() {
        let forward = MerkleTree::from_leaves(vec![leaf(1), leaf(2)]).unwrap();
        let reverse = MerkleTree::from_leaves(vec![leaf(2), leaf(1)]).unwrap();
        assert_eq!(forward.root(), reverse.root());
    }

    #[test]
    fn odd_trailing_leaf_is_promoted() {
        let tree = MerkleTree::from_leaves(vec![leaf(1), leaf(2), leaf(3)]).unwrap();
        let expected = hash_pair(&hash_pair(&leaf(1), &leaf(2)), &leaf(3));
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn rebuilding_reproduces_the_root() {
        let leaves = vec![leaf(1), leaf(2), leaf(3), leaf(4), leaf(5)];
        let once = MerkleTree::from_leaves(leaves.clone()).unwrap();
        let twice = MerkleTree::from_leaves(leaves).unwrap();
        assert_eq!(once.root(), twice.root());
    }

    #[test]
    fn every_leaf_proves_against_the_root() {
        let leaves: Vec<_> = (1..=5).map(leaf).collect();
        let tree = MerkleTree::from_leaves(leaves.clone()).unwrap();
        for l in &leaves {
            let proof = tree.proof(l).unwrap();
            assert!(verify(tree.root(), *l, &proof), "leaf {l} failed to verify");
        }
    }

    #[test]
    fn foreign_leaf_has_no_proof() {
        let tree = MerkleTree::from_leaves(vec![leaf(1), leaf(2)]).unwrap();
        assert_eq!(tree.proof(&leaf(9)).unwrap_err(), MerkleError::LeafNotFound);
    }
}
