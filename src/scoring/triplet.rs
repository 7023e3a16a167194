//! Leaf triplets and their outgroups.

use crate::error::{LineageError, Result};
use crate::model::lca::LcaOracle;
use crate::model::tree::{LineageTree, VertexIndex};
use std::fmt;

/// Unordered set of three distinct leaf sample identifiers.
///
/// Stored in sorted order, so two triplets over the same samples are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triplet {
    samples: [String; 3],
}

impl Triplet {
    /// Creates a triplet from three sample identifiers.
    ///
    /// # Panics
    /// Panics if two of the samples are equal.
    pub fn new(a: impl Into<String>, b: impl Into<String>, c: impl Into<String>) -> Self {
        let mut samples = [a.into(), b.into(), c.into()];
        samples.sort();
        assert!(
            samples[0] != samples[1] && samples[1] != samples[2],
            "Triplet needs three distinct samples"
        );
        Triplet { samples }
    }

    /// Returns the samples in sorted order.
    pub fn samples(&self) -> [&str; 3] {
        [
            self.samples[0].as_str(),
            self.samples[1].as_str(),
            self.samples[2].as_str(),
        ]
    }

    /// Returns whether the triplet contains the given sample.
    pub fn contains(&self, sample: &str) -> bool {
        self.samples.iter().any(|s| s == sample)
    }

    /// Resolves the samples to leaf indices of `tree`.
    ///
    /// # Errors
    /// [LineageError::MissingLeaf] naming `tree_name` if a sample is absent.
    pub fn leaves(&self, tree: &LineageTree, tree_name: &str) -> Result<[VertexIndex; 3]> {
        let mut leaves = [0; 3];
        for (leaf, sample) in leaves.iter_mut().zip(&self.samples) {
            *leaf = tree
                .leaf_by_sample(sample)
                .ok_or_else(|| LineageError::missing_leaf(sample, tree_name))?;
        }
        Ok(leaves)
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}, {}, {}}}", self.samples[0], self.samples[1], self.samples[2])
    }
}

/// Topology of a triplet within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outgroup {
    /// The sample at this position of [Triplet::samples] is the outgroup;
    /// the other two form the more closely related pair.
    Leaf(usize),
    /// All three pairwise LCAs coincide (polytomy), no pair is closer.
    Unresolved,
}

impl Outgroup {
    /// Returns `true` if a pair of the triplet is closer than the third leaf.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Outgroup::Leaf(_))
    }
}

/// Determines the outgroup of three leaves.
///
/// Among the three pairwise LCAs the strictly deepest one identifies the
/// sibling pair; the remaining leaf is the outgroup. If no pairwise LCA is
/// strictly deeper than the others the triplet is unresolved.
///
/// # Example
/// ```
/// use lintrace::model::{LcaOracle, LineageTree};
/// use lintrace::scoring::{outgroup, Outgroup};
///
/// let mut tree = LineageTree::new(0);
/// let root = tree.add_root(vec![]);
/// let x = tree.add_internal(root, vec![]);
/// let a = tree.add_leaf(x, "A", vec![]);
/// let b = tree.add_leaf(x, "B", vec![]);
/// let c = tree.add_leaf(root, "C", vec![]);
///
/// let lca = LcaOracle::new(&tree);
/// assert_eq!(outgroup(&lca, [a, b, c]), Outgroup::Leaf(2));
/// assert_eq!(outgroup(&lca, [c, a, b]), Outgroup::Leaf(0));
/// ```
pub fn outgroup(lca: &LcaOracle, leaves: [VertexIndex; 3]) -> Outgroup {
    let [a, b, c] = leaves;
    let ab = lca.depth(lca.lca(a, b));
    let ac = lca.depth(lca.lca(a, c));
    let bc = lca.depth(lca.lca(b, c));

    if ab > ac && ab > bc {
        Outgroup::Leaf(2)
    } else if ac > ab && ac > bc {
        Outgroup::Leaf(1)
    } else if bc > ab && bc > ac {
        Outgroup::Leaf(0)
    } else {
        Outgroup::Unresolved
    }
}

/// Determines the outgroup of a triplet in `tree`.
///
/// # Errors
/// [LineageError::MissingLeaf] if a sample is not a leaf of `tree`.
pub fn triplet_outgroup(
    tree: &LineageTree,
    lca: &LcaOracle,
    triplet: &Triplet,
    tree_name: &str,
) -> Result<Outgroup> {
    Ok(outgroup(lca, triplet.leaves(tree, tree_name)?))
}
