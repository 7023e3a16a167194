//! Lowest common ancestor queries on a [LineageTree].

use crate::model::tree::{LineageTree, VertexIndex};

/// Answers lowest-common-ancestor queries by climbing parent pointers.
///
/// Parents and depths are cached once on construction, so each query costs
/// `O(depth)`. Lineage trees are shallow (depth is the number of division
/// generations), which keeps this cheaper than a full RMQ structure.
///
/// # Example
/// ```
/// use lintrace::model::{LcaOracle, LineageTree};
///
/// let mut tree = LineageTree::new(0);
/// let root = tree.add_root(vec![]);
/// let x = tree.add_internal(root, vec![]);
/// let a = tree.add_leaf(x, "A", vec![]);
/// let b = tree.add_leaf(x, "B", vec![]);
/// let c = tree.add_leaf(root, "C", vec![]);
///
/// let lca = LcaOracle::new(&tree);
/// assert_eq!(lca.lca(a, b), x);
/// assert_eq!(lca.lca(a, c), root);
/// assert_eq!(lca.depth(x), 1);
/// ```
#[derive(Debug, Clone)]
pub struct LcaOracle {
    parents: Vec<Option<VertexIndex>>,
    depths: Vec<usize>,
}

impl LcaOracle {
    /// Caches parents and depths of all vertices of `tree`.
    pub fn new(tree: &LineageTree) -> Self {
        LcaOracle {
            parents: tree.vertices().iter().map(|v| v.parent_index()).collect(),
            depths: tree.depths(),
        }
    }

    /// Returns the depth of a vertex (root has depth 0).
    pub fn depth(&self, index: VertexIndex) -> usize {
        self.depths[index]
    }

    /// Returns the lowest common ancestor of `u` and `v`.
    pub fn lca(&self, mut u: VertexIndex, mut v: VertexIndex) -> VertexIndex {
        while self.depths[u] > self.depths[v] {
            u = self.parent(u);
        }
        while self.depths[v] > self.depths[u] {
            v = self.parent(v);
        }
        while u != v {
            u = self.parent(u);
            v = self.parent(v);
        }
        u
    }

    /// Returns the lowest common ancestor of three vertices.
    pub fn lca3(&self, a: VertexIndex, b: VertexIndex, c: VertexIndex) -> VertexIndex {
        self.lca(self.lca(a, b), c)
    }

    // Only reached for non-root vertices: a vertex deeper than another,
    // or two distinct vertices at equal depth, always has a parent.
    fn parent(&self, index: VertexIndex) -> VertexIndex {
        self.parents[index].unwrap_or(index)
    }
}
