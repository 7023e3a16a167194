//! Provides the lineage tree representation.
//!
//! Provides core data structures for representing cell lineage trees:
//! * [LineageTree] - Main tree structure using the arena pattern
//!   for efficient memory layout; used both for simulated ground truth
//!   and for reconstructed trees.
//! * [VertexIndex] as type used to index vertices in tree
//! * [PreOrderIter] and [PostOrderIter] for stack-based traversal

use crate::error::{LineageError, Result};
use crate::model::character_matrix::CharacterMatrix;
use crate::model::sample_map::SampleMap;
use crate::model::state::{format_states, CharacterState, StateId};
use crate::model::vertex::Vertex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A rooted lineage tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by
/// [VertexIndex]. Aim is to avoid referencing troubles as well as to provide
/// efficient memory layout and cache locality for traversal operations.
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena.
/// - Index of root is maintained.
/// - A vertex's index is its unique identifier.
/// - Children are index lists, so polytomies (reconstructed trees) and
///   unifurcations (subsampled trees) are representable.
/// - Every vertex carries a state vector of length [num_characters](Self::num_characters).
/// - Every leaf carries a unique sample identifier.
///
/// # Construction
/// Trees are built top-down: add the root, then attach internal vertices and
/// leaves to already present parents. Once built, a tree is only read.
/// Test validity with [`LineageTree::is_valid()`].
///
/// # Example
/// ```
/// use lintrace::model::{LineageTree, CharacterState};
///
/// let mut tree = LineageTree::new(1);
/// let root = tree.add_root(vec![CharacterState::Unmutated]);
/// let a = tree.add_leaf(root, "A", vec![CharacterState::Mutated(1)]);
/// let b = tree.add_leaf(root, "B", vec![CharacterState::Unmutated]);
///
/// assert_eq!(tree.num_leaves(), 2);
/// assert_eq!(tree.leaf_by_sample("B"), Some(b));
/// assert_eq!(tree.mutations_along_edge(root, a).unwrap(), vec![(0, 1)]);
/// assert!(tree.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeRecord", into = "TreeRecord")]
pub struct LineageTree {
    /// Length of every state vector
    num_characters: usize,

    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,

    /// Leaf lookup by sample identifier
    samples: SampleMap,

    /// Name of tree; optional
    name: Option<String>,
}

// ============================================================================
// New, Construction (pub)
// ============================================================================
impl LineageTree {
    /// Creates a new empty tree whose vertices carry `num_characters` characters.
    pub fn new(num_characters: usize) -> Self {
        Self::with_capacity(num_characters, 0)
    }

    /// Creates a new empty tree with capacity for `num_vertices` vertices.
    pub fn with_capacity(num_characters: usize, num_vertices: usize) -> Self {
        LineageTree {
            num_characters,
            vertices: Vec::with_capacity(num_vertices),
            root_index: NO_ROOT_SET_INDEX,
            samples: SampleMap::new(num_vertices.div_ceil(2)),
            name: None,
        }
    }

    /// Attaches a name to this tree.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds the root to the tree and returns its index.
    ///
    /// # Panics
    /// Panics if a root was already added or `states` has the wrong length.
    pub fn add_root(&mut self, states: Vec<CharacterState>) -> VertexIndex {
        assert!(!self.is_root_set(), "Root already set");
        self.check_states_len(&states);
        let index = self.vertices.len();
        self.vertices.push(Vertex::new_root(index, states));
        self.root_index = index;
        index
    }

    /// Adds an internal vertex below `parent` and returns its index.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds or a leaf,
    /// or if `states` has the wrong length.
    pub fn add_internal(&mut self, parent: VertexIndex, states: Vec<CharacterState>) -> VertexIndex {
        self.check_states_len(&states);
        let index = self.vertices.len();
        self.vertices[parent].push_child(index);
        self.vertices.push(Vertex::new_internal(index, parent, states));
        index
    }

    /// Adds a leaf with the given sample identifier below `parent`
    /// and returns its index.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds or a leaf, if the sample
    /// identifier is already used, or if `states` has the wrong length.
    pub fn add_leaf(
        &mut self,
        parent: VertexIndex,
        sample: impl Into<String>,
        states: Vec<CharacterState>,
    ) -> VertexIndex {
        self.check_states_len(&states);
        let sample = sample.into();
        let index = self.vertices.len();
        assert!(
            self.samples.insert(&sample, index),
            "Duplicate sample identifier '{}'",
            sample
        );
        self.vertices[parent].push_child(index);
        self.vertices
            .push(Vertex::new_leaf(index, parent, sample, states));
        index
    }

    fn check_states_len(&self, states: &[CharacterState]) {
        assert_eq!(
            states.len(),
            self.num_characters,
            "State vector has {} characters, tree expects {}",
            states.len(),
            self.num_characters
        );
    }

    /// Replaces the state vector of a vertex.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds or `states` has the wrong length.
    pub(crate) fn set_states(&mut self, index: VertexIndex, states: Vec<CharacterState>) {
        self.check_states_len(&states);
        *self.vertices[index].states_mut() = states;
    }
}

// ============================================================================
// Getters / Accessors (pub)
// ============================================================================
impl LineageTree {
    /// Returns reference to name of this tree, or `None` if not set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set a name for this tree.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns all vertices in arena order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the number of characters per state vector.
    pub fn num_characters(&self) -> usize {
        self.num_characters
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.samples.len()
    }

    /// Returns the number of internal vertices (excluding root and leaves).
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_internal()).count()
    }

    /// Iterates over the leaves in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter().filter(|v| v.is_leaf())
    }

    /// Returns the sample identifiers in insertion order.
    pub fn samples(&self) -> &[String] {
        self.samples.samples()
    }

    /// Returns the [SampleMap] of this tree.
    pub fn sample_map(&self) -> &SampleMap {
        &self.samples
    }

    /// Returns the index of the leaf with the given sample identifier.
    pub fn leaf_by_sample(&self, sample: &str) -> Option<VertexIndex> {
        self.samples.get(sample)
    }

    /// Returns whether a leaf with the given sample identifier exists.
    pub fn contains_sample(&self, sample: &str) -> bool {
        self.samples.contains(sample)
    }

    /// Returns the parent index of a vertex, `None` for the root.
    pub fn parent(&self, index: VertexIndex) -> Option<VertexIndex> {
        self[index].parent_index()
    }

    /// Returns the number of edges between the root and the given vertex.
    pub fn depth_of(&self, index: VertexIndex) -> usize {
        let mut depth = 0;
        let mut current = index;
        while let Some(parent) = self[current].parent_index() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Returns the depth of every vertex, indexed by [VertexIndex].
    pub fn depths(&self) -> Vec<usize> {
        let mut depths = vec![0; self.num_vertices()];
        for vertex in self.pre_order_iter() {
            if let Some(parent) = vertex.parent_index() {
                depths[vertex.index()] = depths[parent] + 1;
            }
        }
        depths
    }

    /// Returns the maximum depth of any leaf.
    pub fn max_depth(&self) -> usize {
        let depths = self.depths();
        self.leaves().map(|l| depths[l.index()]).max().unwrap_or(0)
    }

    /// Returns the mean depth of the leaves, or 0 for a tree without leaves.
    pub fn mean_leaf_depth(&self) -> f64 {
        if self.num_leaves() == 0 {
            return 0.0;
        }
        let depths = self.depths();
        let total: usize = self.leaves().map(|l| depths[l.index()]).sum();
        total as f64 / self.num_leaves() as f64
    }

    /// Returns the leaves in the subtree rooted at `index` in pre-order.
    pub fn leaves_in_subtree(&self, index: VertexIndex) -> Vec<VertexIndex> {
        self.pre_order_iter_from(index)
            .filter(|v| v.is_leaf())
            .map(|v| v.index())
            .collect()
    }

    /// Returns the number of leaves below every vertex, indexed by [VertexIndex].
    pub fn leaf_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_vertices()];
        for vertex in self.post_order_iter() {
            counts[vertex.index()] = if vertex.is_leaf() {
                1
            } else {
                vertex.children().iter().map(|&c| counts[c]).sum()
            };
        }
        counts
    }

    /// Returns `true` if every non-leaf vertex has exactly two children.
    pub fn is_binary(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.is_leaf() || v.num_children() == 2)
    }

    /// Returns the observed leaves as a [CharacterMatrix], in pre-order.
    pub fn character_matrix(&self) -> CharacterMatrix {
        let mut matrix = CharacterMatrix::new(self.num_characters);
        for leaf in self.pre_order_iter().filter(|v| v.is_leaf()) {
            if let Vertex::Leaf { sample, states, .. } = leaf {
                // Samples are unique and state lengths fixed by construction
                matrix.push_row(sample.clone(), states.clone());
            }
        }
        matrix
    }

    /// Returns the mutations acquired along the edge `parent -> child` as
    /// `(character, state)` pairs, i.e. the characters unmutated at `parent`
    /// and carrying a mutant state at `child`.
    ///
    /// # Errors
    /// [LineageError::InvalidTree] if `parent -> child` is not an edge.
    pub fn mutations_along_edge(
        &self,
        parent: VertexIndex,
        child: VertexIndex,
    ) -> Result<Vec<(usize, StateId)>> {
        if child >= self.num_vertices() || self[child].parent_index() != Some(parent) {
            return Err(LineageError::InvalidTree(format!(
                "edge {parent} -> {child} does not exist"
            )));
        }

        let parent_states = self[parent].states();
        let child_states = self[child].states();
        Ok(parent_states
            .iter()
            .zip(child_states)
            .enumerate()
            .filter_map(|(c, (p, s))| match (p, s) {
                (CharacterState::Unmutated, CharacterState::Mutated(id)) => Some((c, *id)),
                _ => None,
            })
            .collect())
    }
}

// ============================================================================
// Derived trees & ancestral states (pub)
// ============================================================================
impl LineageTree {
    /// Reconstructs the states of all root and internal vertices from the
    /// leaves under Camin-Sokal parsimony (irreversible characters).
    ///
    /// Works bottom-up: a character takes the state shared by all children
    /// that observed it (missing children are ignored); if the children
    /// disagree the character is unmutated, and if all of them are missing
    /// it stays missing.
    pub fn reconstruct_ancestral_characters(&mut self) {
        let order: Vec<VertexIndex> = self.post_order_iter().map(|v| v.index()).collect();
        for index in order {
            if self[index].is_leaf() {
                continue;
            }
            let reconstructed: Vec<CharacterState> = (0..self.num_characters)
                .map(|c| {
                    ancestral_state(self[index].children().iter().map(|&ch| self[ch].state(c)))
                })
                .collect();
            *self.vertices[index].states_mut() = reconstructed;
        }
    }

    /// Returns a copy of this tree that only keeps the given leaves.
    ///
    /// Vertices that no longer lead to any kept leaf are dropped; internal
    /// vertices left with a single child are kept (see
    /// [collapse_unifurcations](Self::collapse_unifurcations)).
    ///
    /// # Errors
    /// * [LineageError::MissingLeaf] if a sample is not a leaf of this tree
    /// * [LineageError::InvalidTree] if no leaf would be kept
    pub fn restricted_to<'a, I>(&self, samples: I) -> Result<LineageTree>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keep = vec![false; self.num_vertices()];
        let mut num_kept = 0;
        for sample in samples {
            let leaf = self
                .leaf_by_sample(sample)
                .ok_or_else(|| LineageError::missing_leaf(sample, "source"))?;
            if !keep[leaf] {
                keep[leaf] = true;
                num_kept += 1;
            }
        }
        if num_kept == 0 {
            return Err(LineageError::InvalidTree(
                "restriction keeps no leaves".to_string(),
            ));
        }

        for vertex in self.post_order_iter() {
            if !vertex.is_leaf() && vertex.children().iter().any(|&c| keep[c]) {
                keep[vertex.index()] = true;
            }
        }

        let num_vertices = keep.iter().filter(|&&k| k).count();
        let mut tree = LineageTree::with_capacity(self.num_characters, num_vertices);
        tree.name = self.name.clone();
        self.copy_kept(self.root_index, None, &keep, &mut tree);
        Ok(tree)
    }

    /// Returns a copy of this tree in which every chain of unary internal
    /// vertices is contracted, so each non-leaf vertex below the root has at
    /// least two children. A contracted chain is represented by its lowest
    /// vertex. If the root has a single non-leaf descendant line, the root
    /// adopts the children of the first branching vertex.
    pub fn collapse_unifurcations(&self) -> LineageTree {
        let mut tree = LineageTree::with_capacity(self.num_characters, self.num_vertices());
        tree.name = self.name.clone();

        let mut top = self.root_index;
        if self.root().num_children() == 1 {
            let below = self.skip_unary_chain(self.root().children()[0]);
            if !self[below].is_leaf() {
                top = below;
            }
        }

        let root = tree.add_root(self.root().states().to_vec());
        for &child in self[top].children() {
            self.copy_collapsed(child, root, &mut tree);
        }
        tree
    }

    fn skip_unary_chain(&self, mut index: VertexIndex) -> VertexIndex {
        while self[index].is_internal() && self[index].num_children() == 1 {
            index = self[index].children()[0];
        }
        index
    }

    fn copy_collapsed(&self, index: VertexIndex, new_parent: VertexIndex, tree: &mut LineageTree) {
        let vertex = &self[self.skip_unary_chain(index)];
        match vertex {
            Vertex::Leaf { sample, states, .. } => {
                tree.add_leaf(new_parent, sample.clone(), states.clone());
            }
            _ => {
                let new_index = tree.add_internal(new_parent, vertex.states().to_vec());
                for &child in vertex.children() {
                    self.copy_collapsed(child, new_index, tree);
                }
            }
        }
    }

    fn copy_kept(
        &self,
        index: VertexIndex,
        new_parent: Option<VertexIndex>,
        keep: &[bool],
        tree: &mut LineageTree,
    ) {
        let vertex = &self[index];
        let states = vertex.states().to_vec();
        let new_index = match (vertex, new_parent) {
            (Vertex::Leaf { sample, .. }, Some(parent)) => {
                tree.add_leaf(parent, sample.clone(), states);
                return;
            }
            (_, Some(parent)) => tree.add_internal(parent, states),
            (_, None) => tree.add_root(states),
        };
        for &child in vertex.children() {
            if keep[child] {
                self.copy_kept(child, Some(new_index), keep, tree);
            }
        }
    }
}

/// Camin-Sokal state of a parent given the states of its children.
fn ancestral_state(children: impl Iterator<Item = CharacterState>) -> CharacterState {
    let mut shared: Option<CharacterState> = None;
    for state in children {
        if state.is_missing() {
            continue;
        }
        match shared {
            None => shared = Some(state),
            Some(s) if s == state => {}
            Some(_) => return CharacterState::Unmutated,
        }
    }
    shared.unwrap_or(CharacterState::Missing)
}

// ============================================================================
// Validation (pub)
// ============================================================================
impl LineageTree {
    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and points to the only Root vertex
    /// - All vertex indices match their position in the arena
    /// - All child indices are valid and point back to correct parent
    /// - All parent indices are valid and list this vertex as a child
    /// - Root and internal vertices have at least one child
    /// - Every vertex is reached exactly once from the root (no repeated
    ///   children, no detached vertices)
    /// - All state vectors have the tree's number of characters
    /// - Sample identifiers are unique and indexed
    ///
    /// # Errors
    /// [LineageError::InvalidTree] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(LineageError::InvalidTree(msg))
        }

        if !self.is_root_set() || self.root_index >= self.vertices.len() {
            return invalid("root is not set".to_string());
        }
        if !self.vertices[self.root_index].is_root() {
            return invalid(format!("vertex {} is not a root", self.root_index));
        }

        let mut num_leaves = 0;
        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return invalid(format!("vertex at {} claims index {}", index, vertex.index()));
            }
            if vertex.is_root() && index != self.root_index {
                return invalid(format!("second root at {index}"));
            }
            if vertex.states().len() != self.num_characters {
                return invalid(format!(
                    "vertex {} has {} characters, expected {}",
                    index,
                    vertex.states().len(),
                    self.num_characters
                ));
            }

            // Check children references
            if !vertex.is_leaf() && vertex.num_children() == 0 {
                return invalid(format!("non-leaf vertex {index} has no children"));
            }
            for &child in vertex.children() {
                if child >= self.vertices.len() || self.vertices[child].parent_index() != Some(index) {
                    return invalid(format!("child {child} of {index} does not point back"));
                }
            }

            // Check parent references
            if let Some(parent) = vertex.parent_index() {
                if parent == index {
                    return invalid(format!("vertex {index} is its own parent"));
                }
                if parent >= self.vertices.len() || !self.vertices[parent].children().contains(&index) {
                    return invalid(format!("parent {parent} of {index} does not list it"));
                }
            }

            if let Some(sample) = vertex.sample() {
                num_leaves += 1;
                if self.samples.get(sample) != Some(index) {
                    return invalid(format!("sample '{sample}' is not indexed"));
                }
            }
        }

        if num_leaves != self.samples.len() {
            return invalid("sample index does not match leaves".to_string());
        }

        // Every vertex is reached exactly once from the root
        let mut seen = vec![false; self.vertices.len()];
        let mut stack = vec![self.root_index];
        while let Some(index) = stack.pop() {
            if seen[index] {
                return invalid(format!("vertex {index} is reached twice from the root"));
            }
            seen[index] = true;
            stack.extend_from_slice(self.vertices[index].children());
        }
        if let Some(unreached) = seen.iter().position(|&s| !s) {
            return invalid(format!("vertex {unreached} is not reachable from the root"));
        }

        Ok(())
    }

    /// Returns `true` if [validate](Self::validate) succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl std::ops::Index<VertexIndex> for LineageTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

// ============================================================================
// Serialization
// ============================================================================
/// Serialized shape of a [LineageTree]; the sample index is rebuilt and the
/// structure validated on load.
#[derive(Serialize, Deserialize)]
struct TreeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    num_characters: usize,
    root: VertexIndex,
    vertices: Vec<Vertex>,
}

impl From<LineageTree> for TreeRecord {
    fn from(tree: LineageTree) -> Self {
        TreeRecord {
            name: tree.name,
            num_characters: tree.num_characters,
            root: tree.root_index,
            vertices: tree.vertices,
        }
    }
}

impl TryFrom<TreeRecord> for LineageTree {
    type Error = LineageError;

    fn try_from(record: TreeRecord) -> Result<Self> {
        let mut samples = SampleMap::new(record.vertices.len().div_ceil(2));
        for vertex in &record.vertices {
            if let Some(sample) = vertex.sample() {
                if !samples.insert(sample, vertex.index()) {
                    return Err(LineageError::InvalidTree(format!(
                        "duplicate sample identifier '{sample}'"
                    )));
                }
            }
        }
        let tree = LineageTree {
            num_characters: record.num_characters,
            vertices: record.vertices,
            root_index: record.root,
            samples,
            name: record.name,
        };
        tree.validate()?;
        Ok(tree)
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
/// Renders the tree as indented ASCII art.
///
/// # Example Output
/// ```text
/// Lineage tree with 3 leaves (5 vertices, 2 characters):
/// [0] Root 0|0
///   ├─ [1] Internal 1|0
///   │   ├─ [2] Leaf "cell_0" 1|2
///   │   └─ [3] Leaf "cell_1" 1|-
///   └─ [4] Leaf "cell_2" 0|0
/// ```
impl fmt::Display for LineageTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Lineage tree with {} leaves ({} vertices, {} characters):",
            self.num_leaves(),
            self.num_vertices(),
            self.num_characters
        )?;
        if !self.is_root_set() {
            return writeln!(f, "(No root set)");
        }
        self.fmt_vertex(f, self.root_index, "", true)
    }
}

impl LineageTree {
    /// Prints a visual representation of the tree to the console.
    pub fn print_tree(&self) {
        print!("{self}");
    }

    /// Helper function to recursively format a vertex and its children.
    fn fmt_vertex(
        &self,
        f: &mut fmt::Formatter,
        index: VertexIndex,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let vertex = &self[index];
        let connector = if vertex.is_root() {
            ""
        } else if is_last {
            "└─ "
        } else {
            "├─ "
        };
        let states = format_states(vertex.states());

        match vertex {
            Vertex::Leaf { sample, .. } => {
                writeln!(f, "{prefix}{connector}[{index}] Leaf \"{sample}\" {states}")
            }
            _ => {
                let kind = if vertex.is_root() { "Root" } else { "Internal" };
                writeln!(f, "{prefix}{connector}[{index}] {kind} {states}")?;

                let new_prefix = if vertex.is_root() {
                    "  ".to_string()
                } else {
                    format!("{}{}   ", prefix, if is_last { " " } else { "│" })
                };
                let children = vertex.children();
                for (i, &child) in children.iter().enumerate() {
                    self.fmt_vertex(f, child, &new_prefix, i + 1 == children.len())?;
                }
                Ok(())
            }
        }
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
impl LineageTree {
    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Useful for aggregating data from leaves upward.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.root_index)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// Useful for propagating data from root to leaves.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.root_index)
    }

    /// Returns a pre-order iterator over the subtree rooted at `index`.
    pub fn pre_order_iter_from(&self, index: VertexIndex) -> PreOrderIter<'_> {
        PreOrderIter::new(self, index)
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a LineageTree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a LineageTree, start: VertexIndex) -> Self {
        let mut stack = Vec::new();
        if start < tree.num_vertices() {
            stack.push((start, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));
            // Push children in reverse, so first child is processed first
            for &child in vertex.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a LineageTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a LineageTree, start: VertexIndex) -> Self {
        let mut stack = Vec::new();
        if start < tree.num_vertices() {
            stack.push(start);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        for &child in vertex.children().iter().rev() {
            self.stack.push(child);
        }

        Some(vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CharacterState::{Missing, Mutated, Unmutated};

    #[test]
    fn test_ancestral_state_agreeing_children() {
        let state = ancestral_state([Mutated(2), Mutated(2)].into_iter());
        assert_eq!(state, Mutated(2));
    }

    #[test]
    fn test_ancestral_state_disagreeing_children() {
        let state = ancestral_state([Mutated(2), Mutated(1)].into_iter());
        assert_eq!(state, Unmutated);
        let state = ancestral_state([Mutated(2), Unmutated].into_iter());
        assert_eq!(state, Unmutated);
    }

    #[test]
    fn test_ancestral_state_ignores_missing() {
        let state = ancestral_state([Missing, Mutated(3), Missing].into_iter());
        assert_eq!(state, Mutated(3));
        let state = ancestral_state([Missing, Missing].into_iter());
        assert_eq!(state, Missing);
    }
}
