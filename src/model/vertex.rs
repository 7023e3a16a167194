//! Vertex module for lineage tree representation.

use crate::model::state::CharacterState;
use crate::model::tree::VertexIndex;
use serde::{Deserialize, Serialize};

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (cell) in a lineage tree.
///
/// A vertex can be either:
/// - **Root**: Has children, no parent
/// - **Internal**: Has parent and children, no sample identifier
/// - **Leaf**: Has parent and sample identifier, no children
///
/// Every vertex carries a character-state vector.
///
/// # Invariants
/// - `index` is index in arena and thus unique within its tree
/// - Root and internal vertices have at least one child once the tree is
///   built; more than two children encode a polytomy, exactly one a
///   unifurcation (e.g. left behind by subsampling)
/// - Leaf `sample` identifiers are unique within a tree
/// - All `states` vectors of a tree have the same length
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub enum Vertex {
    /// Root vertex of the tree (has no parent)
    Root {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Indices of the child vertices
        children: Vec<VertexIndex>,
        /// Character states of this cell
        states: Vec<CharacterState>,
    },
    /// Internal vertex (has parent and children, no sample identifier)
    Internal {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Indices of the child vertices
        children: Vec<VertexIndex>,
        /// Character states of this cell
        states: Vec<CharacterState>,
    },
    /// Leaf vertex (observed cell)
    Leaf {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Sample identifier of the observed cell
        sample: String,
        /// Character states of this cell
        states: Vec<CharacterState>,
    },
}

impl Vertex {
    /// Creates a new root vertex without children.
    pub fn new_root(index: VertexIndex, states: Vec<CharacterState>) -> Self {
        Vertex::Root {
            index,
            children: Vec::with_capacity(2),
            states,
        }
    }

    /// Creates a new internal vertex without children.
    pub fn new_internal(
        index: VertexIndex,
        parent: VertexIndex,
        states: Vec<CharacterState>,
    ) -> Self {
        Vertex::Internal {
            index,
            parent,
            children: Vec::with_capacity(2),
            states,
        }
    }

    /// Creates a new leaf vertex.
    pub fn new_leaf(
        index: VertexIndex,
        parent: VertexIndex,
        sample: String,
        states: Vec<CharacterState>,
    ) -> Self {
        Vertex::Leaf {
            index,
            parent,
            sample,
            states,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        match self {
            Vertex::Root { index, .. }
            | Vertex::Internal { index, .. }
            | Vertex::Leaf { index, .. } => *index,
        }
    }

    /// Returns the character states of this vertex.
    pub fn states(&self) -> &[CharacterState] {
        match self {
            Vertex::Root { states, .. }
            | Vertex::Internal { states, .. }
            | Vertex::Leaf { states, .. } => states,
        }
    }

    /// Returns the state of a single character.
    ///
    /// # Panics
    /// Panics if `character` is out of bounds.
    pub fn state(&self, character: usize) -> CharacterState {
        self.states()[character]
    }

    pub(crate) fn states_mut(&mut self) -> &mut Vec<CharacterState> {
        match self {
            Vertex::Root { states, .. }
            | Vertex::Internal { states, .. }
            | Vertex::Leaf { states, .. } => states,
        }
    }

    /// Returns the sample identifier if this is a leaf, else `None`.
    pub fn sample(&self) -> Option<&str> {
        match self {
            Vertex::Leaf { sample, .. } => Some(sample),
            _ => None,
        }
    }

    /// Returns the children; empty for leaves.
    pub fn children(&self) -> &[VertexIndex] {
        match self {
            Vertex::Root { children, .. } | Vertex::Internal { children, .. } => children,
            Vertex::Leaf { .. } => &[],
        }
    }

    /// Returns the number of children.
    pub fn num_children(&self) -> usize {
        self.children().len()
    }

    /// Adds a child index to a root or internal vertex.
    ///
    /// # Panics
    /// Panics if called on a leaf.
    pub(crate) fn push_child(&mut self, child: VertexIndex) {
        match self {
            Vertex::Root { children, .. } | Vertex::Internal { children, .. } => {
                children.push(child)
            }
            Vertex::Leaf { .. } => panic!("Cannot add child to leaf vertex"),
        }
    }

    /// Returns the index of parent if this is a non-root vertex, else `None`.
    pub fn parent_index(&self) -> Option<VertexIndex> {
        match self {
            Vertex::Internal { parent, .. } | Vertex::Leaf { parent, .. } => Some(*parent),
            Vertex::Root { .. } => None,
        }
    }

    /// Returns `true` if this vertex is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Vertex::Leaf { .. })
    }

    /// Returns `true` if this vertex is an internal vertex.
    pub fn is_internal(&self) -> bool {
        matches!(self, Vertex::Internal { .. })
    }

    /// Returns `true` if this vertex is a root.
    pub fn is_root(&self) -> bool {
        matches!(self, Vertex::Root { .. })
    }

    /// Returns `true` if this vertex has more than two children.
    pub fn is_polytomy(&self) -> bool {
        self.num_children() > 2
    }
}
