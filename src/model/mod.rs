//! Lineage tree data model.
//!
//! - [LineageTree]: arena-based rooted tree of cells, each carrying a
//!   character-state vector; leaves carry a sample identifier.
//! - [Vertex]: root, internal or leaf vertex of a [LineageTree].
//! - [CharacterState]: tagged state of a single character.
//! - [SampleMap]: sample identifier to leaf index lookup.
//! - [CharacterMatrix]: observed leaf states, the input of a reconstruction.
//! - [LcaOracle]: lowest common ancestor queries.

/// Observed leaf states as a table
pub mod character_matrix;
/// Lowest common ancestor queries
pub mod lca;
/// Sample identifier mapping to leaf indices
pub mod sample_map;
/// Character states
pub mod state;
/// Lineage tree structure and operations
pub mod tree;
/// Tree vertex types (root, internal, leaf)
pub mod vertex;

pub use character_matrix::CharacterMatrix;
pub use lca::LcaOracle;
pub use sample_map::SampleMap;
pub use state::{CharacterState, StateId, MISSING_MARKER};
pub use tree::{LineageTree, PostOrderIter, PreOrderIter, VertexIndex};
pub use vertex::Vertex;
